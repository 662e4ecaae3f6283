//! Error types for the pi computation pipeline.
use thiserror::Error;

/// Every failure in the core pipeline is fatal: the arithmetic is
/// deterministic, so nothing here is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("series index {0} outside the supported range")] IndexOutOfRange(u64),
    #[error("precision must be at least 1, got {0}")] InvalidPrecision(usize),
    #[error("depth must be at least 2, got {0}")] InvalidDepth(u64),
    #[error("parallelism budget must be at least 1")] InvalidBudget,
    #[error("division by zero")] DivisionByZero,
    #[error("child slot on [{low}, {high}) written twice")] SlotOccupied { low: u64, high: u64 },
    #[error("work stack drained before the root range merged")] StackDrained,
    #[error("square root failed to converge within {0} rounds")] SqrtDiverged(usize),
    #[error("worker abandoned a task before it completed")] TaskLost,
}
