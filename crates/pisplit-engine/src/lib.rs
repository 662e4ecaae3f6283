//! # pisplit-engine
//! Worker pool, splitting evaluator, and pi driver.
//!
//! Wires pisplit-core's triple algebra and range tree into a concurrent
//! pipeline: the square root and the series evaluation run in parallel on a
//! bounded worker pool, then the final combination divides down to the
//! requested precision.

pub mod driver;
pub mod pool;
pub mod splitter;
pub mod sqrt;

pub use driver::Driver;
pub use pool::{TaskExecutor, TaskHandle, WorkerPool};
pub use splitter::evaluate;
