//! End-to-end test suite for the pisplit pipeline.
//!
//! Exercises the full compute path (pool, evaluator and square root in
//! parallel, then the final combination) at realistic depths, and pins down the
//! determinism guarantees across parallelism budgets.

pub mod helpers;
