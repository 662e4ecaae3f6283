//! Orchestration: series evaluation and square root in parallel, then the
//! final combination.
//!
//! The driver owns nothing but an executor handle and the requested
//! precision; every blocking point is a task join, and the first failure
//! anywhere aborts the whole pipeline with its original cause.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use tracing::debug;

use pisplit_core::constants::{FINAL_FACTOR, GUARD_DIGITS, R_OFFSET, SQRT_RADICAND};
use pisplit_core::decimal::{div_to_scale, round_to_digits};
use pisplit_core::error::ComputeError;
use pisplit_core::tree::RangeNode;
use pisplit_core::triple::Triple;

use crate::pool::TaskExecutor;
use crate::splitter::evaluate;
use crate::sqrt::sqrt;

/// Orchestrates one full pi computation over an injected task executor.
pub struct Driver {
    executor: TaskExecutor,
    precision: usize,
}

impl Driver {
    /// `precision` is the number of decimal digits after the point in the
    /// final result; intermediate work carries [`GUARD_DIGITS`] extra.
    pub fn new(executor: TaskExecutor, precision: usize) -> Result<Self, ComputeError> {
        if precision == 0 {
            return Err(ComputeError::InvalidPrecision(precision));
        }
        Ok(Self { executor, precision })
    }

    /// Compute pi from series terms `[1, depth)` with the given fork budget.
    ///
    /// The square root runs on the pool while this thread evaluates the
    /// range tree; both must finish before the combination starts.
    pub fn compute(&self, depth: u64, budget: u32) -> Result<BigDecimal, ComputeError> {
        if depth < 2 {
            return Err(ComputeError::InvalidDepth(depth));
        }
        if budget == 0 {
            return Err(ComputeError::InvalidBudget);
        }
        let internal = self.precision + GUARD_DIGITS;

        let sqrt_task = self.executor.submit(move || sqrt(SQRT_RADICAND, internal));
        let triple = evaluate(&self.executor, RangeNode::root(1, depth), budget)?;
        debug!(depth, "series range merged");
        let root = sqrt_task.join()?;
        debug!("square root ready");
        self.combine(triple, root)
    }

    /// `pi = (426880 · Q · √10005) / (13591409 · Q + R)`.
    ///
    /// Numerator and denominator have no data dependency and are built as
    /// two concurrent tasks. Their integer operands are rounded half-up at
    /// the guarded precision on promotion to decimal; the division is then
    /// the single place the pipeline rounds half-up at user precision.
    fn combine(&self, triple: Triple, root: BigDecimal) -> Result<BigDecimal, ComputeError> {
        let internal = self.precision + GUARD_DIGITS;
        let Triple { q, r, .. } = triple; // P plays no part in the final value
        let q_denominator = q.clone();

        let numerator_task = self.executor.submit(move || {
            let product = BigDecimal::from(BigInt::from(FINAL_FACTOR) * q);
            Ok(round_to_digits(&product, internal, RoundingMode::HalfUp)? * root)
        });
        let denominator_task = self.executor.submit(move || {
            let sum = BigDecimal::from(BigInt::from(R_OFFSET) * q_denominator + r);
            round_to_digits(&sum, internal, RoundingMode::HalfUp)
        });

        let numerator = numerator_task.join()?;
        let denominator = denominator_task.join()?;
        debug!("combining numerator and denominator");
        div_to_scale(&numerator, &denominator, self.precision as i64, RoundingMode::HalfUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::WorkerPool;

    fn digits(precision: usize, depth: u64, budget: u32) -> String {
        let pool = WorkerPool::new(2, 6);
        let result = {
            let driver = Driver::new(pool.executor(), precision).unwrap();
            driver.compute(depth, budget)
        };
        pool.shutdown();
        result.unwrap().to_string()
    }

    #[test]
    fn three_terms_give_thirty_correct_digits() {
        assert_eq!(digits(30, 3, 1), "3.141592653589793238462643383279");
    }

    #[test]
    fn fifty_digits_from_twenty_terms() {
        assert_eq!(
            digits(50, 20, 2),
            "3.14159265358979323846264338327950288419716939937510"
        );
    }

    #[test]
    fn zero_precision_is_rejected() {
        let pool = WorkerPool::new(1, 3);
        let result = Driver::new(pool.executor(), 0).map(|_| ());
        assert_eq!(result, Err(ComputeError::InvalidPrecision(0)));
        pool.shutdown();
    }

    #[test]
    fn degenerate_depth_is_rejected() {
        let pool = WorkerPool::new(1, 3);
        let result = {
            let driver = Driver::new(pool.executor(), 10).unwrap();
            driver.compute(1, 1).map(|_| ())
        };
        assert_eq!(result, Err(ComputeError::InvalidDepth(1)));
        pool.shutdown();
    }

    #[test]
    fn zero_budget_is_rejected() {
        let pool = WorkerPool::new(1, 3);
        let result = {
            let driver = Driver::new(pool.executor(), 10).unwrap();
            driver.compute(8, 0).map(|_| ())
        };
        assert_eq!(result, Err(ComputeError::InvalidBudget));
        pool.shutdown();
    }
}
