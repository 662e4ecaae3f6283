//! Heron's method square root with progressive working precision.
//!
//! Each iteration costs one division at the current working precision, and
//! early iterations cannot contribute digits beyond what the guess already
//! has, so precision ramps geometrically: rounds run cheap until the leading
//! digits settle, and the full target precision is only paid at the end. All
//! interior rounding is floor, and the stopping rule is exact: once the ramp
//! has reached the target, iterate until `|g' - g| ≤ 10^-(target-1)`.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use tracing::{debug, trace};

use pisplit_core::constants::{SQRT_MAX_ROUNDS, SQRT_SEED_DIGITS};
use pisplit_core::decimal::{div_to_digits, round_to_digits};
use pisplit_core::error::ComputeError;

/// Approximate `√n` to at least `precision` significant digits.
///
/// Seeded from the native f64 square root (floored to
/// [`SQRT_SEED_DIGITS`]), so the first rounds start ~16 digits deep. The
/// iteration count is capped at [`SQRT_MAX_ROUNDS`]; hitting the cap is a
/// fatal internal fault, never a silently short result.
pub fn sqrt(n: u64, precision: usize) -> Result<BigDecimal, ComputeError> {
    if precision == 0 {
        return Err(ComputeError::InvalidPrecision(precision));
    }
    let target = precision;
    // Any two distinct values at the working precision differ by more than
    // this, so convergence effectively means successive guesses coincide.
    let threshold = BigDecimal::new(BigInt::from(1), target as i64 - 1);
    let radicand = BigDecimal::from(n);
    let seed = BigDecimal::try_from((n as f64).sqrt()).expect("finite f64 square root");

    let mut working = SQRT_SEED_DIGITS;
    let mut guess = round_to_digits(&seed, working, RoundingMode::Floor)?;
    let two = BigDecimal::from(2u32);

    for round in 0..SQRT_MAX_ROUNDS {
        let quotient = div_to_digits(&radicand, &guess, working, RoundingMode::Floor)?;
        let next = div_to_digits(&(&guess + quotient), &two, working, RoundingMode::Floor)?;
        trace!(round, working, "heron step");
        if working < target {
            working = (working * 2).min(target);
        } else if (&next - &guess).abs() <= threshold {
            debug!(rounds = round + 1, target, "square root converged");
            return Ok(next);
        }
        guess = next;
    }
    Err(ComputeError::SqrtDiverged(SQRT_MAX_ROUNDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// √10005, independently computed to 60 digits.
    const ROOT_10005: &str =
        "100.02499687578100594479218787635777800159502436869631465713551";

    #[test]
    fn matches_the_reference_expansion() {
        let fifty = sqrt(10_005, 50).unwrap().to_string();
        assert_eq!(fifty.len(), 51); // 50 significant digits plus the point
        assert!(ROOT_10005.starts_with(&fifty));
    }

    #[test]
    fn seed_precision_floors_small_targets() {
        // Targets below the seed width converge on the first check, at the
        // seed's working precision.
        assert_eq!(sqrt(10_005, 10).unwrap().to_string(), "100.0249968757810");
    }

    #[test]
    fn digit_prefixes_are_stable_across_rising_precision() {
        let mut previous = sqrt(10_005, 20).unwrap().to_string();
        for precision in [40, 80, 160, 320] {
            let wider = sqrt(10_005, precision).unwrap().to_string();
            assert!(
                wider.starts_with(&previous),
                "{precision}-digit result does not extend the previous one"
            );
            previous = wider;
        }
    }

    #[test]
    fn perfect_square_collapses_exactly() {
        assert_eq!(sqrt(4, 30).unwrap(), BigDecimal::from(2u32));
    }

    #[test]
    fn zero_precision_is_rejected() {
        assert_eq!(sqrt(10_005, 0), Err(ComputeError::InvalidPrecision(0)));
    }
}
