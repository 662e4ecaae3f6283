//! Chudnovsky series constants and the precision policy.
//!
//! The series computes 1/pi as a sum whose term at index `a` contributes the
//! rational summary produced by [`triple::leaf`](crate::triple::leaf); the
//! constants below are the fixed coefficients of that term and of the final
//! combination `pi = (426880 · Q · √10005) / (13591409 · Q + R)`.

/// Per-term factor of Q: `640320³ / 24`.
pub const Q_FACTOR: i64 = 10_939_058_860_032_000;

/// Linear coefficient of the index in the per-term R polynomial.
pub const R_MULTIPLIER: i64 = 545_140_134;

/// Constant offset in the per-term R polynomial; also the Q coefficient of
/// the denominator in the final combination.
pub const R_OFFSET: i64 = 13_591_409;

/// Scalar numerator factor of the final combination.
pub const FINAL_FACTOR: i64 = 426_880;

/// Radicand of the square root in the final combination.
pub const SQRT_RADICAND: u64 = 10_005;

/// Extra significant digits carried through all intermediate arithmetic and
/// truncated away only by the final division.
pub const GUARD_DIGITS: usize = 2;

/// Significant digits kept from the f64-derived Heron seed.
pub const SQRT_SEED_DIGITS: usize = 16;

/// Hard ceiling on Heron rounds. Precision doubling reaches a 10,000-digit
/// target in ~13 rounds; exceeding this bound means the iteration is not
/// converging and the computation must abort rather than spin.
pub const SQRT_MAX_ROUNDS: usize = 64;

/// Largest admissible series index: `6a` must stay within `i64`.
pub const MAX_SERIES_INDEX: u64 = (i64::MAX / 6) as u64;

/// Decimal digits of pi contributed per series term.
pub const DIGITS_PER_TERM: f64 = 14.181647462725477;

/// Default digits after the decimal point.
pub const DEFAULT_PRECISION: usize = 3000;

/// Default series upper bound (terms `[1, depth)` are evaluated).
pub const DEFAULT_DEPTH: u64 = 10_000;

/// Default worker count and fork budget.
pub const DEFAULT_CORES: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_factor_is_derived_from_640320() {
        assert_eq!(Q_FACTOR, 640_320_i64.pow(3) / 24);
    }

    #[test]
    fn max_index_leaves_headroom_for_6a() {
        assert!(6 * MAX_SERIES_INDEX as i128 <= i64::MAX as i128);
        assert!(6 * (MAX_SERIES_INDEX as i128 + 1) > i64::MAX as i128);
    }
}
