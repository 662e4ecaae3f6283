//! Precision-controlled decimal division and rounding.
//!
//! [`bigdecimal`] keeps addition and multiplication exact; what the
//! refinement loop needs on top is division carried to a chosen number of
//! significant digits (or to a fixed scale) under an explicit rounding mode.
//! These helpers implement that over the mantissa/exponent representation,
//! with a single integer division doing the real work.

use std::num::NonZeroU64;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::error::ComputeError;

fn pow10(exp: u64) -> BigInt {
    BigInt::from(10u32).pow(exp as u32)
}

/// Integer division with the remainder folded in per `mode`.
fn rounded_div(num: &BigInt, den: &BigInt, mode: RoundingMode) -> BigInt {
    let (quot, rem) = num.div_rem(den);
    if rem.is_zero() {
        return quot;
    }
    let negative = num.is_negative() != den.is_negative();
    match mode {
        RoundingMode::Down => quot,
        RoundingMode::Up => {
            if negative {
                quot - 1
            } else {
                quot + 1
            }
        }
        RoundingMode::Floor => {
            if negative {
                quot - 1
            } else {
                quot
            }
        }
        RoundingMode::Ceiling => {
            if negative {
                quot
            } else {
                quot + 1
            }
        }
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            let doubled = rem.abs() * 2;
            let den_abs = den.abs();
            let away = match mode {
                RoundingMode::HalfUp => doubled >= den_abs,
                RoundingMode::HalfDown => doubled > den_abs,
                _ => doubled > den_abs || (doubled == den_abs && quot.is_odd()),
            };
            match (away, negative) {
                (true, true) => quot - 1,
                (true, false) => quot + 1,
                (false, _) => quot,
            }
        }
    }
}

/// Round `value` to at most `digits` significant digits.
pub fn round_to_digits(
    value: &BigDecimal,
    digits: usize,
    mode: RoundingMode,
) -> Result<BigDecimal, ComputeError> {
    let prec =
        NonZeroU64::new(digits as u64).ok_or(ComputeError::InvalidPrecision(digits))?;
    Ok(value.with_precision_round(prec, mode))
}

/// Divide `num` by `den`, rounding the quotient to `digits` significant
/// digits with `mode`.
///
/// The quotient is first carried one digit past the target with a rounding
/// that cannot disturb the final step (truncation, or the target mode itself
/// for the directed modes), then rounded to `digits`.
pub fn div_to_digits(
    num: &BigDecimal,
    den: &BigDecimal,
    digits: usize,
    mode: RoundingMode,
) -> Result<BigDecimal, ComputeError> {
    let prec =
        NonZeroU64::new(digits as u64).ok_or(ComputeError::InvalidPrecision(digits))?;
    if den.is_zero() {
        return Err(ComputeError::DivisionByZero);
    }
    if num.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let (num_int, num_scale) = num.as_bigint_and_exponent();
    let (den_int, den_scale) = den.as_bigint_and_exponent();
    let shift = digits as i64 - (num.digits() as i64 - den.digits() as i64) + 1;
    let (num_int, den_int) = if shift >= 0 {
        (num_int * pow10(shift as u64), den_int)
    } else {
        (num_int, den_int * pow10(shift.unsigned_abs()))
    };
    let step = match mode {
        RoundingMode::Floor => RoundingMode::Floor,
        RoundingMode::Ceiling => RoundingMode::Ceiling,
        RoundingMode::Up => RoundingMode::Up,
        _ => RoundingMode::Down,
    };
    let quot = rounded_div(&num_int, &den_int, step);
    let raw = BigDecimal::new(quot, num_scale - den_scale + shift);
    Ok(raw.with_precision_round(prec, mode))
}

/// Divide `num` by `den`, rounding the quotient at `scale` digits after the
/// decimal point with `mode`. A single rounding; the form the final
/// combination uses.
pub fn div_to_scale(
    num: &BigDecimal,
    den: &BigDecimal,
    scale: i64,
    mode: RoundingMode,
) -> Result<BigDecimal, ComputeError> {
    if den.is_zero() {
        return Err(ComputeError::DivisionByZero);
    }
    let (num_int, num_scale) = num.as_bigint_and_exponent();
    let (den_int, den_scale) = den.as_bigint_and_exponent();
    let shift = scale + den_scale - num_scale;
    let (num_int, den_int) = if shift >= 0 {
        (num_int * pow10(shift as u64), den_int)
    } else {
        (num_int, den_int * pow10(shift.unsigned_abs()))
    };
    Ok(BigDecimal::new(rounded_div(&num_int, &den_int, mode), scale))
}
