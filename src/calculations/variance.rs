//! Budget variance (actual minus budgeted) in exact decimal arithmetic
//!
//! Whole amounts subtract in `i128` and fractions in [`Decimal`], so binary
//! floating point noise never leaks into the result. A difference with no
//! fractional part comes back as [`Variance::Exact`]; anything else is rounded
//! to 9 places (half to even) and returned as [`Variance::Approx`]. Floats no
//! exact form can hold (whole numbers of 2^127 or more, digits past the 28th
//! decimal place) fall back to binary floating point.

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::numeric::{InputValue, Real};

/// Fractional digits kept for a non-integral variance
pub const VARIANCE_DECIMAL_PLACES: u32 = 9;

/// Result of a variance calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variance {
    /// Difference with no fractional part
    Exact(i128),
    /// Difference rounded to [`VARIANCE_DECIMAL_PLACES`]
    Approx(f64),
}

impl Variance {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Variance::Exact(v) => v as f64,
            Variance::Approx(v) => v,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Variance::Exact(_))
    }

    /// Positive variance above `threshold` means the category overspent
    pub fn is_overspend(&self, threshold: f64) -> bool {
        self.as_f64() > threshold
    }
}

impl Neg for Variance {
    type Output = Variance;

    fn neg(self) -> Self::Output {
        match self {
            Variance::Exact(v) => Variance::Exact(-v),
            Variance::Approx(v) => Variance::Approx(-v),
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Exact(v) => write!(f, "{}", v),
            Variance::Approx(v) => write!(f, "{}", v),
        }
    }
}

/// Variance of two widget values: `actual - budgeted`
///
/// # Errors
/// * `TypeValidation` if either input is not an int, float or bool
/// * `ValueRange` if a float is not finite, or the difference of two whole
///   amounts does not fit `i128`
pub fn variance(budgeted: &InputValue, actual: &InputValue) -> CalcResult<Variance> {
    let budgeted = Real::from_input("budgeted", budgeted)?;
    let actual = Real::from_input("actual", actual)?;
    variance_of(budgeted, actual)
}

/// Variance of two already-validated amounts
pub fn variance_of(budgeted: Real, actual: Real) -> CalcResult<Variance> {
    let budgeted = Amount::lift("budgeted", budgeted)?;
    let actual = Amount::lift("actual", actual)?;

    if budgeted == actual {
        return Ok(Variance::Exact(0));
    }

    match (budgeted, actual) {
        (Amount::Whole(b), Amount::Whole(a)) => a
            .checked_sub(b)
            .map(Variance::Exact)
            .ok_or_else(|| CalcError::value_range("actual", "difference overflows integer range")),
        (Amount::Fraction(b), Amount::Fraction(a)) => fraction_difference(b, a),
        // A whole amount minus a fraction never has a zero fractional part
        _ => match (budgeted.to_decimal(), actual.to_decimal()) {
            (Some(b), Some(a)) => match a.checked_sub(b) {
                Some(diff) => rounded(diff),
                None => float_difference(budgeted, actual),
            },
            _ => float_difference(budgeted, actual),
        },
    }
}

/// Variance as a percentage of the budgeted amount
///
/// Returns `None` when nothing was budgeted.
pub fn percentage_variance(budgeted: Real, actual: Real) -> CalcResult<Option<f64>> {
    let variance = variance_of(budgeted, actual)?;
    let base = budgeted.to_f64();
    if base == 0.0 {
        return Ok(None);
    }
    Ok(Some(variance.as_f64() / base * 100.0))
}

/// Sum of amounts computed in decimal, so `0.1 + 0.2` totals exactly `0.3`
pub fn decimal_sum(amounts: impl IntoIterator<Item = f64>) -> CalcResult<f64> {
    let mut total = Decimal::ZERO;
    for amount in amounts {
        total = total
            .checked_add(to_decimal("amount", Real::Float(amount))?)
            .ok_or_else(|| CalcError::value_range("amount", "total overflows decimal range"))?;
    }
    total
        .to_f64()
        .ok_or_else(|| CalcError::value_range("amount", "total not representable as float"))
}

/// Lift a real into a decimal, failing when no exact decimal form exists
fn to_decimal(param: &str, value: Real) -> CalcResult<Decimal> {
    let amount = Amount::lift(param, value)?;
    amount
        .to_decimal()
        .ok_or_else(|| CalcError::value_range(param, format!("{:?} is outside the exact decimal range", amount)))
}

/// Floats at or above this magnitude do not fit `i128`
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Fractional digits a [`Decimal`] can hold
const MAX_DECIMAL_SCALE: usize = 28;

/// A real amount in the most exact form available for subtraction
#[derive(Debug, Clone, Copy, PartialEq)]
enum Amount {
    /// Integer-valued and within `i128`
    Whole(i128),

    /// Non-integral, with at most 28 fractional digits in its shortest text
    Fraction(Decimal),

    /// Finite float with no exact form above: whole numbers of 2^127 or more,
    /// or fractions with digits past the 28th decimal place
    Float(f64),
}

impl Amount {
    /// Floats go through their shortest round-trip text
    fn lift(param: &str, value: Real) -> CalcResult<Self> {
        let f = match value {
            Real::Int(i) => return Ok(Amount::Whole(i128::from(i))),
            Real::Bool(b) => return Ok(Amount::Whole(i128::from(b))),
            Real::Float(f) => f,
        };

        if !f.is_finite() {
            return Err(CalcError::value_range(param, format!("{} is not a finite amount", f)));
        }

        // Every float of 2^53 or more is a whole number
        if f.fract() == 0.0 {
            return Ok(if f.abs() < I128_BOUND {
                Amount::Whole(f as i128)
            } else {
                Amount::Float(f)
            });
        }

        // Display for f64 never uses an exponent
        let text = f.to_string();
        let scale = text.split_once('.').map_or(0, |(_, digits)| digits.len());
        if scale > MAX_DECIMAL_SCALE {
            return Ok(Amount::Float(f));
        }

        Decimal::from_str(&text)
            .map(Amount::Fraction)
            .map_err(|_| CalcError::value_range(param, format!("{} has no exact decimal form", f)))
    }

    fn is_whole(self) -> bool {
        match self {
            Amount::Whole(_) => true,
            Amount::Fraction(_) => false,
            Amount::Float(f) => f.fract() == 0.0,
        }
    }

    fn to_decimal(self) -> Option<Decimal> {
        match self {
            Amount::Whole(i) => Decimal::from_i128(i),
            Amount::Fraction(d) => Some(d),
            Amount::Float(_) => None,
        }
    }

    fn to_f64(self) -> CalcResult<f64> {
        match self {
            Amount::Whole(i) => Ok(i as f64),
            Amount::Fraction(d) => d
                .to_f64()
                .ok_or_else(|| CalcError::value_range("amount", format!("{} is not representable as float", d))),
            Amount::Float(f) => Ok(f),
        }
    }
}

/// Two fractions differ by a whole number exactly when their parts above the floor match
fn fraction_difference(budgeted: Decimal, actual: Decimal) -> CalcResult<Variance> {
    let (b_floor, a_floor) = (budgeted.floor(), actual.floor());
    if actual - a_floor == budgeted - b_floor {
        return (a_floor - b_floor)
            .to_i128()
            .map(Variance::Exact)
            .ok_or_else(|| CalcError::value_range("actual", "difference overflows integer range"));
    }

    actual
        .checked_sub(budgeted)
        .ok_or_else(|| CalcError::value_range("actual", "difference overflows decimal range"))
        .and_then(rounded)
}

fn rounded(diff: Decimal) -> CalcResult<Variance> {
    diff.round_dp_with_strategy(VARIANCE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
        .to_f64()
        .map(Variance::Approx)
        .ok_or_else(|| CalcError::value_range("actual", "difference not representable as float"))
}

/// Difference of amounts outside the exact decimal range, in binary floating point
fn float_difference(budgeted: Amount, actual: Amount) -> CalcResult<Variance> {
    let diff = actual.to_f64()? - budgeted.to_f64()?;

    if budgeted.is_whole() && actual.is_whole() {
        if diff.abs() < I128_BOUND {
            return Ok(Variance::Exact(diff as i128));
        }
        return Err(CalcError::value_range("actual", "difference overflows integer range"));
    }

    format!("{:.*}", VARIANCE_DECIMAL_PLACES as usize, diff)
        .parse::<f64>()
        .map(Variance::Approx)
        .map_err(|_| CalcError::value_range("actual", format!("{} is not a finite difference", diff)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;
    use rust_decimal_macros::dec;

    fn var(budgeted: impl Into<InputValue>, actual: impl Into<InputValue>) -> CalcResult<Variance> {
        variance(&budgeted.into(), &actual.into())
    }

    #[test]
    fn test_equal_inputs_give_exact_zero() {
        for x in [0.0, 0.1, -3.75, 1e-9, 123_456.789, 1_234_567_890.123] {
            assert_eq!(var(x, x).unwrap(), Variance::Exact(0));
        }
        for x in [0_i64, 7, -42, i64::MAX] {
            assert_eq!(var(x, x).unwrap(), Variance::Exact(0));
        }
        // Past the decimal range, below its smallest scale, and subnormal
        for x in [1e29, -1e29, 1e-30, 5e-324, f64::MAX, f64::MIN, 1e300] {
            assert_eq!(var(x, x).unwrap(), Variance::Exact(0), "x = {:e}", x);
        }
    }

    #[test]
    fn test_large_whole_floats_stay_exact() {
        assert_eq!(var(1e29, 1e29 + 1e16).unwrap(), Variance::Exact((1e29 + 1e16) as i128 - 1e29 as i128));
        assert_eq!(var(0, 1e30).unwrap(), Variance::Exact(1e30 as i128));
        assert_eq!(var(9_007_199_254_740_992.0, 1).unwrap(), Variance::Exact(1 - (1_i128 << 53)));
    }

    #[test]
    fn test_fractions_beyond_decimal_scale_are_approximate() {
        let v = var(0.0, 1e-30).unwrap();
        assert!(!v.is_exact());
        assert_eq!(v, Variance::Approx(0.0));

        assert_eq!(var(1e-30, 2e-30).unwrap(), Variance::Approx(0.0));
        assert_eq!(var(5e-324, 0).unwrap(), Variance::Approx(0.0));
        assert!(!var(1, 1.5e-29).unwrap().is_exact());
    }

    #[test]
    fn test_fractions_with_matching_parts_are_exact() {
        assert_eq!(var(-0.5, 0.5).unwrap(), Variance::Exact(1));
        assert_eq!(var(0.25, 3.25).unwrap(), Variance::Exact(3));
        assert_eq!(var(2.75, -1.25).unwrap(), Variance::Exact(-4));
    }

    #[test]
    fn test_whole_differences_are_exact() {
        assert_eq!(var(100, 120).unwrap(), Variance::Exact(20));
        assert_eq!(var(100.0, 150.0).unwrap(), Variance::Exact(50));
        assert_eq!(var(100.0, 150.0).unwrap().as_f64(), 50.0);
        assert_eq!(var(0.1, 1.1).unwrap(), Variance::Exact(1));
    }

    #[test]
    fn test_fractional_difference_has_no_binary_noise() {
        // 0.3 - 0.1 in binary floating point is 0.19999999999999998
        assert_eq!(var(0.1, 0.3).unwrap(), Variance::Approx(0.2));

        let v = var(1_234_567_890.123, 1_234_567_890.124).unwrap();
        assert!(!v.is_exact());
        assert_abs_diff_eq!(v.as_f64(), 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_rounds_to_nine_places_half_even() {
        let v = var(0.0, 0.0000000005).unwrap();
        assert_eq!(v, Variance::Approx(0.0));
        let v = var(0.0, 0.0000000015).unwrap();
        assert_eq!(v, Variance::Approx(0.000000002));
    }

    #[test]
    fn test_antisymmetry() {
        let pairs: [(InputValue, InputValue); 7] = [
            (100.into(), 150.5.into()),
            (0.1.into(), 0.3.into()),
            (true.into(), 2.25.into()),
            ((-17).into(), 4.into()),
            (1e-12.into(), 0.into()),
            (0.into(), 1e-30.into()),
            (1e29.into(), 5.into()),
        ];
        for (a, b) in &pairs {
            assert_eq!(variance(a, b).unwrap(), -variance(b, a).unwrap());
        }
    }

    #[test]
    fn test_bools_coerce_to_integers() {
        assert_eq!(var(true, false).unwrap(), Variance::Exact(-1));
        assert_eq!(var(false, 2.5).unwrap(), Variance::Approx(2.5));
    }

    #[test]
    fn test_rejects_non_numeric_inputs() {
        let cases = [
            var("100", 50),
            var(InputValue::Null, 50),
            var(InputValue::List(vec![]), 50),
            var(100, InputValue::Map(vec![])),
            var(100, InputValue::Set(vec![])),
            var(InputValue::Complex { re: 1.0, im: 0.0 }, 1),
        ];
        for result in cases {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::TypeValidation);
        }

        let err = var("100", 50).unwrap_err();
        assert!(err.to_string().contains("budgeted"));
        assert!(err.to_string().contains("str"));
    }

    #[test]
    fn test_non_finite_floats_are_out_of_range() {
        assert_eq!(var(f64::NAN, 1).unwrap_err().kind(), ErrorKind::ValueRange);
        assert_eq!(var(1, f64::INFINITY).unwrap_err().kind(), ErrorKind::ValueRange);
        assert_eq!(var(f64::NAN, f64::NAN).unwrap_err().kind(), ErrorKind::ValueRange);
    }

    #[test]
    fn test_whole_difference_beyond_i128_is_out_of_range() {
        let err = var(1, 1e300).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRange);
        assert!(err.to_string().contains("integer range"));
        assert_eq!(var(f64::MIN, f64::MAX).unwrap_err().kind(), ErrorKind::ValueRange);
    }

    #[test]
    fn test_float_conversion_uses_decimal_text() {
        assert_eq!(to_decimal("x", Real::Float(0.1)).unwrap(), dec!(0.1));
        assert_eq!(to_decimal("x", Real::Float(-2.5)).unwrap(), dec!(-2.5));
        assert_eq!(to_decimal("x", Real::Bool(true)).unwrap(), Decimal::ONE);
        assert!(to_decimal("x", Real::Float(1e29)).is_err());
        assert!(to_decimal("x", Real::Float(1e-30)).is_err());
    }

    #[test]
    fn test_overspend_flag() {
        assert!(Variance::Exact(1).is_overspend(0.0));
        assert!(!Variance::Exact(0).is_overspend(0.0));
        assert!(!Variance::Approx(-0.5).is_overspend(0.0));
    }

    #[test]
    fn test_decimal_sum() {
        assert_eq!(decimal_sum([0.1, 0.2]).unwrap(), 0.3);
        assert_eq!(decimal_sum(Vec::new()).unwrap(), 0.0);
        assert!(decimal_sum([f64::NAN]).is_err());
    }

    #[test]
    fn test_percentage_variance() {
        let pct = percentage_variance(Real::Int(200), Real::Int(250)).unwrap();
        assert_abs_diff_eq!(pct.unwrap(), 25.0, epsilon = 1e-12);
        assert_eq!(percentage_variance(Real::Int(0), Real::Int(10)).unwrap(), None);
    }
}
