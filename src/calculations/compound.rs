//! Year-by-year compound interest projection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::numeric::{require_integer, require_present, InputValue, Real};

/// How often interest is credited within a year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    #[default]
    Monthly,
    Annually,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Annually => 1,
        }
    }
}

impl FromStr for CompoundingFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monthly" => Ok(CompoundingFrequency::Monthly),
            "Annually" => Ok(CompoundingFrequency::Annually),
            other => Err(CalcError::value_range(
                "compounding_frequency",
                format!("expected 'Monthly' or 'Annually', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundingFrequency::Monthly => write!(f, "Monthly"),
            CompoundingFrequency::Annually => write!(f, "Annually"),
        }
    }
}

/// One year of a projection, for tables and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// Elapsed years (1-indexed)
    pub year: u32,

    /// Balance at the end of the year
    pub balance: f64,

    /// Interest credited during this year
    pub interest_earned: f64,
}

/// Future value at the end of each year from widget inputs
///
/// Checks run in a fixed order: missing inputs, principal type, rate type,
/// duration type, then frequency. A negative duration yields an empty
/// projection before the frequency is looked at.
///
/// # Errors
/// * `TypeValidation` for missing or non-numeric inputs, or a non-integer duration
/// * `ValueRange` for a frequency other than `"Monthly"` or `"Annually"`
pub fn project(
    principal: &InputValue,
    rate: &InputValue,
    duration: &InputValue,
    compounding_frequency: &str,
) -> CalcResult<Vec<f64>> {
    require_present(&[("principal", principal), ("rate", rate), ("duration", duration)])?;
    let principal = Real::from_input("principal", principal)?.to_f64();
    let rate = Real::from_input("rate", rate)?.to_f64();
    let years = require_integer("duration", duration)?;

    if years < 0 {
        return Ok(Vec::new());
    }

    let frequency = compounding_frequency.parse::<CompoundingFrequency>()?;
    Ok(future_values(principal, rate, years, frequency))
}

/// `principal * (1 + rate/n)^(n*t)` for every year `t` in `1..=years`
///
/// Negative `years` produce an empty vector.
pub fn future_values(principal: f64, rate: f64, years: i64, frequency: CompoundingFrequency) -> Vec<f64> {
    let n = frequency.periods_per_year() as f64;
    (1..=years.max(0))
        .map(|year| principal * (1.0 + rate / n).powf(n * year as f64))
        .collect()
}

/// Discount a future value back over `years` at the same compounding
pub fn present_value(future_value: f64, rate: f64, years: i64, frequency: CompoundingFrequency) -> f64 {
    let n = frequency.periods_per_year() as f64;
    future_value / (1.0 + rate / n).powf(n * years as f64)
}

/// Projection with the interest credited in each year
pub fn yearly_growth(
    principal: f64,
    rate: f64,
    years: i64,
    frequency: CompoundingFrequency,
) -> Vec<ProjectionRow> {
    let mut previous = principal;
    future_values(principal, rate, years, frequency)
        .into_iter()
        .enumerate()
        .map(|(i, balance)| {
            let row = ProjectionRow {
                year: i as u32 + 1,
                balance,
                interest_earned: balance - previous,
            };
            previous = balance;
            row
        })
        .collect()
}
