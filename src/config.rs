//! Dashboard defaults, overridable from the environment
//!
//! Environment variables:
//!   BUDGET_INITIAL_INVESTMENT, BUDGET_DISCOUNT_RATE_PCT, BUDGET_CASHFLOWS,
//!   BUDGET_COMPOUNDING, BUDGET_OVERSPEND_THRESHOLD

use std::env;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::calculations::{parse_cashflows, CompoundingFrequency};
use crate::error::CalcResult;

pub const ENV_INITIAL_INVESTMENT: &str = "BUDGET_INITIAL_INVESTMENT";
pub const ENV_DISCOUNT_RATE_PCT: &str = "BUDGET_DISCOUNT_RATE_PCT";
pub const ENV_CASHFLOWS: &str = "BUDGET_CASHFLOWS";
pub const ENV_COMPOUNDING: &str = "BUDGET_COMPOUNDING";
pub const ENV_OVERSPEND_THRESHOLD: &str = "BUDGET_OVERSPEND_THRESHOLD";

/// Starting values for the dashboard's input widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Initial outlay for NPV and payback
    pub initial_investment: f64,

    /// Discount rate as entered, in percent (10 = 10%)
    pub discount_rate_pct: f64,

    /// Comma-separated cash flows as entered
    pub cashflows: String,

    pub compounding: CompoundingFrequency,

    /// Variance above this amount is flagged as overspending
    pub overspend_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            initial_investment: 100_000.0,
            discount_rate_pct: 10.0,
            cashflows: "20000, 30000, 40000, 50000".to_string(),
            compounding: CompoundingFrequency::Monthly,
            overspend_threshold: 0.0,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by any `BUDGET_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = parsed(&lookup, ENV_INITIAL_INVESTMENT) {
            config.initial_investment = v;
        }
        if let Some(v) = parsed(&lookup, ENV_DISCOUNT_RATE_PCT) {
            config.discount_rate_pct = v;
        }
        if let Some(v) = parsed(&lookup, ENV_COMPOUNDING) {
            config.compounding = v;
        }
        if let Some(v) = parsed(&lookup, ENV_OVERSPEND_THRESHOLD) {
            config.overspend_threshold = v;
        }
        if let Some(raw) = lookup(ENV_CASHFLOWS) {
            match parse_cashflows(&raw) {
                Ok(_) => config.cashflows = raw,
                Err(e) => warn!("Ignoring {}: {}", ENV_CASHFLOWS, e),
            }
        }

        config
    }

    /// Discount rate as a fraction (10% -> 0.10)
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate_pct / 100.0
    }

    pub fn parsed_cashflows(&self) -> CalcResult<Vec<f64>> {
        parse_cashflows(&self.cashflows)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.initial_investment, 100_000.0);
        assert!((config.discount_rate() - 0.10).abs() < 1e-12);
        assert_eq!(config.parsed_cashflows().unwrap(), vec![20_000.0, 30_000.0, 40_000.0, 50_000.0]);
        assert_eq!(config.compounding, CompoundingFrequency::Monthly);
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_INVESTMENT, "250000"),
            (ENV_DISCOUNT_RATE_PCT, " 7.5 "),
            (ENV_COMPOUNDING, "Annually"),
            (ENV_CASHFLOWS, "1, 2, 3"),
            (ENV_OVERSPEND_THRESHOLD, "25"),
        ]));
        assert_eq!(config.initial_investment, 250_000.0);
        assert!((config.discount_rate() - 0.075).abs() < 1e-12);
        assert_eq!(config.compounding, CompoundingFrequency::Annually);
        assert_eq!(config.parsed_cashflows().unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(config.overspend_threshold, 25.0);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            (ENV_INITIAL_INVESTMENT, "lots"),
            (ENV_COMPOUNDING, "Weekly"),
            (ENV_CASHFLOWS, "1, x"),
        ]));
        assert_eq!(config, DashboardConfig::default());
    }
}
