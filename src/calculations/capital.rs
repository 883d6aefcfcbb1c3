//! Capital budgeting metrics: net present value and payback period
//!
//! Cash flows are indexed from 0. Index 0 is the first future period and is
//! discounted by `(1 + r)^0`; the initial outlay is supplied separately.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Net present value of an investment
///
/// `-initial_investment + sum(cashflow[i] / (1 + discount_rate)^i)`.
/// Any discount rate is accepted, including negative ones.
pub fn npv(initial_investment: f64, discount_rate: f64, cashflows: &[f64]) -> f64 {
    -initial_investment + discounted_cashflows(discount_rate, cashflows).iter().sum::<f64>()
}

/// Present value of each cash flow
pub fn discounted_cashflows(discount_rate: f64, cashflows: &[f64]) -> Vec<f64> {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + discount_rate).powi(t as i32))
        .collect()
}

/// Running total of cash flows
pub fn cumulative_cashflows(cashflows: &[f64]) -> Vec<f64> {
    cashflows
        .iter()
        .scan(0.0, |total, &cf| {
            *total += cf;
            Some(*total)
        })
        .collect()
}

/// Outcome of a payback period calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payback {
    /// Cumulative cash flow reached the investment in this period (1-indexed)
    Recovered { period: usize },
    /// No prefix of the cash flows reaches the investment
    NeverRecovered,
}

impl Payback {
    pub fn period(&self) -> Option<usize> {
        match *self {
            Payback::Recovered { period } => Some(period),
            Payback::NeverRecovered => None,
        }
    }
}

/// First 1-indexed period whose cumulative cash flow is at least the investment
pub fn payback_period(initial_investment: f64, cashflows: &[f64]) -> Payback {
    cumulative_cashflows(cashflows)
        .iter()
        .position(|&total| total >= initial_investment)
        .map_or(Payback::NeverRecovered, |i| Payback::Recovered { period: i + 1 })
}

/// Parse comma-separated cash flow text such as `"20000, 30000, 40000"`
///
/// Blank input parses to an empty list.
///
/// # Errors
/// `TypeValidation` naming the 1-indexed position of the first non-numeric token.
pub fn parse_cashflows(text: &str) -> CalcResult<Vec<f64>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split(',')
        .enumerate()
        .map(|(i, token)| {
            let token = token.trim();
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    CalcError::type_validation(format!("cashflow {} ('{}')", i + 1, token), "a number", "str")
                })
        })
        .collect()
}
