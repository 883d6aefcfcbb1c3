//! Fixed monthly payment for a fully amortizing loan

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::numeric::{require_integer, InputValue, Real};

/// Payments per year
const MONTHS_PER_YEAR: i64 = 12;

/// Longest loan an amortization schedule is built for (100 years)
pub const MAX_SCHEDULE_MONTHS: i64 = 100 * MONTHS_PER_YEAR;

/// Validated loan inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Annual interest rate as a decimal (0.05 = 5%)
    pub annual_rate: f64,

    /// Loan term in whole years
    pub term_years: i64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term_years: i64) -> Self {
        Self {
            principal,
            annual_rate,
            term_years,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / MONTHS_PER_YEAR as f64
    }

    /// Number of monthly payments; errors when the term is too long to count in months
    pub fn total_payments(&self) -> CalcResult<i64> {
        self.term_years.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
            CalcError::value_range("term_years", format!("{} years overflows the payment count", self.term_years))
        })
    }

    fn validate(&self) -> CalcResult<()> {
        if !self.principal.is_finite() || self.principal < 0.0 {
            return Err(CalcError::value_range("loan_amount", "must be a finite, non-negative amount"));
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(CalcError::value_range("annual_rate", "must be a finite, non-negative rate"));
        }
        if self.term_years < 0 {
            return Err(CalcError::value_range("term_years", "must not be negative"));
        }
        Ok(())
    }
}

/// Monthly payment from widget inputs
///
/// # Errors
/// * `TypeValidation` for missing/non-numeric amount or rate, or a non-integer term
/// * `ValueRange` for a negative amount, rate or term, or a term too long to count in months
/// * `DivideByZero` for a zero term on a non-zero loan
pub fn monthly_payment(
    loan_amount: &InputValue,
    annual_rate: &InputValue,
    term_years: &InputValue,
) -> CalcResult<f64> {
    let principal = Real::from_input("loan_amount", loan_amount)?.to_f64();
    let annual_rate = Real::from_input("annual_rate", annual_rate)?.to_f64();
    let term_years = require_integer("term_years", term_years)?;

    payment_for(LoanTerms::new(principal, annual_rate, term_years))
}

/// Monthly payment for validated terms
///
/// A zero principal always pays 0.0, even over a zero term. A zero rate spreads
/// the principal evenly over the term.
pub fn payment_for(terms: LoanTerms) -> CalcResult<f64> {
    terms.validate()?;

    if terms.principal == 0.0 {
        return Ok(0.0);
    }

    let n = terms.total_payments()?;
    if n == 0 {
        return Err(CalcError::divide_by_zero("loan term of zero years on a non-zero loan"));
    }

    let straight_line = terms.principal / n as f64;
    if terms.annual_rate == 0.0 {
        return Ok(straight_line);
    }

    let r = terms.monthly_rate();
    let denominator = 1.0 - (1.0 + r).powf(-(n as f64));
    if denominator == 0.0 || !denominator.is_finite() {
        return Ok(straight_line);
    }

    Ok(terms.principal * r / denominator)
}

/// One month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number (1-indexed)
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Outstanding balance after this payment
    pub balance: f64,
}

/// Month-by-month breakdown of a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub monthly_payment: f64,
    pub rows: Vec<AmortizationRow>,
}

/// Totals over an amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub months: u32,
    pub total_paid: f64,
    pub total_interest: f64,
}

impl AmortizationSchedule {
    pub fn summary(&self) -> AmortizationSummary {
        let total_paid: f64 = self.rows.iter().map(|r| r.payment).sum();
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();

        AmortizationSummary {
            months: self.rows.len() as u32,
            total_paid,
            total_interest,
        }
    }
}

/// Split every payment into interest and principal
///
/// The last payment absorbs accumulated rounding so the balance closes at zero.
pub fn amortization_schedule(terms: LoanTerms) -> CalcResult<AmortizationSchedule> {
    let payment = payment_for(terms)?;
    let r = terms.monthly_rate();
    let n = if terms.principal == 0.0 { 0 } else { terms.total_payments()? };
    if n > MAX_SCHEDULE_MONTHS {
        return Err(CalcError::value_range(
            "term_years",
            format!("schedules cover at most {} years", MAX_SCHEDULE_MONTHS / MONTHS_PER_YEAR),
        ));
    }
    let n = n as u32;

    let mut balance = terms.principal;
    let mut rows = Vec::with_capacity(n as usize);

    for month in 1..=n {
        let interest = balance * r;
        let (payment, principal) = if month == n {
            (interest + balance, balance)
        } else {
            (payment, payment - interest)
        };
        balance -= principal;

        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal,
            balance: if month == n { 0.0 } else { balance },
        });
    }

    Ok(AmortizationSchedule {
        terms,
        monthly_payment: payment,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn pay(
        loan: impl Into<InputValue>,
        rate: impl Into<InputValue>,
        term: impl Into<InputValue>,
    ) -> CalcResult<f64> {
        monthly_payment(&loan.into(), &rate.into(), &term.into())
    }

    #[test]
    fn test_standard_payments() {
        let cases: [(f64, f64, i64, f64); 8] = [
            (200_000.0, 0.05, 30, 1073.64),
            (100_000.0, 0.04, 15, 739.69),
            (50_000.0, 0.06, 10, 555.10),
            (300_000.0, 0.035, 20, 1739.88),
            (10_000.0, 0.07, 5, 198.01),
            (200_000.50, 0.05, 30, 1073.65),
            (200_000.0, 0.055, 30, 1135.58),
            (1000.0, 0.10, 1, 87.92),
        ];
        for (loan, rate, term, expected) in cases {
            let payment = pay(loan, rate, term).unwrap();
            assert_abs_diff_eq!(payment, expected, epsilon = 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_zero_principal_pays_nothing() {
        assert_eq!(pay(0, 0.05, 30).unwrap(), 0.0);
        assert_eq!(pay(0, 0.05, 0).unwrap(), 0.0);
        assert_eq!(pay(0.0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        assert_eq!(pay(200_000, 0, 30).unwrap(), 200_000.0 / 360.0);
        assert_abs_diff_eq!(pay(200_000, 0.0, 30).unwrap(), 555.56, epsilon = 0.005);
    }

    #[test]
    fn test_zero_term_divides_by_zero() {
        assert_eq!(pay(200_000, 0.05, 0).unwrap_err().kind(), ErrorKind::DivideByZero);
        assert_eq!(pay(200_000, 0, 0).unwrap_err().kind(), ErrorKind::DivideByZero);
    }

    #[test]
    fn test_negative_inputs_are_out_of_range() {
        assert_eq!(pay(-1, 0.05, 30).unwrap_err().kind(), ErrorKind::ValueRange);
        assert_eq!(pay(-200_000, 0.05, 30).unwrap_err().kind(), ErrorKind::ValueRange);
        assert_eq!(pay(200_000, -0.05, 30).unwrap_err().kind(), ErrorKind::ValueRange);
        assert_eq!(pay(200_000, 0.05, -30).unwrap_err().kind(), ErrorKind::ValueRange);
    }

    #[test]
    fn test_type_checks_run_before_value_checks() {
        assert_eq!(pay("200000", 0.05, 30).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(200_000, "0.05", 30).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(200_000, 0.05, "30").unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(InputValue::Null, 0.05, 30).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(200_000, InputValue::Null, 30).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(200_000, 0.05, InputValue::Null).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(200_000, 0.05, 30.5).unwrap_err().kind(), ErrorKind::TypeValidation);
        assert_eq!(pay(-5, 0.05, "30").unwrap_err().kind(), ErrorKind::TypeValidation);
    }

    #[test]
    fn test_schedule_closes_at_zero() {
        let schedule = amortization_schedule(LoanTerms::new(10_000.0, 0.07, 5)).unwrap();
        assert_eq!(schedule.rows.len(), 60);
        assert_eq!(schedule.rows.last().unwrap().balance, 0.0);

        let principal_paid: f64 = schedule.rows.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal_paid, 10_000.0, epsilon = 1e-6);

        let summary = schedule.summary();
        assert_eq!(summary.months, 60);
        assert_abs_diff_eq!(summary.total_paid - summary.total_interest, 10_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.rows[0].interest, 10_000.0 * 0.07 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_schedule_degenerate_loans() {
        let empty = amortization_schedule(LoanTerms::new(0.0, 0.05, 0)).unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.monthly_payment, 0.0);

        let flat = amortization_schedule(LoanTerms::new(1200.0, 0.0, 1)).unwrap();
        assert!(flat.rows.iter().all(|r| r.interest == 0.0));
        assert_abs_diff_eq!(flat.rows[0].payment, 100.0, epsilon = 1e-12);

        assert!(amortization_schedule(LoanTerms::new(1200.0, 0.05, 0)).is_err());
    }

    #[test]
    fn test_extreme_terms() {
        let err = pay(200_000, 0.05, i64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRange);
        assert!(err.to_string().contains("term_years"));
        assert_eq!(pay(200_000, 0, i64::MAX / 12 + 1).unwrap_err().kind(), ErrorKind::ValueRange);

        // Long but countable terms converge on interest-only payments
        let payment = pay(200_000, 0.05, i64::MAX / 12).unwrap();
        assert_abs_diff_eq!(payment, 200_000.0 * 0.05 / 12.0, epsilon = 1e-9);
        assert!(pay(200_000, 0, i64::MAX / 12).unwrap() > 0.0);
    }

    #[test]
    fn test_schedule_length_is_bounded() {
        let longest = amortization_schedule(LoanTerms::new(100_000.0, 0.05, 100)).unwrap();
        assert_eq!(longest.rows.len() as i64, MAX_SCHEDULE_MONTHS);
        assert_eq!(longest.rows.last().unwrap().month, 1200);

        let err = amortization_schedule(LoanTerms::new(100_000.0, 0.05, 101)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRange);
        assert_eq!(
            amortization_schedule(LoanTerms::new(100_000.0, 0.05, i64::MAX)).unwrap_err().kind(),
            ErrorKind::ValueRange
        );
        assert!(amortization_schedule(LoanTerms::new(0.0, 0.05, i64::MAX)).unwrap().rows.is_empty());
    }
}
