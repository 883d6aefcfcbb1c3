//! Pure financial calculations behind every dashboard page
//!
//! Each calculator is stateless and independent of the others. The functions
//! taking [`crate::numeric::InputValue`] validate widget input; the typed
//! variants assume validated numbers.

mod variance;
mod compound;
mod loan;
mod capital;

pub use variance::{
    variance, variance_of, percentage_variance, decimal_sum, Variance, VARIANCE_DECIMAL_PLACES,
};
pub use compound::{
    project, future_values, present_value, yearly_growth, CompoundingFrequency, ProjectionRow,
};
pub use loan::{
    monthly_payment, payment_for, amortization_schedule, LoanTerms, AmortizationRow,
    AmortizationSchedule, AmortizationSummary, MAX_SCHEDULE_MONTHS,
};
pub use capital::{
    npv, discounted_cashflows, cumulative_cashflows, payback_period, parse_cashflows, Payback,
};
