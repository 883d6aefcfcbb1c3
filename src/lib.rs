//! Capital Budgeting - calculators behind an interactive budgeting dashboard
//!
//! This library provides:
//! - Budget variance (actual vs planned) with exact decimal arithmetic
//! - Compound interest projections with monthly or annual compounding
//! - Loan payment and amortization schedules
//! - Net present value and payback period for capital projects
//! - Session-scoped budget tables and expense logs for the dashboard

pub mod error;
pub mod numeric;
pub mod calculations;
pub mod budget;
pub mod config;

// Re-export commonly used types
pub use error::{CalcError, CalcResult, ErrorKind};
pub use numeric::{InputValue, Real};
pub use calculations::{
    variance, project, monthly_payment, npv, payback_period, Variance, CompoundingFrequency,
    LoanTerms, Payback,
};
pub use budget::{BudgetSession, BudgetSummary};
pub use config::DashboardConfig;
