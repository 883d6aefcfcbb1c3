//! Session-scoped budget state
//!
//! Categories with planned amounts, the expenses logged against them, and the
//! budgeted-vs-actual summary built with the variance calculator. Nothing here
//! outlives the session that owns it.

mod table;
mod expenses;
mod session;

pub use table::{BudgetTable, BudgetCategory, Upsert};
pub use expenses::{Expense, ExpenseLog};
pub use session::{BudgetSession, BudgetSummary, SummaryRow, SummaryTotals};
