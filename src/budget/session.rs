//! Budget session: the plan, the expenses logged against it, and the variance summary

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::expenses::{Expense, ExpenseLog};
use super::table::{BudgetTable, Upsert};
use crate::calculations::{decimal_sum, percentage_variance, variance_of, Variance};
use crate::config::DashboardConfig;
use crate::error::{CalcError, CalcResult};
use crate::numeric::Real;

/// Mutable budgeting state for one interactive session
///
/// Owned by the presentation layer and passed by `&mut` to every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetSession {
    pub table: BudgetTable,
    pub expenses: ExpenseLog,

    /// Variance above this amount is reported as overspending
    pub overspend_threshold: f64,
}

impl BudgetSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            overspend_threshold: config.overspend_threshold,
            ..Self::default()
        }
    }

    /// Define a category or change its budgeted amount
    pub fn add_category(&mut self, name: &str, budgeted: f64) -> CalcResult<Upsert> {
        let outcome = self.table.upsert(name, budgeted)?;
        debug!("{:?} budget category '{}' = {:.2}", outcome, name.trim(), budgeted);
        Ok(outcome)
    }

    /// Remove a category together with its logged expenses
    pub fn remove_category(&mut self, name: &str) -> bool {
        match self.table.remove(name) {
            Some(category) => {
                let dropped = self.expenses.remove_category(&category.name);
                debug!("Removed category '{}' and {} expenses", category.name, dropped);
                true
            }
            None => false,
        }
    }

    /// Log an expense against an existing category
    pub fn log_expense(&mut self, category: &str, date: NaiveDate, amount: f64) -> CalcResult<&Expense> {
        if !self.table.contains(category) {
            return Err(CalcError::value_range(
                "category",
                format!("'{}' is not a budget category", category.trim()),
            ));
        }
        let expense = self.expenses.record(category, date, amount)?;
        debug!("Logged {:.2} against '{}' on {}", expense.amount, expense.category, expense.date);
        Ok(expense)
    }

    /// Budgeted vs actual for every category, in table order
    pub fn summary(&self) -> CalcResult<BudgetSummary> {
        let totals = self.expenses.totals_by_category()?;

        let rows = self
            .table
            .categories()
            .iter()
            .map(|category| -> CalcResult<SummaryRow> {
                let budgeted = Real::Float(category.budgeted);
                let actual = totals.get(&category.name).copied().unwrap_or(0.0);
                let variance = variance_of(budgeted, Real::Float(actual))?;
                let overspent = variance.is_overspend(self.overspend_threshold);

                if overspent {
                    info!("Overspending in '{}': variance {}", category.name, variance);
                }

                Ok(SummaryRow {
                    category: category.name.clone(),
                    budgeted: category.budgeted,
                    actual,
                    variance,
                    percentage_variance: percentage_variance(budgeted, Real::Float(actual))?,
                    overspent,
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;

        Ok(BudgetSummary { rows })
    }
}

/// One category of the budget summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub category: String,
    pub budgeted: f64,

    /// Sum of logged expenses (0 when none)
    pub actual: f64,

    /// Actual minus budgeted
    pub variance: Variance,

    /// Variance as a percent of budget; `None` for a zero budget
    pub percentage_variance: Option<f64>,

    pub overspent: bool,
}

/// Budget vs actual table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub rows: Vec<SummaryRow>,
}

/// Column totals of a [`BudgetSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub budgeted: f64,
    pub actual: f64,
    pub variance: Variance,
}

impl BudgetSummary {
    /// Rows flagged as overspent
    pub fn alerts(&self) -> Vec<&SummaryRow> {
        self.rows.iter().filter(|r| r.overspent).collect()
    }

    pub fn totals(&self) -> CalcResult<SummaryTotals> {
        let budgeted = decimal_sum(self.rows.iter().map(|r| r.budgeted))?;
        let actual = decimal_sum(self.rows.iter().map(|r| r.actual))?;

        Ok(SummaryTotals {
            budgeted,
            actual,
            variance: variance_of(Real::Float(budgeted), Real::Float(actual))?,
        })
    }
}
