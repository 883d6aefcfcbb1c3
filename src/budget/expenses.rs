//! Expenses logged against budget categories

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculations::decimal_sum;
use crate::error::{CalcError, CalcResult};

/// A single logged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub category: String,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Append-only list of expenses, in the order they were logged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseLog {
    entries: Vec<Expense>,
}

impl ExpenseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an expense. Category existence is checked by the session.
    pub fn record(&mut self, category: &str, date: NaiveDate, amount: f64) -> CalcResult<&Expense> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CalcError::value_range(
                "amount",
                format!("{} is not a valid expense amount", amount),
            ));
        }

        let index = self.entries.len();
        self.entries.push(Expense {
            category: category.trim().to_string(),
            date,
            amount,
        });
        Ok(&self.entries[index])
    }

    pub fn entries(&self) -> &[Expense] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact total spent in one category (0 when nothing was logged)
    pub fn total_for(&self, category: &str) -> CalcResult<f64> {
        decimal_sum(
            self.entries
                .iter()
                .filter(|e| e.category == category)
                .map(|e| e.amount),
        )
    }

    /// Exact totals for every category that has expenses
    pub fn totals_by_category(&self) -> CalcResult<HashMap<String, f64>> {
        let mut grouped: HashMap<&str, Vec<f64>> = HashMap::new();
        for entry in &self.entries {
            grouped.entry(entry.category.as_str()).or_default().push(entry.amount);
        }

        grouped
            .into_iter()
            .map(|(category, amounts)| decimal_sum(amounts).map(|total| (category.to_string(), total)))
            .collect()
    }

    /// Expenses of one category sorted by date; same-day entries keep logging order
    pub fn trend(&self, category: &str) -> Vec<&Expense> {
        let mut series: Vec<&Expense> = self.entries.iter().filter(|e| e.category == category).collect();
        series.sort_by_key(|e| e.date);
        series
    }

    /// Drop every expense of a category, returning how many were removed
    pub fn remove_category(&mut self, category: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.category != category);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_totals_are_exact() {
        let mut log = ExpenseLog::new();
        log.record("Groceries", day(1), 0.1).unwrap();
        log.record("Groceries", day(2), 0.2).unwrap();
        log.record("Rent", day(1), 1200.0).unwrap();

        assert_eq!(log.total_for("Groceries").unwrap(), 0.3);
        assert_eq!(log.total_for("Utilities").unwrap(), 0.0);

        let totals = log.totals_by_category().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Rent"], 1200.0);
    }

    #[test]
    fn test_record_returns_new_entry() {
        let mut log = ExpenseLog::new();
        log.record("Rent", day(1), 900.0).unwrap();
        let expense = log.record("  Fuel ", day(4), 42.5).unwrap();
        assert_eq!(expense.category, "Fuel");
        assert_eq!(expense.date, day(4));
        assert_eq!(expense.amount, 42.5);
        assert_eq!(log.entries().last().unwrap().amount, 42.5);
    }

    #[test]
    fn test_rejects_negative_amounts() {
        let mut log = ExpenseLog::new();
        assert!(log.record("Rent", day(1), -5.0).is_err());
        assert!(log.record("Rent", day(1), f64::INFINITY).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_trend_sorted_by_date() {
        let mut log = ExpenseLog::new();
        log.record("Fuel", day(9), 40.0).unwrap();
        log.record("Fuel", day(2), 35.0).unwrap();
        log.record("Rent", day(1), 900.0).unwrap();
        log.record("Fuel", day(2), 20.0).unwrap();

        let amounts: Vec<f64> = log.trend("Fuel").iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![35.0, 20.0, 40.0]);
        assert!(log.trend("Travel").is_empty());
    }

    #[test]
    fn test_remove_category() {
        let mut log = ExpenseLog::new();
        log.record("Fuel", day(1), 10.0).unwrap();
        log.record("Fuel", day(2), 10.0).unwrap();
        log.record("Rent", day(1), 10.0).unwrap();
        assert_eq!(log.remove_category("Fuel"), 2);
        assert_eq!(log.len(), 1);
    }
}
