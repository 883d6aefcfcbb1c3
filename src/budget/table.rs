//! Ordered budget categories keyed by name

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// A planned spending amount for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub name: String,
    pub budgeted: f64,
}

/// Whether an upsert added a category or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Budget plan for the current session
///
/// Categories keep their insertion order; updating a category's amount does
/// not move it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetTable {
    categories: Vec<BudgetCategory>,
}

impl BudgetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category, or replace the budgeted amount of an existing one
    ///
    /// Names are trimmed; blank names and negative or non-finite amounts are rejected.
    pub fn upsert(&mut self, name: &str, budgeted: f64) -> CalcResult<Upsert> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CalcError::value_range("category", "name must not be blank"));
        }
        if !budgeted.is_finite() || budgeted < 0.0 {
            return Err(CalcError::value_range(
                "budgeted",
                format!("{} is not a valid budget for '{}'", budgeted, name),
            ));
        }

        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                existing.budgeted = budgeted;
                Ok(Upsert::Updated)
            }
            None => {
                self.categories.push(BudgetCategory {
                    name: name.to_string(),
                    budgeted,
                });
                Ok(Upsert::Inserted)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.name == name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<BudgetCategory> {
        let idx = self.categories.iter().position(|c| c.name == name.trim())?;
        Some(self.categories.remove(idx))
    }

    /// Categories in insertion order
    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
