//! Error types shared by every calculator
//!
//! Validation always runs before arithmetic, so a returned error means no
//! partial result was produced.

use serde::Serialize;
use thiserror::Error;

/// Result type for calculator and session operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Failure raised by a calculation or a budget session update
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// An input was not of an accepted numeric type
    #[error("{param} must be {expected}, got {observed}")]
    TypeValidation {
        /// Name of the offending parameter
        param: String,
        /// Description of the accepted types
        expected: &'static str,
        /// Type name of the value actually supplied
        observed: &'static str,
    },

    /// A numeric input violated a domain constraint
    #[error("invalid {param}: {reason}")]
    ValueRange {
        param: String,
        reason: String,
    },

    /// Division by zero in the loan payment formula
    #[error("division by zero: {context}")]
    DivideByZero {
        context: String,
    },
}

/// Coarse classification of a [`CalcError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    TypeValidation,
    ValueRange,
    DivideByZero,
}

impl CalcError {
    pub fn type_validation(
        param: impl Into<String>,
        expected: &'static str,
        observed: &'static str,
    ) -> Self {
        CalcError::TypeValidation {
            param: param.into(),
            expected,
            observed,
        }
    }

    pub fn value_range(param: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ValueRange {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn divide_by_zero(context: impl Into<String>) -> Self {
        CalcError::DivideByZero {
            context: context.into(),
        }
    }

    /// Error class, for callers that only care which rule was broken
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::TypeValidation { .. } => ErrorKind::TypeValidation,
            CalcError::ValueRange { .. } => ErrorKind::ValueRange,
            CalcError::DivideByZero { .. } => ErrorKind::DivideByZero,
        }
    }
}
