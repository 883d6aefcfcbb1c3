//! Boundary values handed to the calculators by the presentation layer
//!
//! Form widgets produce loosely-typed values. [`InputValue`] models everything a
//! widget can emit, and [`Real`] is the subset the calculators accept. Booleans
//! count as numbers (`true` = 1, `false` = 0); everything else is rejected
//! before any arithmetic runs.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

const REAL_NUMBER: &str = "a real number (int, float or bool)";
const INTEGER: &str = "an integer";

/// A value as collected from an input widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Complex { re: f64, im: f64 },
    List(Vec<InputValue>),
    Map(Vec<(String, InputValue)>),
    Set(Vec<InputValue>),
}

impl InputValue {
    /// Type name reported in validation errors
    pub fn type_name(&self) -> &'static str {
        match self {
            InputValue::Null => "NoneType",
            InputValue::Bool(_) => "bool",
            InputValue::Int(_) => "int",
            InputValue::Float(_) => "float",
            InputValue::Text(_) => "str",
            InputValue::Complex { .. } => "complex",
            InputValue::List(_) => "list",
            InputValue::Map(_) => "dict",
            InputValue::Set(_) => "set",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Int(value)
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        InputValue::Int(i64::from(value))
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Float(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl<T: Into<InputValue>> From<Option<T>> for InputValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(InputValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => InputValue::Null,
            Value::Bool(b) => InputValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => InputValue::Int(i),
                // u64 beyond i64::MAX and every non-integral number
                None => InputValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => InputValue::Text(s),
            Value::Array(items) => InputValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => InputValue::Map(
                map.into_iter().map(|(k, v)| (k, InputValue::from(v))).collect(),
            ),
        }
    }
}

/// A value accepted as a real number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Real {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Real {
    /// Accept int, float or bool; reject every other input type
    pub fn from_input(param: &str, value: &InputValue) -> CalcResult<Self> {
        match value {
            InputValue::Int(i) => Ok(Real::Int(*i)),
            InputValue::Float(f) => Ok(Real::Float(*f)),
            InputValue::Bool(b) => Ok(Real::Bool(*b)),
            other => Err(CalcError::type_validation(param, REAL_NUMBER, other.type_name())),
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Real::Int(i) => i as f64,
            Real::Float(f) => f,
            Real::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Real::Int(value)
    }
}

impl From<f64> for Real {
    fn from(value: f64) -> Self {
        Real::Float(value)
    }
}

impl From<bool> for Real {
    fn from(value: bool) -> Self {
        Real::Bool(value)
    }
}

/// Accept an integer count (bool counts as 0/1). Floats are rejected even when integral.
pub fn require_integer(param: &str, value: &InputValue) -> CalcResult<i64> {
    match value {
        InputValue::Int(i) => Ok(*i),
        InputValue::Bool(b) => Ok(i64::from(*b)),
        other => Err(CalcError::type_validation(param, INTEGER, other.type_name())),
    }
}

/// Fail with a type error if any of the named inputs is missing
pub fn require_present(inputs: &[(&str, &InputValue)]) -> CalcResult<()> {
    match inputs.iter().find(|(_, value)| value.is_null()) {
        Some((param, value)) => Err(CalcError::type_validation(
            *param,
            "present (not None)",
            value.type_name(),
        )),
        None => Ok(()),
    }
}
