//! Attribute values.
//!
//! Attribute values are either real numbers or text. Text covers flags such
//! as `true`/`false` and any deferred expression that is not a plain numeric
//! literal; expressions are carried verbatim and never evaluated.

use std::fmt;

/// A single attribute value of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A real number.
    Number(f64),
    /// A flag, identifier or unevaluated expression.
    Text(String),
}

impl Value {
    /// Returns the numeric value, or `None` for text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Returns the text value, or `None` for numbers.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(text) => Some(text),
        }
    }

    /// Returns `true` if this is a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Numbers print in their shortest round-trip form and always carry a
/// decimal point or exponent (`8.0`, `0.25`, `1e-7`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Text(text) => write!(f, "{text}"),
        }
    }
}
