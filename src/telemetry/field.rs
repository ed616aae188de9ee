//! Loosely typed telemetry fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw field as published by the controller.
///
/// Readings arrive either as numbers or as strings carrying a unit suffix
/// (`"12.4V"`, `"950"`). Anything else is kept verbatim, so deserializing a
/// `Field` never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Field {
    /// The field as text, if it is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether the field carries nothing worth showing (empty string, `false`).
    pub fn is_blank(&self) -> bool {
        match self {
            Field::Text(text) => text.is_empty(),
            Field::Other(Value::Bool(b)) => !b,
            Field::Other(Value::Null) => true,
            _ => false,
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Number(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => write!(f, "{}", n),
            Field::Text(text) => f.write_str(text),
            Field::Other(value) => write!(f, "{}", value),
        }
    }
}
