//! Numeric extraction from mixed string/number fields.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::telemetry::Field;

/// Leading unsigned decimal, as the controller writes readings ("12.5V").
static LEADING_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(\.\d+)?)").expect("Invalid regex"));

/// Leading float with optional sign, fraction and exponent.
static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("Invalid regex")
});

/// Extract the leading number of a reading.
///
/// Numbers pass through; text yields its leading decimal run; anything
/// absent, empty or without a leading digit yields `0`.
pub fn extract_numeric_value(field: Option<&Field>) -> f64 {
    match field {
        Some(Field::Number(n)) if n.is_finite() => *n,
        Some(Field::Text(text)) => extract_numeric_str(text),
        _ => 0.0,
    }
}

/// [`extract_numeric_value`] for plain text.
pub fn extract_numeric_str(text: &str) -> f64 {
    LEADING_DECIMAL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Parse the longest float prefix of `text`, ignoring leading whitespace.
///
/// Returns `None` when the text does not start with a number.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let unsigned = text.strip_prefix(|c| c == '+' || c == '-').unwrap_or(text);
    if unsigned.starts_with("Infinity") {
        return Some(if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    LEADING_FLOAT.find(text).and_then(|m| m.as_str().parse().ok())
}

/// A field as a float, for the classifiers that accept numeric text.
///
/// Blank, non-numeric and `NaN` inputs are `None`.
pub fn field_as_float(field: Option<&Field>) -> Option<f64> {
    match field? {
        Field::Number(n) if !n.is_nan() => Some(*n),
        Field::Text(text) => parse_leading_float(text),
        _ => None,
    }
}
