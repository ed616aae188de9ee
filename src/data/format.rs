//! Display formatting for readings.

use super::numeric::parse_leading_float;
use crate::telemetry::Field;

/// Format a percentage reading.
///
/// Text that already carries `%` is shown as published; other values are
/// rendered with one decimal place. Absent or non-numeric values give `"N/A"`.
pub fn format_percentage(value: Option<&Field>) -> String {
    let number = match value {
        None => return "N/A".to_string(),
        Some(Field::Text(text)) if text.contains('%') => return text.clone(),
        Some(Field::Text(text)) => parse_leading_float(text),
        Some(Field::Number(n)) => Some(*n).filter(|n| !n.is_nan()),
        Some(Field::Other(_)) => None,
    };
    match number {
        Some(n) => format!("{:.1}%", n),
        None => "N/A".to_string(),
    }
}

/// A reading with its unit, or `"N/A"` when absent.
pub fn format_reading(value: Option<&Field>) -> String {
    match value {
        Some(field) if !field.is_blank() => field.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Hours with no trailing fraction when whole.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{:.0} h", hours)
    } else {
        format!("{:.1} h", hours)
    }
}
