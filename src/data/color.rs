//! Severity colors for status codes and readings.

use serde::{Deserialize, Serialize};

use super::numeric::field_as_float;
use crate::telemetry::Field;

/// The fixed palette used to convey operational health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Red,
    Orange,
    Blue,
    Green,
    Grey,
}

impl StatusColor {
    /// CSS-style hex code.
    pub fn hex(&self) -> &'static str {
        match self {
            StatusColor::Red => "#f44336",
            StatusColor::Orange => "#ff9800",
            StatusColor::Blue => "#2196f3",
            StatusColor::Green => "#4caf50",
            StatusColor::Grey => "#9e9e9e",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            StatusColor::Red => (0xf4, 0x43, 0x36),
            StatusColor::Orange => (0xff, 0x98, 0x00),
            StatusColor::Blue => (0x21, 0x96, 0xf3),
            StatusColor::Green => (0x4c, 0xaf, 0x50),
            StatusColor::Grey => (0x9e, 0x9e, 0x9e),
        }
    }
}

/// The status code the controller reports when the engine is ready.
pub const READY_STATUS_CODE: f64 = 24.0;

/// Color for an engine status code.
///
/// Checks run in order: the ready code first, then the critical and warning
/// ranges.
pub fn status_color(code: Option<f64>) -> StatusColor {
    match code {
        None => StatusColor::Grey,
        Some(c) if c.is_nan() => StatusColor::Grey,
        Some(c) if c == READY_STATUS_CODE => StatusColor::Green,
        Some(c) if c < 10.0 => StatusColor::Red,
        Some(c) if c < 20.0 => StatusColor::Orange,
        Some(_) => StatusColor::Blue,
    }
}

/// Color for a battery level such as `"12.4V"`.
pub fn battery_color(level: Option<&Field>) -> StatusColor {
    match field_as_float(level) {
        None => StatusColor::Grey,
        Some(v) if v < 11.8 => StatusColor::Red,
        Some(v) if v < 12.2 => StatusColor::Orange,
        Some(_) => StatusColor::Green,
    }
}

/// Color for a percentage; bucket boundaries belong to the upper bucket.
pub fn percentage_color(value: Option<&Field>) -> StatusColor {
    match field_as_float(value) {
        None => StatusColor::Grey,
        Some(v) if v < 25.0 => StatusColor::Red,
        Some(v) if v < 50.0 => StatusColor::Orange,
        Some(v) if v < 75.0 => StatusColor::Blue,
        Some(_) => StatusColor::Green,
    }
}

/// Color for the share of the maintenance interval already used.
pub fn maintenance_color(percentage: f64) -> StatusColor {
    if percentage > 80.0 {
        StatusColor::Red
    } else if percentage > 50.0 {
        StatusColor::Orange
    } else {
        StatusColor::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_color() {
        assert_eq!(status_color(Some(24.0)), StatusColor::Green);
        assert_eq!(status_color(Some(5.0)), StatusColor::Red);
        assert_eq!(status_color(Some(0.0)), StatusColor::Red);
        assert_eq!(status_color(Some(15.0)), StatusColor::Orange);
        assert_eq!(status_color(Some(10.0)), StatusColor::Orange);
        assert_eq!(status_color(Some(20.0)), StatusColor::Blue);
        assert_eq!(status_color(Some(30.0)), StatusColor::Blue);
        assert_eq!(status_color(None), StatusColor::Grey);
    }

    #[test]
    fn test_battery_color() {
        assert_eq!(battery_color(Some(&Field::from("11.5V"))), StatusColor::Red);
        assert_eq!(battery_color(Some(&Field::from("12.0V"))), StatusColor::Orange);
        assert_eq!(battery_color(Some(&Field::from("12.5V"))), StatusColor::Green);
        assert_eq!(battery_color(Some(&Field::from("11.8V"))), StatusColor::Orange);
        assert_eq!(battery_color(Some(&Field::from("12.2"))), StatusColor::Green);
        assert_eq!(battery_color(Some(&Field::Number(12.6))), StatusColor::Green);
        assert_eq!(battery_color(Some(&Field::from("low"))), StatusColor::Grey);
        assert_eq!(battery_color(Some(&Field::from(""))), StatusColor::Grey);
        assert_eq!(battery_color(None), StatusColor::Grey);
    }

    #[test]
    fn test_percentage_color() {
        let pct = |v: f64| percentage_color(Some(&Field::Number(v)));
        assert_eq!(pct(10.0), StatusColor::Red);
        assert_eq!(pct(40.0), StatusColor::Orange);
        assert_eq!(pct(60.0), StatusColor::Blue);
        assert_eq!(pct(90.0), StatusColor::Green);
        assert_eq!(pct(25.0), StatusColor::Orange);
        assert_eq!(pct(50.0), StatusColor::Blue);
        assert_eq!(pct(75.0), StatusColor::Green);
        assert_eq!(percentage_color(Some(&Field::from("92.5%"))), StatusColor::Green);
        assert_eq!(percentage_color(Some(&Field::from("abc"))), StatusColor::Grey);
        assert_eq!(percentage_color(None), StatusColor::Grey);
    }

    #[test]
    fn test_maintenance_color() {
        assert_eq!(maintenance_color(81.0), StatusColor::Red);
        assert_eq!(maintenance_color(80.0), StatusColor::Orange);
        assert_eq!(maintenance_color(51.0), StatusColor::Orange);
        assert_eq!(maintenance_color(50.0), StatusColor::Green);
    }

    #[test]
    fn test_palette() {
        assert_eq!(StatusColor::Red.hex(), "#f44336");
        assert_eq!(StatusColor::Grey.rgb(), (158, 158, 158));
    }
}
