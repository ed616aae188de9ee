//! Gauge ranges and color bands for controller and engine readings.

use super::color::StatusColor;
use StatusColor::{Green, Orange, Red};

/// A dial with a fixed range and colored bands.
///
/// A value takes the color of the first band whose limit it is below; values
/// at or above the last limit take `above`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    bands: &'static [(f64, StatusColor)],
    above: StatusColor,
}

impl Gauge {
    pub fn color(&self, value: f64) -> StatusColor {
        self.bands
            .iter()
            .find(|(limit, _)| value < *limit)
            .map(|(_, color)| *color)
            .unwrap_or(self.above)
    }

    /// Position of `value` in the range, clamped to `0.0..=1.0`.
    pub fn ratio(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || value.is_nan() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

pub const RPM: Gauge = Gauge {
    label: "RPM",
    unit: "rpm",
    min: 0.0,
    max: 2500.0,
    bands: &[(500.0, Green), (1000.0, Green), (1500.0, Orange), (2000.0, Orange)],
    above: Red,
};

pub const OIL_PRESSURE: Gauge = Gauge {
    label: "Oil Pressure",
    unit: "bar",
    min: 0.0,
    max: 10.0,
    bands: &[(3.0, Red), (6.0, Orange), (8.0, Green), (9.0, Orange)],
    above: Red,
};

pub const TEMPERATURE: Gauge = Gauge {
    label: "Temperature",
    unit: "°C",
    min: 0.0,
    max: 100.0,
    bands: &[(20.0, Green), (40.0, Green), (60.0, Orange), (80.0, Orange)],
    above: Red,
};

pub const BATTERY: Gauge = Gauge {
    label: "Battery",
    unit: "V",
    min: 11.0,
    max: 14.0,
    bands: &[(11.8, Red), (12.2, Orange), (13.0, Green), (14.0, Orange)],
    above: Red,
};

pub const FUEL: Gauge = Gauge {
    label: "Fuel Level",
    unit: "%",
    min: 0.0,
    max: 100.0,
    bands: &[(25.0, Red), (50.0, Orange), (75.0, Green)],
    above: Green,
};

pub const LINE_VOLTAGE: Gauge = Gauge {
    label: "Voltage",
    unit: "V",
    min: 0.0,
    max: 300.0,
    bands: &[(50.0, Red), (100.0, Orange), (200.0, Green), (250.0, Orange)],
    above: Red,
};

pub const BUS_VOLTAGE: Gauge = Gauge {
    label: "Bus Voltage",
    ..LINE_VOLTAGE
};

pub const PHASE_CURRENT: Gauge = Gauge {
    label: "Current",
    unit: "A",
    min: 0.0,
    max: 60.0,
    bands: &[(10.0, Red), (20.0, Orange), (40.0, Green), (50.0, Orange)],
    above: Red,
};
