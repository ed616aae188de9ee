//! Recent readings for sparklines.

use std::collections::{HashMap, VecDeque};

use crate::telemetry::ControllerTelemetry;

/// Maximum number of samples kept per metric.
const MAX_HISTORY_SIZE: usize = 60;

/// Controller metrics that are tracked over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Rpm,
    OilPressure,
    Battery,
    Fuel,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Rpm,
        Metric::OilPressure,
        Metric::Battery,
        Metric::Fuel,
        Metric::Temperature,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Rpm => "RPM",
            Metric::OilPressure => "Oil",
            Metric::Battery => "Battery",
            Metric::Fuel => "Fuel",
            Metric::Temperature => "Temp",
        }
    }

    fn read(&self, controller: &ControllerTelemetry) -> f64 {
        match self {
            Metric::Rpm => controller.rpm(),
            Metric::OilPressure => controller.oil_pressure(),
            Metric::Battery => controller.battery_level(),
            Metric::Fuel => controller.fuel_level(),
            Metric::Temperature => controller.temperature(),
        }
    }
}

/// Tracks the last readings of each metric for trend display.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: HashMap<Metric, VecDeque<f64>>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample of every controller metric.
    pub fn record(&mut self, controller: &ControllerTelemetry) {
        for metric in Metric::ALL {
            self.push(metric, metric.read(controller));
        }
    }

    fn push(&mut self, metric: Metric, value: f64) {
        let samples = self.samples.entry(metric).or_default();
        samples.push_back(value);
        if samples.len() > MAX_HISTORY_SIZE {
            samples.pop_front();
        }
    }

    pub fn len(&self, metric: Metric) -> usize {
        self.samples.get(&metric).map_or(0, VecDeque::len)
    }

    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.samples.get(&metric)?.back().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Get sparkline data (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, metric: Metric) -> Vec<u8> {
        let Some(values) = self.samples.get(&metric) else {
            return Vec::new();
        };
        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let range = max - min;

        values
            .iter()
            .map(|&v| {
                if range <= 0.0 {
                    return 0;
                }
                let normalized = ((v - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Field;

    fn controller(rpm: f64) -> ControllerTelemetry {
        ControllerTelemetry {
            rpm: Some(Field::Number(rpm)),
            battery_level: Some(Field::from("12.6V")),
            ..ControllerTelemetry::default()
        }
    }

    #[test]
    fn test_record_every_metric() {
        let mut history = History::new();
        history.record(&controller(950.0));

        assert_eq!(history.latest(Metric::Rpm), Some(950.0));
        assert_eq!(history.latest(Metric::Battery), Some(12.6));
        assert_eq!(history.latest(Metric::Fuel), Some(0.0));
        for metric in Metric::ALL {
            assert_eq!(history.len(metric), 1);
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..100 {
            history.record(&controller(i as f64));
        }
        assert_eq!(history.len(Metric::Rpm), MAX_HISTORY_SIZE);
        assert_eq!(history.latest(Metric::Rpm), Some(99.0));
    }

    #[test]
    fn test_sparkline_needs_two_samples() {
        let mut history = History::new();
        assert!(history.sparkline(Metric::Rpm).is_empty());
        history.record(&controller(950.0));
        assert!(history.sparkline(Metric::Rpm).is_empty());
    }

    #[test]
    fn test_sparkline_normalizes() {
        let mut history = History::new();
        for rpm in [1000.0, 1350.0, 1700.0] {
            history.record(&controller(rpm));
        }
        assert_eq!(history.sparkline(Metric::Rpm), vec![0, 3, 7]);
        // Flat series stays at the bottom
        assert_eq!(history.sparkline(Metric::Battery), vec![0, 0, 0]);
    }
}
