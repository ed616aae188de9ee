//! Per-path payload schemas.
//!
//! Every field is optional and unknown keys are kept, so any object published
//! under a path decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Field;
use crate::data::{extract_numeric_value, parse_leading_float, Alert, AlertSeverity};

fn text(field: &Option<Field>) -> Option<String> {
    field.as_ref().filter(|f| !f.is_blank()).map(Field::to_string)
}

/// Live readings under `controller`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerTelemetry {
    #[serde(rename = "RPM", default)]
    pub rpm: Option<Field>,
    #[serde(default)]
    pub oil_pressure: Option<Field>,
    #[serde(default)]
    pub battery_level: Option<Field>,
    #[serde(default)]
    pub fuel_level: Option<Field>,
    #[serde(default)]
    pub temperature: Option<Field>,
    #[serde(default)]
    pub timestamp: Option<Field>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ControllerTelemetry {
    pub fn rpm(&self) -> f64 {
        extract_numeric_value(self.rpm.as_ref())
    }

    pub fn oil_pressure(&self) -> f64 {
        extract_numeric_value(self.oil_pressure.as_ref())
    }

    pub fn battery_level(&self) -> f64 {
        extract_numeric_value(self.battery_level.as_ref())
    }

    pub fn fuel_level(&self) -> f64 {
        extract_numeric_value(self.fuel_level.as_ref())
    }

    pub fn temperature(&self) -> f64 {
        extract_numeric_value(self.temperature.as_ref())
    }

    pub fn timestamp(&self) -> Option<String> {
        text(&self.timestamp)
    }

    /// Every field as displayed in the raw values panel, known fields first.
    pub fn raw_fields(&self) -> Vec<(String, String)> {
        let known = [
            ("RPM", &self.rpm),
            ("oil_pressure", &self.oil_pressure),
            ("battery_level", &self.battery_level),
            ("fuel_level", &self.fuel_level),
            ("temperature", &self.temperature),
            ("timestamp", &self.timestamp),
        ];
        let mut fields: Vec<(String, String)> = known
            .into_iter()
            .filter_map(|(key, field)| field.as_ref().map(|f| (key.to_string(), f.to_string())))
            .collect();
        fields.extend(self.extra.iter().map(|(key, value)| {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), shown)
        }));
        fields
    }
}

/// Engine state under `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTelemetry {
    #[serde(default)]
    pub engine_status: Option<Field>,
    #[serde(default)]
    pub engine_status_code: Option<Field>,
    #[serde(default)]
    pub timestamp: Option<Field>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StatusTelemetry {
    pub fn engine_status(&self) -> Option<String> {
        text(&self.engine_status)
    }

    /// The status code, whether published as a number or numeric text.
    pub fn status_code(&self) -> Option<f64> {
        match self.engine_status_code.as_ref()? {
            Field::Number(n) => Some(*n),
            Field::Text(t) => parse_leading_float(t),
            Field::Other(_) => None,
        }
    }

    pub fn timestamp(&self) -> Option<String> {
        text(&self.timestamp)
    }
}

/// Active alerts under `Alerts`.
///
/// The controller publishes one message per alert kind under a `*_alert` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsTelemetry {
    #[serde(default)]
    pub battery_alert: Option<Field>,
    #[serde(default)]
    pub timestamp: Option<Field>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AlertsTelemetry {
    pub fn timestamp(&self) -> Option<String> {
        text(&self.timestamp)
    }

    /// Severity published for an alert kind as `<kind>_severity`, else the
    /// shared `severity` key, else a warning.
    pub fn severity_of(&self, kind: &str) -> AlertSeverity {
        self.extra
            .get(&format!("{}_severity", kind))
            .or_else(|| self.extra.get("severity"))
            .and_then(Value::as_str)
            .map_or(AlertSeverity::Warning, AlertSeverity::parse)
    }

    /// Current alerts, battery first, then other kinds by key.
    pub fn active_alerts(&self) -> Vec<Alert> {
        let timestamp = self.timestamp();
        let battery = text(&self.battery_alert).map(|message| ("battery_alert", message));
        let others = self.extra.iter().filter_map(|(key, value)| match value {
            Value::String(message) if key.ends_with("_alert") && !message.is_empty() => {
                Some((key.as_str(), message.clone()))
            }
            _ => None,
        });

        battery
            .into_iter()
            .chain(others)
            .map(|(key, message)| {
                let kind = key.trim_end_matches("_alert");
                Alert {
                    id: format!("current-{}", kind),
                    message,
                    timestamp: timestamp.clone(),
                    severity: self.severity_of(kind),
                }
            })
            .collect()
    }
}

/// Electrical readings under `engineDATA`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineTelemetry {
    #[serde(rename = "VoltageL1", default)]
    pub voltage_l1: Option<Field>,
    #[serde(rename = "VoltageL2", default)]
    pub voltage_l2: Option<Field>,
    #[serde(rename = "VoltageL3", default)]
    pub voltage_l3: Option<Field>,
    #[serde(rename = "CurrentL1", default)]
    pub current_l1: Option<Field>,
    #[serde(rename = "CurrentL2", default)]
    pub current_l2: Option<Field>,
    #[serde(rename = "CurrentL3", default)]
    pub current_l3: Option<Field>,
    #[serde(rename = "BusVoltage1", default)]
    pub bus_voltage_1: Option<Field>,
    #[serde(rename = "BusVoltage2", default)]
    pub bus_voltage_2: Option<Field>,
    #[serde(rename = "BusVoltage3", default)]
    pub bus_voltage_3: Option<Field>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EngineTelemetry {
    fn triple(fields: [&Option<Field>; 3]) -> [f64; 3] {
        fields.map(|f| extract_numeric_value(f.as_ref()))
    }

    /// L1..L3 line voltages; missing readings are 0.
    pub fn line_voltages(&self) -> [f64; 3] {
        Self::triple([&self.voltage_l1, &self.voltage_l2, &self.voltage_l3])
    }

    pub fn phase_currents(&self) -> [f64; 3] {
        Self::triple([&self.current_l1, &self.current_l2, &self.current_l3])
    }

    pub fn bus_voltages(&self) -> [f64; 3] {
        Self::triple([&self.bus_voltage_1, &self.bus_voltage_2, &self.bus_voltage_3])
    }
}

/// Availability and maintenance figures under `optimisation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimisationTelemetry {
    #[serde(default)]
    pub availability: Option<Field>,
    #[serde(default)]
    pub off_service: Option<Field>,
    #[serde(default)]
    pub off_vs_maintenance: Option<Field>,
    #[serde(rename = "runHours", default)]
    pub run_hours: Option<Field>,
    #[serde(rename = "maintenanceHours", default)]
    pub maintenance_hours: Option<Field>,
    #[serde(rename = "stopTime", default)]
    pub stop_time: Option<Field>,
    #[serde(default)]
    pub timestamp: Option<Field>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OptimisationTelemetry {
    pub fn run_hours(&self) -> f64 {
        extract_numeric_value(self.run_hours.as_ref())
    }

    pub fn maintenance_hours(&self) -> f64 {
        extract_numeric_value(self.maintenance_hours.as_ref())
    }

    pub fn stop_time(&self) -> f64 {
        extract_numeric_value(self.stop_time.as_ref())
    }

    pub fn timestamp(&self) -> Option<String> {
        text(&self.timestamp)
    }

    /// Share of the maintenance interval already run, in percent.
    ///
    /// `None` when no maintenance interval is known.
    pub fn maintenance_percentage(&self) -> Option<f64> {
        let maintenance = self.maintenance_hours();
        if maintenance == 0.0 {
            return None;
        }
        Some(self.run_hours() / maintenance * 100.0)
    }

    /// Whether more than 80% of the maintenance interval has been used.
    pub fn maintenance_due_soon(&self) -> bool {
        self.maintenance_percentage().is_some_and(|pct| pct > 80.0)
    }

    /// Hours left until maintenance is due, never negative.
    pub fn hours_remaining(&self) -> f64 {
        (self.maintenance_hours() - self.run_hours()).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_controller_readings() {
        let controller: ControllerTelemetry = serde_json::from_value(json!({
            "RPM": "1500 rpm",
            "oil_pressure": "6.8 bar",
            "battery_level": "12.6V",
            "fuel_level": 64,
            "temperature": "V78",
            "mode": "auto"
        }))
        .unwrap();

        assert_eq!(controller.rpm(), 1500.0);
        assert_eq!(controller.oil_pressure(), 6.8);
        assert_eq!(controller.battery_level(), 12.6);
        assert_eq!(controller.fuel_level(), 64.0);
        assert_eq!(controller.temperature(), 0.0);
        assert!(controller.timestamp().is_none());

        let raw = controller.raw_fields();
        assert_eq!(raw[0], ("RPM".to_string(), "1500 rpm".to_string()));
        assert_eq!(raw.last(), Some(&("mode".to_string(), "auto".to_string())));
    }

    #[test]
    fn test_status_code_from_number_or_text() {
        let numeric: StatusTelemetry =
            serde_json::from_value(json!({"engine_status_code": 24})).unwrap();
        assert_eq!(numeric.status_code(), Some(24.0));

        let textual: StatusTelemetry =
            serde_json::from_value(json!({"engine_status_code": "15"})).unwrap();
        assert_eq!(textual.status_code(), Some(15.0));

        let missing = StatusTelemetry::default();
        assert_eq!(missing.status_code(), None);
        assert!(missing.engine_status().is_none());
    }

    #[test]
    fn test_active_alerts() {
        let alerts: AlertsTelemetry = serde_json::from_value(json!({
            "battery_alert": "Battery voltage dropping",
            "fuel_alert": "Low fuel",
            "oil_alert": "",
            "timestamp": "2025-05-17T00:01:12.004Z"
        }))
        .unwrap();

        let active = alerts.active_alerts();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, "current-battery");
        assert_eq!(active[0].message, "Battery voltage dropping");
        assert_eq!(active[1].id, "current-fuel");
        assert_eq!(active[1].severity, AlertSeverity::Warning);
        assert_eq!(active[1].timestamp.as_deref(), Some("2025-05-17T00:01:12.004Z"));
    }

    #[test]
    fn test_alert_severity_by_kind() {
        let alerts: AlertsTelemetry = serde_json::from_value(json!({
            "battery_alert": "Battery voltage dropping",
            "battery_severity": "Critical",
            "fuel_alert": "Low fuel",
            "oil_alert": "Oil pressure low",
            "severity": "info"
        }))
        .unwrap();

        let active = alerts.active_alerts();
        assert_eq!(active.len(), 3);
        assert_eq!(active[0].severity, AlertSeverity::Critical);
        assert_eq!(active[1].severity, AlertSeverity::Info);
        assert_eq!(active[2].id, "current-oil");
        assert_eq!(active[2].severity, AlertSeverity::Info);
        assert_eq!(AlertsTelemetry::default().severity_of("fuel"), AlertSeverity::Warning);
    }

    #[test]
    fn test_no_alerts() {
        assert!(AlertsTelemetry::default().active_alerts().is_empty());
    }

    #[test]
    fn test_engine_missing_readings_are_zero() {
        let engine: EngineTelemetry = serde_json::from_value(json!({
            "VoltageL1": 229.4,
            "VoltageL3": "228.7",
            "CurrentL2": 29.8
        }))
        .unwrap();
        assert_eq!(engine.line_voltages(), [229.4, 0.0, 228.7]);
        assert_eq!(engine.phase_currents(), [0.0, 29.8, 0.0]);
        assert_eq!(engine.bus_voltages(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_maintenance_figures() {
        let optimisation: OptimisationTelemetry = serde_json::from_value(json!({
            "runHours": 640,
            "maintenanceHours": 900
        }))
        .unwrap();
        let pct = optimisation.maintenance_percentage().unwrap();
        assert!((pct - 71.111).abs() < 0.001);
        assert_eq!(optimisation.hours_remaining(), 260.0);

        let overdue: OptimisationTelemetry = serde_json::from_value(json!({
            "runHours": 950,
            "maintenanceHours": 900
        }))
        .unwrap();
        assert_eq!(overdue.hours_remaining(), 0.0);

        let unknown = OptimisationTelemetry::default();
        assert_eq!(unknown.maintenance_percentage(), None);
        assert_eq!(unknown.hours_remaining(), 0.0);
    }

    #[test]
    fn test_maintenance_due_soon_above_eighty_percent() {
        let usage = |run: u32| -> OptimisationTelemetry {
            serde_json::from_value(json!({"runHours": run, "maintenanceHours": 1000})).unwrap()
        };
        assert!(!usage(800).maintenance_due_soon());
        assert!(usage(810).maintenance_due_soon());
        assert!(usage(1200).maintenance_due_soon());
        assert!(!OptimisationTelemetry::default().maintenance_due_soon());
    }
}
