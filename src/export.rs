//! JSON reports of the current panels.
//!
//! Used by the `e` key in the dashboard and by `--export`, which subscribes to
//! every path, waits for the first event of each and writes the report.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::data::{
    battery_color, format_percentage, format_timestamp, gauge, maintenance_color,
    percentage_color, status_color, Gauge,
};
use crate::live::LiveData;
use crate::source::DataSource;
use crate::telemetry::{Telemetry, TelemetryPath};

/// Report for one subscribed path.
#[derive(Debug, Clone, Serialize)]
pub struct PanelReport {
    pub path: String,
    pub state: &'static str,
    pub error: Option<String>,
    pub raw: Option<Value>,
    pub derived: Option<Value>,
}

impl PanelReport {
    pub fn from_live(live: &LiveData) -> Self {
        let path = live.path().unwrap_or_default().to_string();
        let derived = match (path.parse::<TelemetryPath>(), live.data()) {
            (Ok(known), Some(value)) => match Telemetry::decode(known, value) {
                Ok(telemetry) => Some(derive(&telemetry)),
                Err(err) => {
                    debug!(path = %path, error = %err, "value does not match schema");
                    None
                }
            },
            _ => None,
        };

        Self {
            state: live.state().label(),
            error: live.error().map(ToString::to_string),
            raw: live.data().cloned(),
            derived,
            path,
        }
    }
}

/// A full report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub source: String,
    pub panels: Vec<PanelReport>,
}

impl Report {
    pub fn from_feeds<'a>(source: &str, feeds: impl IntoIterator<Item = &'a LiveData>) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            source: source.to_string(),
            panels: feeds.into_iter().map(PanelReport::from_live).collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), panels = self.panels.len(), "wrote report");
        Ok(())
    }
}

/// Subscribe to every path and build a report from the first event of each.
///
/// Paths that produce nothing within `timeout` are reported as loading.
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use genset_watch::{export, MemorySource};
///
/// # tokio_test::block_on(async {
/// let report = export::collect(Arc::new(MemorySource::demo()), Duration::from_secs(1)).await;
/// assert_eq!(report.panels.len(), 5);
/// # });
/// ```
pub async fn collect(source: Arc<dyn DataSource>, timeout: Duration) -> Report {
    let mut feeds: Vec<LiveData> = TelemetryPath::ALL
        .iter()
        .map(|path| LiveData::subscribe(source.clone(), path.as_str()))
        .collect();

    let deadline = tokio::time::Instant::now() + timeout;
    for feed in feeds.iter_mut() {
        if feed.poll() {
            continue;
        }
        if tokio::time::timeout_at(deadline, feed.changed()).await.is_err() {
            warn!(path = ?feed.path(), "no data before timeout");
        }
    }

    Report::from_feeds(source.description(), &feeds)
}

fn gauge_reading(gauge: &Gauge, value: f64) -> Value {
    json!({ "value": value, "unit": gauge.unit, "color": gauge.color(value) })
}

fn gauge_triple(gauge: &Gauge, values: [f64; 3]) -> Value {
    Value::Array(values.iter().map(|v| gauge_reading(gauge, *v)).collect())
}

/// Derived values shown for a decoded payload.
pub fn derive(telemetry: &Telemetry) -> Value {
    match telemetry {
        Telemetry::Controller(c) => json!({
            "rpm": gauge_reading(&gauge::RPM, c.rpm()),
            "oil_pressure": gauge_reading(&gauge::OIL_PRESSURE, c.oil_pressure()),
            "battery_level": gauge_reading(&gauge::BATTERY, c.battery_level()),
            "battery_color": battery_color(c.battery_level.as_ref()),
            "fuel_level": gauge_reading(&gauge::FUEL, c.fuel_level()),
            "temperature": gauge_reading(&gauge::TEMPERATURE, c.temperature()),
            "timestamp": format_timestamp(c.timestamp().as_deref()),
        }),
        Telemetry::Status(s) => json!({
            "engine_status": s.engine_status(),
            "status_code": s.status_code(),
            "status_color": status_color(s.status_code()),
            "timestamp": format_timestamp(s.timestamp().as_deref()),
        }),
        Telemetry::Alerts(a) => {
            let alerts: Vec<Value> = a
                .active_alerts()
                .iter()
                .map(|alert| {
                    json!({
                        "id": alert.id,
                        "message": alert.message,
                        "severity": alert.severity,
                        "color": alert.severity.color(),
                        "timestamp": alert.formatted_timestamp(),
                    })
                })
                .collect();
            json!({ "alerts": alerts })
        }
        Telemetry::EngineData(e) => json!({
            "line_voltages": gauge_triple(&gauge::LINE_VOLTAGE, e.line_voltages()),
            "phase_currents": gauge_triple(&gauge::PHASE_CURRENT, e.phase_currents()),
            "bus_voltages": gauge_triple(&gauge::BUS_VOLTAGE, e.bus_voltages()),
        }),
        Telemetry::Optimisation(o) => json!({
            "availability": format_percentage(o.availability.as_ref()),
            "availability_color": percentage_color(o.availability.as_ref()),
            "off_service": format_percentage(o.off_service.as_ref()),
            "off_vs_maintenance": format_percentage(o.off_vs_maintenance.as_ref()),
            "run_hours": o.run_hours(),
            "maintenance_hours": o.maintenance_hours(),
            "stop_time": o.stop_time(),
            "maintenance_percentage": o.maintenance_percentage(),
            "maintenance_color": o.maintenance_percentage().map(maintenance_color),
            "hours_remaining": o.hours_remaining(),
            "maintenance_due_soon": o.maintenance_due_soon(),
            "timestamp": format_timestamp(o.timestamp().as_deref()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, SourceError};
    use tempfile::TempDir;

    #[test]
    fn test_derive_controller() {
        let telemetry = Telemetry::decode(
            TelemetryPath::Controller,
            &json!({"RPM": "1500 rpm", "battery_level": "11.5V"}),
        )
        .unwrap();
        let derived = derive(&telemetry);
        assert_eq!(derived["rpm"]["value"], 1500.0);
        assert_eq!(derived["rpm"]["color"], "orange");
        assert_eq!(derived["battery_color"], "red");
        assert_eq!(derived["fuel_level"]["color"], "red");
        assert_eq!(derived["timestamp"], "N/A");
    }

    #[test]
    fn test_derive_optimisation() {
        let telemetry = Telemetry::decode(
            TelemetryPath::Optimisation,
            &json!({"availability": 92.5, "runHours": 850, "maintenanceHours": 1000}),
        )
        .unwrap();
        let derived = derive(&telemetry);
        assert_eq!(derived["availability"], "92.5%");
        assert_eq!(derived["availability_color"], "green");
        assert_eq!(derived["off_service"], "N/A");
        assert_eq!(derived["maintenance_percentage"], 85.0);
        assert_eq!(derived["maintenance_color"], "red");
        assert_eq!(derived["hours_remaining"], 150.0);
        assert_eq!(derived["maintenance_due_soon"], true);
    }

    #[test]
    fn test_panel_report_keeps_error_and_data() {
        let source = MemorySource::with_root(json!({"status": {"engine_status_code": 24}}));
        let mut live = LiveData::subscribe(Arc::new(source.clone()), "status");
        live.poll();
        source.fail("status", SourceError::Timeout);
        live.poll();

        let report = PanelReport::from_live(&live);
        assert_eq!(report.path, "status");
        assert_eq!(report.state, "error");
        assert!(report.error.is_some());
        assert_eq!(report.raw, Some(json!({"engine_status_code": 24})));
        assert_eq!(report.derived.unwrap()["status_color"], "green");
    }

    #[tokio::test]
    async fn test_collect_every_path() {
        let source = MemorySource::demo();
        let report = collect(Arc::new(source.clone()), Duration::from_secs(1)).await;

        assert_eq!(report.source, "memory: demo");
        assert_eq!(report.panels.len(), TelemetryPath::ALL.len());
        assert!(report.panels.iter().all(|p| p.state == "ready"));
        // Subscriptions are released once the report is built
        assert_eq!(source.active_registrations(), 0);
    }

    #[tokio::test]
    async fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let source = MemorySource::new();
        let report = collect(Arc::new(source), Duration::from_millis(100)).await;
        report.write(&path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["panels"][0]["path"], "controller");
        assert_eq!(written["panels"][0]["raw"], Value::Null);
    }
}
