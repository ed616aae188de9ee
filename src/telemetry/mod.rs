//! Typed views of the store paths the dashboard reads.
//!
//! The store itself is schemaless; these types give each path an explicit
//! shape with optional fields so the derived-value functions work on checked
//! inputs.

mod field;
mod schema;

pub use field::Field;
pub use schema::{
    AlertsTelemetry, ControllerTelemetry, EngineTelemetry, OptimisationTelemetry,
    StatusTelemetry,
};

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// The store paths published by the generator controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TelemetryPath {
    Controller,
    Status,
    Alerts,
    EngineData,
    Optimisation,
}

impl TelemetryPath {
    pub const ALL: [TelemetryPath; 5] = [
        TelemetryPath::Controller,
        TelemetryPath::Status,
        TelemetryPath::Alerts,
        TelemetryPath::EngineData,
        TelemetryPath::Optimisation,
    ];

    /// The key of this path in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryPath::Controller => "controller",
            TelemetryPath::Status => "status",
            TelemetryPath::Alerts => "Alerts",
            TelemetryPath::EngineData => "engineDATA",
            TelemetryPath::Optimisation => "optimisation",
        }
    }
}

impl fmt::Display for TelemetryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelemetryPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|path| path.as_str() == key)
            .ok_or_else(|| format!("unknown telemetry path: {}", s))
    }
}

/// A decoded payload, tagged by the path it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    Controller(ControllerTelemetry),
    Status(StatusTelemetry),
    Alerts(AlertsTelemetry),
    EngineData(EngineTelemetry),
    Optimisation(OptimisationTelemetry),
}

impl Telemetry {
    /// Decode the value published under `path`.
    pub fn decode(path: TelemetryPath, value: &Value) -> Result<Self, serde_json::Error> {
        let value = value.clone();
        Ok(match path {
            TelemetryPath::Controller => Telemetry::Controller(serde_json::from_value(value)?),
            TelemetryPath::Status => Telemetry::Status(serde_json::from_value(value)?),
            TelemetryPath::Alerts => Telemetry::Alerts(serde_json::from_value(value)?),
            TelemetryPath::EngineData => Telemetry::EngineData(serde_json::from_value(value)?),
            TelemetryPath::Optimisation => {
                Telemetry::Optimisation(serde_json::from_value(value)?)
            }
        })
    }

    pub fn path(&self) -> TelemetryPath {
        match self {
            Telemetry::Controller(_) => TelemetryPath::Controller,
            Telemetry::Status(_) => TelemetryPath::Status,
            Telemetry::Alerts(_) => TelemetryPath::Alerts,
            Telemetry::EngineData(_) => TelemetryPath::EngineData,
            Telemetry::Optimisation(_) => TelemetryPath::Optimisation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_round_trip_through_str() {
        for path in TelemetryPath::ALL {
            assert_eq!(path.as_str().parse::<TelemetryPath>(), Ok(path));
        }
        assert_eq!("/engineDATA/".parse::<TelemetryPath>(), Ok(TelemetryPath::EngineData));
        assert!("engine".parse::<TelemetryPath>().is_err());
    }

    #[test]
    fn test_decode_tags_variant() {
        let telemetry =
            Telemetry::decode(TelemetryPath::Status, &json!({"engine_status_code": 24})).unwrap();
        assert_eq!(telemetry.path(), TelemetryPath::Status);
        match telemetry {
            Telemetry::Status(status) => assert_eq!(status.status_code(), Some(24.0)),
            other => panic!("expected status, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_scalar_fails() {
        assert!(Telemetry::decode(TelemetryPath::Controller, &json!(42)).is_err());
    }
}
