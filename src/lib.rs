//! # genset-watch
//!
//! A terminal dashboard and library for live generator telemetry.
//!
//! The controller, engine status, alerts, electrical readings and maintenance
//! figures of a generator are published to a path-addressable real-time
//! store. This crate subscribes to those paths, keeps the latest value of
//! each, derives display values from them (gauge colors, severity colors,
//! percentages, normalized timestamps) and renders them in an interactive
//! terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │   app   │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │(derived) │    │(render) │    │          │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │ LiveData (one per panel)                             │
//! │       ▼                                                      │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── StreamSource | FileSource | MemorySource     │
//! │  │ (input) │                                                 │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DataSource`] trait and its backends. A source hands
//!   out [`Subscription`]s that deliver [`SourceEvent`]s for one path and
//!   unregister when dropped.
//! - **[`live`]**: [`LiveData`], the latest value, loading flag and error of
//!   one subscribed path. Changing the path releases the old subscription
//!   before the new one is opened.
//! - **[`telemetry`]**: Typed schemas for each path. Every field is optional.
//! - **[`data`]**: Total functions from raw readings to display values.
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Views, input handling and rendering.
//! - **[`config`]**, **[`logging`]**, **[`export`]**: Layered settings,
//!   tracing setup and JSON reports.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Stream from a store
//! genset-watch --endpoint https://plant-7.example.com --credentials "$GENSET_SECRET"
//!
//! # Watch a JSON export on disk, or run against built-in demo data
//! genset-watch --endpoint db.json
//! genset-watch --endpoint memory:
//!
//! # Write every panel to a report and exit
//! genset-watch --endpoint memory: --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use genset_watch::{LiveData, MemorySource, StatusTelemetry};
//!
//! let source = MemorySource::demo();
//! let mut status = LiveData::subscribe(Arc::new(source), "status");
//! status.poll();
//!
//! let decoded: StatusTelemetry = status.decode().unwrap().unwrap();
//! assert_eq!(decoded.status_code(), Some(24.0));
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod live;
pub mod logging;
pub mod source;
pub mod telemetry;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Settings, StoreConfig};
pub use live::{LiveData, LiveState};
pub use source::{
    DataSource, FileSource, MemorySource, Snapshot, SourceError, SourceEvent, StreamSource,
    Subscription,
};
pub use telemetry::{
    AlertsTelemetry, ControllerTelemetry, EngineTelemetry, Field, OptimisationTelemetry,
    StatusTelemetry, Telemetry, TelemetryPath,
};
