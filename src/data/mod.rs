//! Derived values computed from raw telemetry.
//!
//! Every function here is total: malformed or missing input falls back to
//! `0`, `"N/A"`, grey, or the raw text, and never fails.
//!
//! ## Submodules
//!
//! - [`numeric`]: Leading-number extraction from readings like `"12.5V"`
//! - [`color`]: Severity colors for status codes, battery and percentages
//! - [`timestamp`]: ISO and day-first timestamps normalized for display
//! - [`format`]: Percentage and reading display strings
//! - [`gauge`]: Gauge ranges and color bands
//! - [`alerts`]: Alert severity and filtering
//! - [`history`]: Recent readings for sparklines
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (raw JSON)
//!        │
//!        ▼
//! Telemetry::decode()  ──▶  ControllerTelemetry, StatusTelemetry, ...
//!        │
//!        ├──▶ extract_numeric_value() ──▶ Gauge::color()
//!        ├──▶ status_color(), battery_color(), percentage_color()
//!        ├──▶ format_timestamp(), format_percentage()
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod alerts;
pub mod color;
pub mod format;
pub mod gauge;
pub mod history;
pub mod numeric;
pub mod timestamp;

pub use alerts::{Alert, AlertFilter, AlertSeverity};
pub use color::{
    battery_color, maintenance_color, percentage_color, status_color, StatusColor,
    READY_STATUS_CODE,
};
pub use format::{format_hours, format_percentage, format_reading};
pub use gauge::Gauge;
pub use history::{History, Metric};
pub use numeric::{extract_numeric_str, extract_numeric_value, field_as_float, parse_leading_float};
pub use timestamp::{format_timestamp, format_timestamp_in, parse_timestamp};
