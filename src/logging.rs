//! Structured logging initialization.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Append to a file; used while the dashboard owns the terminal.
    File(&'a Path),
    /// Standard error; used in export mode.
    Stderr,
    /// Drop everything.
    Discard,
}

impl<'a> LogTarget<'a> {
    /// Pick the target for the dashboard or for export mode.
    pub fn select(file: Option<&'a Path>, interactive: bool) -> Self {
        match (file, interactive) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Discard,
            (None, false) => LogTarget::Stderr,
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `default_filter` when set.
pub fn init(target: LogTarget<'_>, default_filter: &str) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?;
        }
        LogTarget::Stderr => {
            registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .try_init()?;
        }
        LogTarget::Discard => {
            registry
                .with(fmt::layer().with_writer(std::io::sink))
                .try_init()?;
        }
    }

    Ok(())
}
