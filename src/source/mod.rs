//! Data source abstraction for subscribing to store paths.
//!
//! A [`DataSource`] hands out [`Subscription`]s: cancellable streams of
//! [`SourceEvent`]s for one path of the remote tree. Dropping a subscription
//! unregisters it from the source.

mod error;
mod file;
mod memory;
mod snapshot;
mod sse;
mod stream;

pub use error::SourceError;
pub use file::FileSource;
pub use memory::{spawn_demo_feed, MemorySource};
pub use snapshot::{get, merge, normalize_path, related, segments, set, Snapshot};
pub use sse::{EventDecoder, Frame, StreamEvent};
pub use stream::StreamSource;

use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::StoreConfig;

/// A notification delivered on a subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// The value at the subscribed path changed (or was read for the first time).
    Value(Snapshot),
    /// The source failed to deliver the path.
    Error(SourceError),
}

/// Trait for path-addressable real-time stores.
///
/// Implementations register a listener for `path` and push events into the
/// returned [`Subscription`] in the order the store emits them.
///
/// # Example
///
/// ```
/// use genset_watch::{DataSource, MemorySource, SourceEvent};
///
/// let source = MemorySource::new();
/// source.set("status/engine_status_code", serde_json::json!(24));
///
/// let mut subscription = source.subscribe("status");
/// if let Some(SourceEvent::Value(snapshot)) = subscription.try_next() {
///     assert!(snapshot.exists());
/// }
/// ```
pub trait DataSource: Send + Sync + Debug {
    /// Open a subscription to `path`.
    ///
    /// Sources backed by background tasks spawn them on the current tokio
    /// runtime, so this must be called from within a runtime context.
    fn subscribe(&self, path: &str) -> Subscription;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// A live registration against one path of a [`DataSource`].
///
/// The registration is released when the subscription is dropped or
/// [`cancel`](Subscription::cancel)led, on every exit path.
pub struct Subscription {
    path: String,
    events: mpsc::UnboundedReceiver<SourceEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription from an event channel and a release hook.
    ///
    /// `release` runs exactly once, when the subscription is cancelled or dropped.
    pub fn new<F>(path: &str, events: mpsc::UnboundedReceiver<SourceEvent>, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            path: normalize_path(path),
            events,
            release: Some(Box::new(release)),
        }
    }

    /// The subscribed path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Take the next pending event without waiting.
    pub fn try_next(&mut self) -> Option<SourceEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the source has stopped delivering for this path.
    pub async fn next(&mut self) -> Option<SourceEvent> {
        self.events.recv().await
    }

    /// Release the registration now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("released", &self.release.is_none())
            .finish()
    }
}

/// Backend selected by a store endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// HTTP event stream rooted at the endpoint URL.
    Stream(String),
    /// JSON database export on disk.
    File(PathBuf),
    /// In-process demo tree.
    Memory,
}

impl Backend {
    /// Pick a backend from an endpoint string.
    ///
    /// `http(s)://` selects the event stream, `memory:` the demo tree, and
    /// `file://<path>` or a bare path the file source.
    pub fn from_endpoint(endpoint: &str) -> Self {
        let endpoint = endpoint.trim();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Backend::Stream(endpoint.to_string())
        } else if endpoint == "memory:" {
            Backend::Memory
        } else {
            let path = endpoint.strip_prefix("file://").unwrap_or(endpoint);
            Backend::File(PathBuf::from(path))
        }
    }
}

/// Open the data source described by the store configuration.
///
/// Must be called from within a tokio runtime context when the demo backend
/// is selected, since it starts the demo driver task.
pub fn open(config: &StoreConfig) -> anyhow::Result<Arc<dyn DataSource>> {
    let Some(endpoint) = config.endpoint.as_deref() else {
        anyhow::bail!("No store endpoint configured (set store.endpoint or pass --endpoint)");
    };

    let source: Arc<dyn DataSource> = match Backend::from_endpoint(endpoint) {
        Backend::Stream(url) => Arc::new(StreamSource::new(&url, config)?),
        Backend::File(path) => Arc::new(FileSource::new(path, config.poll_interval())),
        Backend::Memory => {
            let source = MemorySource::demo();
            spawn_demo_feed(source.clone());
            Arc::new(source)
        }
    };

    tracing::info!(source = source.description(), "opened data source");
    Ok(source)
}
