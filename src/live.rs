//! Live view of one store path.
//!
//! [`LiveData`] owns at most one [`Subscription`] and folds its events into the
//! `{data, loading, error}` triple the views render from.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::source::{DataSource, SourceError, SourceEvent, Subscription};

/// Coarse state of a [`LiveData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    /// No path requested.
    Idle,
    /// Subscribed, waiting for the first event.
    Subscribing,
    /// Holding a value (possibly absent) from the store.
    Ready,
    /// The last event was an error.
    Failed,
}

impl LiveState {
    pub fn label(&self) -> &'static str {
        match self {
            LiveState::Idle => "idle",
            LiveState::Subscribing => "loading",
            LiveState::Ready => "ready",
            LiveState::Failed => "error",
        }
    }
}

/// The latest data, loading flag and error for one path.
#[derive(Debug)]
pub struct LiveData {
    source: Arc<dyn DataSource>,
    subscription: Option<Subscription>,
    path: Option<String>,
    data: Option<Value>,
    loading: bool,
    error: Option<SourceError>,
}

impl LiveData {
    /// Create an idle view with no subscription.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            subscription: None,
            path: None,
            data: None,
            loading: false,
            error: None,
        }
    }

    /// Create a view subscribed to `path`.
    pub fn subscribe(source: Arc<dyn DataSource>, path: &str) -> Self {
        let mut live = Self::new(source);
        live.set_path(path);
        live
    }

    /// Point the view at `path`.
    ///
    /// The previous subscription is released before the new one is opened;
    /// requesting the current path again does nothing.
    pub fn set_path(&mut self, path: &str) {
        let path = crate::source::normalize_path(path);
        if self.path.as_deref() == Some(path.as_str()) {
            return;
        }

        if let Some(old) = self.subscription.take() {
            debug!(from = %old.path(), to = %path, "switching subscription");
            old.cancel();
        }
        self.data = None;
        self.error = None;
        self.loading = true;
        self.subscription = Some(self.source.subscribe(&path));
        self.path = Some(path);
    }

    /// Cancel the subscription and return to idle.
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.path = None;
        self.loading = false;
    }

    /// The subscribed path, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply every pending event without waiting. Returns true if any arrived.
    pub fn poll(&mut self) -> bool {
        let mut events = Vec::new();
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(event) = subscription.try_next() {
                events.push(event);
            }
        }
        let changed = !events.is_empty();
        for event in events {
            self.apply(event);
        }
        changed
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns false when idle or once the source stops delivering.
    pub async fn changed(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.next().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: SourceEvent) {
        self.loading = false;
        match event {
            SourceEvent::Value(snapshot) => {
                self.data = snapshot.into_value();
                self.error = None;
            }
            SourceEvent::Error(err) => {
                warn!(path = ?self.path, error = %err, "subscription error");
                self.error = Some(err);
            }
        }
    }

    /// The latest value; `None` when the node is absent or nothing arrived yet.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    pub fn state(&self) -> LiveState {
        if self.path.is_none() {
            LiveState::Idle
        } else if self.loading {
            LiveState::Subscribing
        } else if self.error.is_some() {
            LiveState::Failed
        } else {
            LiveState::Ready
        }
    }

    /// Deserialize the current value into a typed schema.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.data
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }
}
