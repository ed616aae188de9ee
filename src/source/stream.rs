//! Stream-based data source.
//!
//! Subscribes to store paths over HTTP server-sent events
//! (`GET {endpoint}/{path}.json` with `Accept: text/event-stream`) and keeps a
//! local copy of each subscribed subtree up to date from `put`/`patch` events.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::snapshot::{self, Snapshot};
use super::sse::{EventDecoder, StreamEvent};
use super::{DataSource, SourceError, SourceEvent, Subscription};
use crate::config::StoreConfig;

/// A data source that streams store changes from an HTTP endpoint.
///
/// Each subscription spawns a background task on the current tokio runtime
/// which is aborted when the subscription is released. Failures are reported
/// once on the subscription and end the stream; reconnecting is left to the
/// caller.
#[derive(Debug, Clone)]
pub struct StreamSource {
    client: Client,
    endpoint: Url,
    credentials: Option<String>,
    timeout: Duration,
    description: String,
}

impl StreamSource {
    /// Create a source for the store rooted at `endpoint`.
    pub fn new(endpoint: &str, config: &StoreConfig) -> Result<Self, SourceError> {
        let timeout = config.timeout();
        let client = Client::builder().connect_timeout(timeout).build()?;
        let description = format!("stream: {}", endpoint.trim_end_matches('/'));
        let endpoint = Url::parse(endpoint)
            .map_err(|err| SourceError::Connection(format!("invalid endpoint: {}", err)))?;
        Ok(Self {
            client,
            description,
            endpoint,
            credentials: config.credentials.clone(),
            timeout,
        })
    }

    /// The URL streamed for `path`. The credential is sent as a percent-encoded
    /// `auth` query parameter.
    pub fn url_for(&self, path: &str) -> Url {
        let path = snapshot::normalize_path(path);
        let mut url = self.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}.json", base, path));
        if let Some(credentials) = &self.credentials {
            url.query_pairs_mut().append_pair("auth", credentials);
        }
        url
    }
}

impl DataSource for StreamSource {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = snapshot::normalize_path(path);

        let request = self.client.get(self.url_for(&path)).header(ACCEPT, "text/event-stream");
        let timeout = self.timeout;
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            let result = run_stream(request, &task_path, timeout, &tx).await;
            let err = match result {
                Ok(()) => SourceError::Closed,
                Err(err) => err,
            };
            warn!(path = %task_path, error = %err, "stream ended");
            let _ = tx.send(SourceEvent::Error(err));
        });

        Subscription::new(&path, rx, move || handle.abort())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Read the event stream until it ends, the store cancels it, or the receiver
/// goes away. Returns `Ok` only when the body ends normally.
async fn run_stream(
    request: reqwest::RequestBuilder,
    path: &str,
    timeout: Duration,
    tx: &mpsc::UnboundedSender<SourceEvent>,
) -> Result<(), SourceError> {
    let mut response = tokio::time::timeout(timeout, request.send())
        .await
        .map_err(|_| SourceError::Timeout)??;

    match response.status() {
        status if status.is_success() => {}
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(SourceError::PermissionDenied(path.to_string()));
        }
        status => return Err(SourceError::Http(format!("status {}", status))),
    }
    info!(path = %path, "stream connected");

    let mut decoder = EventDecoder::new();
    let mut tree = StreamTree::new(path);

    while let Some(chunk) = response.chunk().await? {
        for frame in decoder.feed(&chunk) {
            let event = match StreamEvent::from_frame(&frame) {
                Ok(event) => event,
                Err(err) => {
                    warn!(path = %path, error = %err, "malformed stream event");
                    if tx.send(SourceEvent::Error(err)).is_err() {
                        return Ok(());
                    }
                    continue;
                }
            };

            let outgoing = match tree.apply(event) {
                Ok(Some(snapshot)) => SourceEvent::Value(snapshot),
                Ok(None) => continue,
                Err(err) => return Err(err),
            };
            if tx.send(outgoing).is_err() {
                // Receiver dropped
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Local copy of one subscribed subtree.
#[derive(Debug)]
struct StreamTree {
    path: String,
    root: Value,
}

impl StreamTree {
    fn new(path: &str) -> Self {
        Self {
            path: snapshot::normalize_path(path),
            root: Value::Null,
        }
    }

    /// Apply an event. Returns the new snapshot when the data changed, or the
    /// error that ends the stream.
    fn apply(&mut self, event: StreamEvent) -> Result<Option<Snapshot>, SourceError> {
        match event {
            StreamEvent::Put { path, data } => snapshot::set(&mut self.root, &path, data),
            StreamEvent::Patch { path, data } => snapshot::merge(&mut self.root, &path, data),
            StreamEvent::KeepAlive => return Ok(None),
            StreamEvent::Cancel(reason) => {
                let reason = if reason.is_empty() || reason == "null" {
                    self.path.clone()
                } else {
                    reason
                };
                return Err(SourceError::PermissionDenied(reason));
            }
            StreamEvent::AuthRevoked => return Err(SourceError::AuthRevoked),
            StreamEvent::Unknown(name) => {
                debug!(event = %name, "ignoring stream event");
                return Ok(None);
            }
        }
        Ok(Some(Snapshot::new(&self.path, self.root.clone())))
    }
}
