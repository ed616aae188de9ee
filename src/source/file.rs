//! File-based data source.
//!
//! Polls a JSON export of the whole store tree and delivers the subscribed
//! subtree whenever it changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::snapshot::{self, Snapshot};
use super::{DataSource, SourceError, SourceEvent, Subscription};

/// A data source that reads the store tree from a JSON file.
///
/// Each subscription runs its own polling task on the current tokio runtime.
/// The task tracks the file's modification time and only re-reads it when the
/// file has been updated; the task is aborted when the subscription is released.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    interval: Duration,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P, interval: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            interval,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = FileWatcher::new(&self.path);
        let subscribed = snapshot::normalize_path(path);
        let interval = self.interval;

        let task_path = subscribed.clone();
        let handle = tokio::spawn(async move {
            watch_file(watcher, task_path, interval, tx).await;
        });

        debug!(file = %self.path.display(), path = %subscribed, "started file watch");
        Subscription::new(&subscribed, rx, move || handle.abort())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

async fn watch_file(
    mut watcher: FileWatcher,
    path: String,
    interval: Duration,
    tx: mpsc::UnboundedSender<SourceEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut tracker = SubtreeTracker::new(path);

    loop {
        ticker.tick().await;

        let Some(read) = watcher.poll() else {
            continue;
        };
        let Some(event) = tracker.observe(read) else {
            continue;
        };

        if tx.send(event).is_err() {
            // Receiver dropped
            break;
        }
    }
}

/// Turns successive reads of the whole tree into events for one subtree.
///
/// A value is emitted when the subtree changes, and again after any error so
/// the consumer sees the error cleared. Repeats of the same error are dropped.
#[derive(Debug)]
struct SubtreeTracker {
    path: String,
    // None until a read succeeds, or after an error
    last: Option<Option<Value>>,
    last_error: Option<SourceError>,
}

impl SubtreeTracker {
    fn new(path: String) -> Self {
        Self {
            path,
            last: None,
            last_error: None,
        }
    }

    fn observe(&mut self, read: Result<Value, SourceError>) -> Option<SourceEvent> {
        match read {
            Ok(root) => {
                self.last_error = None;
                let current = snapshot::get(&root, &self.path).cloned();
                if self.last.as_ref() == Some(&current) {
                    return None;
                }
                self.last = Some(current.clone());
                Some(SourceEvent::Value(match current {
                    Some(value) => Snapshot::new(&self.path, value),
                    None => Snapshot::absent(&self.path),
                }))
            }
            Err(err) => {
                self.last = None;
                if self.last_error.as_ref() == Some(&err) {
                    return None;
                }
                warn!(path = %self.path, error = %err, "file source error");
                self.last_error = Some(err.clone());
                Some(SourceEvent::Error(err))
            }
        }
    }
}

/// Tracks one file's modification time and re-reads it when it changes.
#[derive(Debug)]
struct FileWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    read_once: bool,
}

impl FileWatcher {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            last_modified: None,
            read_once: false,
        }
    }

    /// Get the file's modification time.
    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    fn read_file(&self) -> Result<Value, SourceError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| SourceError::Read(e.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Returns the parsed tree if the file changed since the last successful read.
    fn poll(&mut self) -> Option<Result<Value, SourceError>> {
        let current_modified = self.get_modified_time();

        // Check if file has been modified since last read
        let file_changed = match (&self.last_modified, &current_modified) {
            _ if !self.read_once => true, // Always read until one read succeeds
            (_, None) => true,            // File disappeared, report it
            (None, Some(_)) => true,
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        let result = self.read_file();
        if result.is_ok() {
            self.read_once = true;
            self.last_modified = current_modified;
        }
        Some(result)
    }
}
