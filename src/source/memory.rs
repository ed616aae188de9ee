//! In-process data source.
//!
//! Holds the whole store tree in memory and pushes changes to registered
//! subscriptions through unbounded channels. Used for the demo backend and as
//! the fake store in tests, where [`MemorySource::active_registrations`] shows
//! whether consumers released their subscriptions.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::snapshot::{self, Snapshot};
use super::{DataSource, SourceError, SourceEvent, Subscription};

/// A data source backed by an in-memory JSON tree.
///
/// Clones share the same tree and registrations.
///
/// # Example
///
/// ```
/// use genset_watch::{DataSource, MemorySource};
///
/// let source = MemorySource::new();
/// let subscription = source.subscribe("controller");
/// assert_eq!(source.active_registrations(), 1);
///
/// drop(subscription);
/// assert_eq!(source.active_registrations(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
    description: String,
}

#[derive(Debug, Default)]
struct Inner {
    root: Value,
    next_id: u64,
    registrations: BTreeMap<u64, Registration>,
}

#[derive(Debug)]
struct Registration {
    path: String,
    sender: mpsc::UnboundedSender<SourceEvent>,
    /// Last value delivered, so unrelated writes don't re-notify. `None` after
    /// an error, `Some(None)` when the node was absent.
    last: Option<Option<Value>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_root(Value::Null)
    }

    /// Create a store seeded with `root`.
    pub fn with_root(root: Value) -> Self {
        let mut tree = Value::Null;
        snapshot::set(&mut tree, "", root);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                root: tree,
                ..Inner::default()
            })),
            description: "memory".to_string(),
        }
    }

    /// Create a store seeded with plausible generator telemetry.
    pub fn demo() -> Self {
        let mut source = Self::with_root(demo_tree());
        source.description = "memory: demo".to_string();
        source
    }

    /// Replace the value at `path`. `null` removes the node.
    pub fn set(&self, path: &str, value: Value) {
        let mut inner = self.inner.lock();
        snapshot::set(&mut inner.root, path, value);
        inner.notify(path);
    }

    /// Merge `children` into the node at `path`.
    pub fn update(&self, path: &str, children: Map<String, Value>) {
        let mut inner = self.inner.lock();
        snapshot::merge(&mut inner.root, path, children);
        inner.notify(path);
    }

    /// Remove the node at `path`.
    pub fn remove(&self, path: &str) {
        self.set(path, Value::Null);
    }

    /// Deliver `error` to every subscription affected by `path`.
    ///
    /// The next write to those paths is delivered even if the value is unchanged.
    pub fn fail(&self, path: &str, error: SourceError) {
        let mut inner = self.inner.lock();
        for registration in inner.registrations.values_mut() {
            if snapshot::related(&registration.path, path) {
                registration.last = None;
                let _ = registration.sender.send(SourceEvent::Error(error.clone()));
            }
        }
    }

    /// Read the current value at `path` without subscribing.
    pub fn get(&self, path: &str) -> Option<Value> {
        snapshot::get(&self.inner.lock().root, path).cloned()
    }

    /// Number of subscriptions that have not been released.
    pub fn active_registrations(&self) -> usize {
        self.inner.lock().registrations.len()
    }

    /// Paths of all live subscriptions, in registration order.
    pub fn active_paths(&self) -> Vec<String> {
        self.inner.lock().registrations.values().map(|r| r.path.clone()).collect()
    }
}

impl Inner {
    fn notify(&mut self, changed: &str) {
        let root = &self.root;
        self.registrations.retain(|id, registration| {
            if !snapshot::related(&registration.path, changed) {
                return true;
            }
            let current = snapshot::get(root, &registration.path).cloned();
            if registration.last.as_ref() == Some(&current) {
                return true;
            }
            registration.last = Some(current.clone());
            let snapshot = match current {
                Some(value) => Snapshot::new(&registration.path, value),
                None => Snapshot::absent(&registration.path),
            };
            let delivered = registration.sender.send(SourceEvent::Value(snapshot)).is_ok();
            if !delivered {
                debug!(id, path = %registration.path, "dropping closed registration");
            }
            delivered
        });
    }
}

fn release(inner: Weak<Mutex<Inner>>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        if let Some(registration) = inner.lock().registrations.remove(&id) {
            debug!(id, path = %registration.path, "released subscription");
        }
    }
}

impl DataSource for MemorySource {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = snapshot::normalize_path(path);

        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;

            // Listeners receive the current value immediately
            let current = snapshot::get(&inner.root, &path).cloned();
            let initial = match &current {
                Some(value) => Snapshot::new(&path, value.clone()),
                None => Snapshot::absent(&path),
            };
            let _ = tx.send(SourceEvent::Value(initial));

            inner.registrations.insert(
                id,
                Registration {
                    path: path.clone(),
                    sender: tx,
                    last: Some(current),
                },
            );
            id
        };
        debug!(id, path = %path, "registered subscription");

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(&path, rx, move || release(weak, id))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn demo_tree() -> Value {
    json!({
        "controller": {
            "RPM": "1500 rpm",
            "oil_pressure": "6.8 bar",
            "battery_level": "12.6V",
            "fuel_level": "64%",
            "temperature": "78.5 °C",
            "timestamp": "17/05/2025, 00:02:38"
        },
        "status": {
            "engine_status": "Ready",
            "engine_status_code": 24,
            "timestamp": "2025-05-17T00:02:37.520Z"
        },
        "Alerts": {
            "battery_alert": "⚠️ ALERT: Battery voltage dropping (12.1V)",
            "timestamp": "2025-05-17T00:01:12.004Z"
        },
        "engineDATA": {
            "VoltageL1": 229.4,
            "VoltageL2": 231.0,
            "VoltageL3": 228.7,
            "CurrentL1": 31.2,
            "CurrentL2": 29.8,
            "CurrentL3": 30.5,
            "BusVoltage1": 230.1,
            "BusVoltage2": 229.6,
            "BusVoltage3": 230.4
        },
        "optimisation": {
            "availability": "92.5%",
            "off_service": "7.5%",
            "off_vs_maintenance": "35%",
            "runHours": 640,
            "maintenanceHours": 900,
            "stopTime": 52,
            "timestamp": "2025-05-17T00:00:00.000Z"
        }
    })
}

/// Drive the demo tree with slowly varying controller readings.
///
/// Must be called from within a tokio runtime context. The task only holds a
/// weak reference and ends once every other clone of `source` is dropped.
pub fn spawn_demo_feed(source: MemorySource) -> tokio::task::JoinHandle<()> {
    let weak = Arc::downgrade(&source.inner);
    drop(source);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        let mut tick: u64 = 0;
        loop {
            interval.tick().await;
            let Some(inner) = weak.upgrade() else {
                break;
            };
            tick += 1;

            // Deterministic wobble so sparklines have something to draw
            let phase = (tick % 12) as f64;
            let wobble = if phase < 6.0 { phase } else { 12.0 - phase };
            let readings = json!({
                "RPM": format!("{} rpm", 1450 + (wobble * 20.0) as u64),
                "temperature": format!("{:.1} °C", 76.0 + wobble * 0.8),
                "oil_pressure": format!("{:.1} bar", 6.5 + wobble * 0.1),
                "fuel_level": format!("{}%", 64_u64.saturating_sub(tick / 30)),
            });

            let mut guard = inner.lock();
            if let Value::Object(children) = readings {
                snapshot::merge(&mut guard.root, "controller", children);
            }
            guard.notify("controller");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_value(subscription: &mut Subscription) -> Snapshot {
        match subscription.try_next() {
            Some(SourceEvent::Value(snapshot)) => snapshot,
            other => panic!("expected value event, got {:?}", other),
        }
    }

    #[test]
    fn test_subscribe_emits_current_value() {
        let source = MemorySource::with_root(json!({"status": {"engine_status_code": 24}}));
        let mut subscription = source.subscribe("status");

        let snapshot = expect_value(&mut subscription);
        assert_eq!(snapshot.val(), Some(&json!({"engine_status_code": 24})));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_subscribe_absent_path() {
        let source = MemorySource::new();
        let mut subscription = source.subscribe("optimisation");

        let snapshot = expect_value(&mut subscription);
        assert!(!snapshot.exists());
    }

    #[test]
    fn test_descendant_write_notifies_ancestor() {
        let source = MemorySource::new();
        let mut subscription = source.subscribe("controller");
        let _ = expect_value(&mut subscription);

        source.set("controller/RPM", json!(950));
        let snapshot = expect_value(&mut subscription);
        assert_eq!(snapshot.val(), Some(&json!({"RPM": 950})));
    }

    #[test]
    fn test_unrelated_write_does_not_notify() {
        let source = MemorySource::new();
        let mut subscription = source.subscribe("controller");
        let _ = expect_value(&mut subscription);

        source.set("status/engine_status_code", json!(5));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_unchanged_value_does_not_notify() {
        let source = MemorySource::with_root(json!({"controller": {"RPM": 950}}));
        let mut subscription = source.subscribe("controller/RPM");
        let _ = expect_value(&mut subscription);

        source.set("controller/fuel_level", json!("40%"));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_remove_delivers_absent() {
        let source = MemorySource::with_root(json!({"Alerts": {"battery_alert": "low"}}));
        let mut subscription = source.subscribe("Alerts");
        let _ = expect_value(&mut subscription);

        source.remove("Alerts/battery_alert");
        let snapshot = expect_value(&mut subscription);
        assert!(!snapshot.exists());
    }

    #[test]
    fn test_update_merges_children() {
        let source = MemorySource::with_root(json!({"controller": {"RPM": 900, "fuel_level": "40%"}}));
        let mut subscription = source.subscribe("controller");
        let _ = expect_value(&mut subscription);

        let Value::Object(children) = json!({"RPM": 1200}) else {
            unreachable!()
        };
        source.update("controller", children);

        let snapshot = expect_value(&mut subscription);
        assert_eq!(snapshot.val(), Some(&json!({"RPM": 1200, "fuel_level": "40%"})));
    }

    #[test]
    fn test_fail_delivers_error() {
        let source = MemorySource::new();
        let mut subscription = source.subscribe("status");
        let _ = expect_value(&mut subscription);

        source.fail("status", SourceError::PermissionDenied("status".to_string()));
        assert_eq!(
            subscription.try_next(),
            Some(SourceEvent::Error(SourceError::PermissionDenied("status".to_string())))
        );
    }

    #[test]
    fn test_unchanged_write_after_error_is_delivered() {
        let source = MemorySource::with_root(json!({"status": {"engine_status_code": 24}}));
        let mut subscription = source.subscribe("status");
        let _ = expect_value(&mut subscription);

        source.fail("status", SourceError::Timeout);
        assert_eq!(subscription.try_next(), Some(SourceEvent::Error(SourceError::Timeout)));

        source.set("status/engine_status_code", json!(24));
        let snapshot = expect_value(&mut subscription);
        assert_eq!(snapshot.val(), Some(&json!({"engine_status_code": 24})));
    }

    #[test]
    fn test_absent_path_after_error_is_delivered() {
        let source = MemorySource::new();
        let mut subscription = source.subscribe("optimisation");
        let _ = expect_value(&mut subscription);

        source.fail("optimisation", SourceError::Closed);
        let _ = subscription.try_next();

        source.remove("optimisation");
        let snapshot = expect_value(&mut subscription);
        assert!(!snapshot.exists());
    }

    #[test]
    fn test_drop_releases_registration() {
        let source = MemorySource::new();
        let a = source.subscribe("controller");
        let b = source.subscribe("status");
        assert_eq!(source.active_paths(), vec!["controller".to_string(), "status".to_string()]);

        drop(a);
        assert_eq!(source.active_paths(), vec!["status".to_string()]);
        b.cancel();
        assert_eq!(source.active_registrations(), 0);
    }

    #[test]
    fn test_demo_tree_has_every_panel() {
        let source = MemorySource::demo();
        for path in ["controller", "status", "Alerts", "engineDATA", "optimisation"] {
            assert!(source.get(path).is_some(), "missing {}", path);
        }
        assert_eq!(source.description(), "memory: demo");
    }
}
