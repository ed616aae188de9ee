//! Snapshots and the path-addressed JSON tree shared by all sources.
//!
//! The remote store is a single JSON tree addressed by `/`-separated paths.
//! A node that is `null` or an empty object does not exist.

use serde_json::{Map, Value};

/// One point-in-time value (or absence) read from a store path.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: String,
    value: Option<Value>,
}

impl Snapshot {
    /// Create a snapshot, treating `null` and empty objects as absent.
    pub fn new(path: &str, value: Value) -> Self {
        let value = normalize(value);
        Self {
            path: normalize_path(path),
            value: if value.is_null() { None } else { Some(value) },
        }
    }

    /// Create a snapshot for a node that does not exist.
    pub fn absent(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            value: None,
        }
    }

    /// The path this snapshot was read from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the node exists in the store.
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    /// The node's value, if it exists.
    pub fn val(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Consume the snapshot, returning the value.
    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}

/// Canonical form of a path: no leading, trailing or repeated slashes.
pub fn normalize_path(path: &str) -> String {
    segments(path).join("/")
}

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether a write at `a` can change the value observed at `b` (or vice versa).
///
/// True when one path is an ancestor of, or equal to, the other.
pub fn related(a: &str, b: &str) -> bool {
    let a = segments(a);
    let b = segments(b);
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Look up the node at `path`. Absent nodes return `None`.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |node, segment| node.get(segment))
        .filter(|v| !is_empty(v))
}

/// Replace the node at `path`. Writing `null` removes it and prunes empty parents.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let value = normalize(value);
    set_segments(root, &segments(path), value);
}

/// Merge `children` into the node at `path`, one child at a time.
pub fn merge(root: &mut Value, path: &str, children: Map<String, Value>) {
    let base = normalize_path(path);
    for (key, value) in children {
        let child = if base.is_empty() {
            key
        } else {
            format!("{}/{}", base, key)
        };
        set(root, &child, value);
    }
}

fn set_segments(node: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if value.is_null() {
        if let Value::Object(map) = node {
            if rest.is_empty() {
                map.remove(*head);
            } else if let Some(child) = map.get_mut(*head) {
                set_segments(child, rest, Value::Null);
                if is_empty(child) {
                    map.remove(*head);
                }
            }
            if map.is_empty() {
                *node = Value::Null;
            }
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.to_string()).or_insert(Value::Null);
        set_segments(child, rest, value);
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Strip `null` children and collapse empty objects to `null`.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_null_is_absent() {
        let snapshot = Snapshot::new("/controller/", Value::Null);
        assert!(!snapshot.exists());
        assert!(snapshot.val().is_none());
        assert_eq!(snapshot.path(), "controller");

        let empty = Snapshot::new("status", json!({}));
        assert!(!empty.exists());
    }

    #[test]
    fn test_snapshot_scalar_exists() {
        let snapshot = Snapshot::new("controller/RPM", json!("950"));
        assert!(snapshot.exists());
        assert_eq!(snapshot.val(), Some(&json!("950")));
    }

    #[test]
    fn test_related_paths() {
        assert!(related("controller", "controller/RPM"));
        assert!(related("controller/RPM", "controller"));
        assert!(related("", "status"));
        assert!(related("/status/", "status"));
        assert!(!related("controller", "status"));
        assert!(!related("controller/RPM", "controller/temperature"));
    }

    #[test]
    fn test_get_nested() {
        let root = json!({"controller": {"RPM": 950, "temperature": "78.5 °C"}});
        assert_eq!(get(&root, "controller/RPM"), Some(&json!(950)));
        assert_eq!(get(&root, ""), Some(&root));
        assert!(get(&root, "status").is_none());
        assert!(get(&root, "controller/RPM/deeper").is_none());
    }

    #[test]
    fn test_set_creates_intermediate_nodes() {
        let mut root = Value::Null;
        set(&mut root, "status/engine_status_code", json!(24));
        assert_eq!(root, json!({"status": {"engine_status_code": 24}}));
    }

    #[test]
    fn test_set_null_prunes_empty_parents() {
        let mut root = json!({"status": {"engine_status_code": 24}, "Alerts": {"battery_alert": "low"}});
        set(&mut root, "status/engine_status_code", Value::Null);
        assert_eq!(root, json!({"Alerts": {"battery_alert": "low"}}));

        set(&mut root, "Alerts", Value::Null);
        assert!(root.is_null());
    }

    #[test]
    fn test_set_root_replaces_tree() {
        let mut root = json!({"a": 1});
        set(&mut root, "/", json!({"b": {"c": null}, "d": 2}));
        assert_eq!(root, json!({"d": 2}));
    }

    #[test]
    fn test_merge_children() {
        let mut root = json!({"controller": {"RPM": 900, "fuel_level": "40%"}});
        let patch = json!({"RPM": 1200, "fuel_level": null, "temperature": 80});
        let Value::Object(children) = patch else {
            unreachable!()
        };
        merge(&mut root, "controller", children);
        assert_eq!(root, json!({"controller": {"RPM": 1200, "temperature": 80}}));
    }
}
