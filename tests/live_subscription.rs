//! Subscription lifecycle of `LiveData` against an in-memory store.

use std::sync::Arc;

use genset_watch::{LiveData, LiveState, MemorySource, SourceError};
use serde_json::json;

fn store() -> MemorySource {
    MemorySource::with_root(json!({
        "status": {"engine_status": "Ready", "engine_status_code": 24},
        "controller": {"RPM": "1500 rpm"}
    }))
}

#[test]
fn switching_paths_keeps_one_registration() {
    let source = store();
    let mut live = LiveData::subscribe(Arc::new(source.clone()), "status");
    assert!(live.poll());
    assert_eq!(live.state(), LiveState::Ready);

    live.set_path("controller");
    assert_eq!(source.active_registrations(), 1);
    assert_eq!(source.active_paths(), vec!["controller".to_string()]);
    assert_eq!(live.state(), LiveState::Subscribing);
    assert!(live.data().is_none());

    assert!(live.poll());
    assert_eq!(live.data(), Some(&json!({"RPM": "1500 rpm"})));

    // The old path no longer reaches this view
    source.set("status/engine_status_code", json!(5));
    assert!(!live.poll());

    source.set("controller/RPM", json!("1480 rpm"));
    assert!(live.poll());
    assert_eq!(live.data().unwrap()["RPM"], "1480 rpm");

    drop(live);
    assert_eq!(source.active_registrations(), 0);
}

#[test]
fn same_path_does_not_resubscribe() {
    let source = store();
    let mut live = LiveData::subscribe(Arc::new(source.clone()), "/status/");
    live.poll();

    live.set_path("status");
    assert_eq!(source.active_registrations(), 1);
    assert_eq!(live.state(), LiveState::Ready);
    assert!(!live.poll());
}

#[test]
fn consumers_hold_independent_registrations() {
    let source = store();
    let shared: Arc<MemorySource> = Arc::new(source.clone());
    let mut first = LiveData::subscribe(shared.clone(), "status");
    let mut second = LiveData::subscribe(shared, "status");
    assert_eq!(source.active_registrations(), 2);

    first.poll();
    second.poll();
    first.release();
    assert_eq!(source.active_registrations(), 1);
    assert_eq!(first.state(), LiveState::Idle);

    source.set("status/engine_status", json!("Running"));
    assert!(second.poll());
    assert_eq!(second.data().unwrap()["engine_status"], "Running");
}

#[test]
fn errors_keep_the_last_value_until_the_next_one() {
    let source = store();
    let mut live = LiveData::subscribe(Arc::new(source.clone()), "status");
    live.poll();

    source.fail("status", SourceError::Timeout);
    live.poll();
    assert_eq!(live.state(), LiveState::Failed);
    assert!(live.data().is_some());

    source.set("status/engine_status", json!("Running"));
    live.poll();
    assert_eq!(live.state(), LiveState::Ready);
    assert!(live.error().is_none());
}

#[test]
fn missing_path_is_ready_without_data() {
    let source = store();
    let mut live = LiveData::subscribe(Arc::new(source), "optimisation");
    assert!(live.poll());
    assert_eq!(live.state(), LiveState::Ready);
    assert!(live.data().is_none());
}

#[test]
fn unchanged_value_after_error_clears_it() {
    let source = store();
    let mut live = LiveData::subscribe(Arc::new(source.clone()), "status");
    live.poll();

    source.fail("status", SourceError::Timeout);
    live.poll();
    assert_eq!(live.state(), LiveState::Failed);

    // Republishing the same reading recovers the view
    source.set("status/engine_status_code", json!(24));
    assert!(live.poll());
    assert_eq!(live.state(), LiveState::Ready);
    assert!(live.error().is_none());
}
