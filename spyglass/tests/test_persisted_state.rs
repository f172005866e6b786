//! Persisted console state across restarts: the filter selection and the
//! pane split survive a reopen and shape the next session's store.

use spyglass::domain::{EventType, Level};
use spyglass::persist::{open_state_store, FileStore, StateStore, FILTER_KEY, SPLIT_KEY};
use spyglass::store::EventFilter;
use tempfile::TempDir;

#[test]
fn test_filter_selection_survives_restart() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("console.json");

    // First session narrows the filter and saves it.
    {
        let store = FileStore::open(&path).expect("open state");
        let mut filter = EventFilter::new();
        filter.toggle_type(EventType::Error);
        filter.toggle_type(EventType::Network);
        filter.toggle_level(Level::Error);
        let json = serde_json::to_string(&filter).expect("filter serializes");
        store.set(FILTER_KEY, &json);
    }

    // Second session loads the same selection.
    let store = FileStore::open(&path).expect("reopen state");
    let saved = store.get(FILTER_KEY).expect("filter present");
    let filter: EventFilter = serde_json::from_str(&saved).expect("filter deserializes");
    assert!(filter.has_type(EventType::Error));
    assert!(filter.has_type(EventType::Network));
    assert!(filter.has_level(Level::Error));
    assert!(!filter.has_type(EventType::Console));
}

#[test]
fn test_pane_split_survives_restart() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("console.json");

    {
        let store = FileStore::open(&path).expect("open state");
        store.set(SPLIT_KEY, "60");
    }

    let store = FileStore::open(&path).expect("reopen state");
    assert_eq!(store.get(SPLIT_KEY).as_deref(), Some("60"));
}

#[test]
fn test_keys_are_independent() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("console.json");

    let store = FileStore::open(&path).expect("open state");
    store.set(FILTER_KEY, "{}");
    store.set(SPLIT_KEY, "35");
    store.remove(FILTER_KEY);

    let reopened = FileStore::open(&path).expect("reopen state");
    assert_eq!(reopened.get(FILTER_KEY), None);
    assert_eq!(reopened.get(SPLIT_KEY).as_deref(), Some("35"));
}

#[test]
fn test_corrupt_state_file_degrades_to_memory() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("console.json");
    std::fs::write(&path, "}}not json{{").expect("write garbage");

    // The console still gets a working store; it just will not persist.
    let store = open_state_store(Some(&path));
    store.set(SPLIT_KEY, "70");
    assert_eq!(store.get(SPLIT_KEY).as_deref(), Some("70"));

    // The broken file was left alone rather than clobbered.
    let on_disk = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(on_disk, "}}not json{{");
}

#[test]
fn test_stale_filter_json_is_ignored_not_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("console.json");
    {
        let store = FileStore::open(&path).expect("open state");
        store.set(FILTER_KEY, "not a filter document");
    }

    // The load path the binary uses: parse failure falls back to default.
    let store = FileStore::open(&path).expect("reopen state");
    let filter = store
        .get(FILTER_KEY)
        .and_then(|json| serde_json::from_str::<EventFilter>(&json).ok())
        .unwrap_or_default();
    assert!(filter.is_unfiltered());
}
