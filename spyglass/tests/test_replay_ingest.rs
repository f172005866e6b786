//! End-to-end replay: a recorded envelope log through the same adapt and
//! store path live ingestion uses.

use spyglass::domain::{EventType, Level};
use spyglass::ingest::{adapt_many, load_envelopes};
use spyglass::sched::{Scheduler, TaskQueue};
use spyglass::store::{EventFilter, EventStore, StoreConfig};
use spyglass_common::{Hook, RawEnvelope};
use std::io::Write;
use std::rc::Rc;
use tempfile::NamedTempFile;

/// `offset_secs` spreads capture times out so newest-first ordering is
/// deterministic regardless of how fast the lines are written.
fn envelope_line(id: Option<&str>, kind: &str, level: &str, message: &str, offset_secs: i64) -> String {
    let mut raw = RawEnvelope::new(Hook::BeforeEnvelope);
    raw.event_id = id.map(str::to_string);
    raw.kind = Some(kind.to_string());
    raw.level = Some(level.to_string());
    raw.message = Some(message.to_string());
    raw.captured_at = raw.captured_at + chrono::Duration::seconds(offset_secs);
    serde_json::to_string(&raw).expect("envelope serializes")
}

fn store_with_filter(filter: EventFilter) -> (Rc<TaskQueue>, EventStore) {
    let queue = Rc::new(TaskQueue::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
    let store = EventStore::new(scheduler, StoreConfig { max_events: 100, filter });
    (queue, store)
}

#[test]
fn test_recording_replays_newest_first() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "# two captures, oldest first").expect("write");
    writeln!(file, "{}", envelope_line(Some("a"), "event", "error", "first", 0)).expect("write");
    writeln!(file, "{}", envelope_line(Some("b"), "event", "info", "second", 5)).expect("write");

    let envelopes = load_envelopes(file.path()).expect("recording loads");
    let (queue, store) = store_with_filter(EventFilter::new());
    store.add_batch(adapt_many(&envelopes));
    queue.drain();

    let events = store.get_events();
    let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["second", "first"]);
    assert_eq!(events[0].level, Level::Info);
    assert_eq!(events[1].event_type, EventType::Error);
}

#[test]
fn test_duplicate_ids_collapse_to_first_occurrence() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "{}", envelope_line(Some("retry-1"), "event", "error", "original", 0)).expect("write");
    writeln!(file, "{}", envelope_line(Some("retry-1"), "event", "error", "sdk retry", 1)).expect("write");
    writeln!(file, "{}", envelope_line(None, "event", "info", "no id", 2)).expect("write");
    writeln!(file, "{}", envelope_line(None, "event", "info", "no id", 3)).expect("write");

    let envelopes = load_envelopes(file.path()).expect("recording loads");
    let events = adapt_many(&envelopes);

    // One survivor for the retried id; id-less envelopes never deduplicate.
    let originals: Vec<_> = events.iter().filter(|e| e.id.0 == "retry-1").collect();
    assert_eq!(originals.len(), 1);
    assert_eq!(originals[0].message, "original");
    assert_eq!(events.len(), 3);
}

#[test]
fn test_filter_drops_are_permanent_across_widening() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "{}", envelope_line(Some("e1"), "event", "error", "kept", 0)).expect("write");
    writeln!(file, "{}", envelope_line(Some("s1"), "session", "info", "rejected", 1)).expect("write");

    let mut errors_only = EventFilter::new();
    errors_only.toggle_type(EventType::Error);
    let envelopes = load_envelopes(file.path()).expect("recording loads");
    let (queue, store) = store_with_filter(errors_only);
    store.add_batch(adapt_many(&envelopes));
    queue.drain();

    assert_eq!(store.get_events().len(), 1);
    assert_eq!(store.stats().dropped, 1);

    // Widening the filter afterwards does not resurrect the session event.
    store.set_filter(EventFilter::new());
    queue.drain();
    assert_eq!(store.get_events().len(), 1);
}

#[test]
fn test_truncated_recording_reports_line_number() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "{}", envelope_line(Some("ok"), "event", "info", "fine", 0)).expect("write");
    write!(file, "{{\"event_id\": \"cut off").expect("write");

    let err = load_envelopes(file.path()).expect_err("malformed line fails");
    assert!(err.to_string().contains("line 2"), "got: {err}");
}
