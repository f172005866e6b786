//! Reactive event store
//!
//! A bounded newest-first ring of ingested events plus a subscriber registry.
//! Mutation is synchronous; notification is deferred through the injected
//! [`Scheduler`] so listeners never observe the store mid-mutation. The store
//! lives on the control thread and is not `Send`; producers on other threads
//! hand envelopes over a channel and the control loop calls [`EventStore::add`].

pub mod filter;

pub use filter::EventFilter;

use crate::domain::TelemetryEvent;
use crate::sched::{Scheduler, Task};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// Default ring capacity, overridable per store.
pub const DEFAULT_MAX_EVENTS: usize = 200;

/// Zero-argument change callback. Listeners re-read the store when invoked.
pub type Listener = Box<dyn Fn() + 'static>;

// ============================================================================
// Subscriber registry
// ============================================================================

struct Subscribers {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Rc<Listener>)>>,
}

impl Subscribers {
    fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn insert(&self, listener: Listener) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    fn remove(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(entry, _)| *entry != id);
    }

    fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Invoke every listener registered at the start of the pass, each inside
    /// its own failure boundary. The snapshot keeps the pass stable even if a
    /// listener subscribes or unsubscribes while running.
    fn notify_all(&self) {
        let snapshot: Vec<(u64, Rc<Listener>)> = self.listeners.borrow().clone();
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                log::error!("event listener {id} panicked; continuing with the rest");
            }
        }
    }
}

/// Handle returned by [`EventStore::subscribe`]. Dropping it does not detach
/// the listener; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.remove(self.id);
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Counters surfaced in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Events currently held.
    pub stored: usize,
    /// Ring capacity.
    pub capacity: usize,
    /// Events rejected by the ingest filter, cumulative.
    pub dropped: u64,
    /// Events pushed off the tail by capacity, cumulative.
    pub evicted: u64,
}

pub struct StoreConfig {
    pub max_events: usize,
    pub filter: EventFilter,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            filter: EventFilter::new(),
        }
    }
}

pub struct EventStore {
    events: RefCell<VecDeque<Rc<TelemetryEvent>>>,
    filter: RefCell<EventFilter>,
    max_events: usize,
    scheduler: Rc<dyn Scheduler>,
    subscribers: Rc<Subscribers>,
    dropped: Cell<u64>,
    evicted: Cell<u64>,
}

impl EventStore {
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>, config: StoreConfig) -> Self {
        Self {
            events: RefCell::new(VecDeque::new()),
            filter: RefCell::new(config.filter),
            // A zero-capacity ring would silently discard everything.
            max_events: config.max_events.max(1),
            scheduler,
            subscribers: Rc::new(Subscribers::new()),
            dropped: Cell::new(0),
            evicted: Cell::new(0),
        }
    }

    /// Ingest one event: filter, prepend, trim the tail, then schedule one
    /// notification pass. Events the filter rejects are gone for good.
    pub fn add(&self, event: TelemetryEvent) {
        if !self.filter.borrow().allows(&event) {
            self.dropped.set(self.dropped.get() + 1);
            log::debug!(
                "filter dropped {} event '{}'",
                event.event_type.as_str(),
                event.message
            );
            return;
        }
        {
            let mut events = self.events.borrow_mut();
            events.push_front(Rc::new(event));
            while events.len() > self.max_events {
                events.pop_back();
                self.evicted.set(self.evicted.get() + 1);
            }
        }
        self.schedule_notify();
    }

    /// Ingest an already newest-first batch as one mutation with a single
    /// notification pass. Used by the replay loader.
    pub fn add_batch(&self, batch: Vec<TelemetryEvent>) {
        if batch.is_empty() {
            return;
        }
        let mut accepted_any = false;
        {
            let mut events = self.events.borrow_mut();
            let filter = self.filter.borrow();
            // Oldest first, so the head of the batch ends up at the front.
            for event in batch.into_iter().rev() {
                if !filter.allows(&event) {
                    self.dropped.set(self.dropped.get() + 1);
                    continue;
                }
                events.push_front(Rc::new(event));
                accepted_any = true;
                while events.len() > self.max_events {
                    events.pop_back();
                    self.evicted.set(self.evicted.get() + 1);
                }
            }
        }
        if accepted_any {
            self.schedule_notify();
        }
    }

    /// Snapshot of the ring, newest first. The vector is the caller's; later
    /// store mutation does not reach into it.
    #[must_use]
    pub fn get_events(&self) -> Vec<Rc<TelemetryEvent>> {
        self.events.borrow().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Empty the ring. Subscribers are notified even when it was already
    /// empty, so views can drop stale selections.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
        self.schedule_notify();
    }

    /// Replace the ingest filter. Applies to future `add` calls only: events
    /// already stored stay, events already dropped stay dropped.
    pub fn set_filter(&self, filter: EventFilter) {
        *self.filter.borrow_mut() = filter;
    }

    #[must_use]
    pub fn filter(&self) -> EventFilter {
        self.filter.borrow().clone()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.subscribers.insert(listener);
        Subscription {
            id,
            subscribers: Rc::downgrade(&self.subscribers),
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            stored: self.events.borrow().len(),
            capacity: self.max_events,
            dropped: self.dropped.get(),
            evicted: self.evicted.get(),
        }
    }

    /// Queue one notification pass. The task holds only the registry, so it
    /// stays valid however long the host takes to drain the queue.
    fn schedule_notify(&self) {
        let subscribers = Rc::clone(&self.subscribers);
        let task: Task = Box::new(move || subscribers.notify_all());
        self.scheduler.defer(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, EventType, Level};
    use crate::sched::TaskQueue;
    use chrono::Utc;
    use spyglass_common::Hook;

    fn event(message: &str, event_type: EventType, level: Level) -> TelemetryEvent {
        TelemetryEvent {
            id: EventId::generate(),
            timestamp: Utc::now(),
            source: Hook::BeforeEnvelope,
            event_type,
            level,
            message: message.to_string(),
            data: serde_json::Value::Null,
            raw_data: serde_json::Value::Null,
        }
    }

    fn store_with_queue(config: StoreConfig) -> (EventStore, Rc<TaskQueue>) {
        let queue = Rc::new(TaskQueue::new());
        let scheduler: Rc<dyn Scheduler> = Rc::<TaskQueue>::clone(&queue);
        (EventStore::new(scheduler, config), queue)
    }

    fn messages(store: &EventStore) -> Vec<String> {
        store
            .get_events()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_capacity_two_keeps_newest_two() {
        let (store, _queue) = store_with_queue(StoreConfig {
            max_events: 2,
            filter: EventFilter::new(),
        });
        store.add(event("E1", EventType::Generic, Level::Info));
        store.add(event("E2", EventType::Generic, Level::Info));
        store.add(event("E3", EventType::Generic, Level::Info));

        assert_eq!(messages(&store), vec!["E3", "E2"]);
        let stats = store.stats();
        assert_eq!(stats.stored, 2);
        assert_eq!(stats.evicted, 1);
    }

    #[test]
    fn test_events_come_back_newest_first() {
        let (store, _queue) = store_with_queue(StoreConfig::default());
        store.add(event("a", EventType::Generic, Level::Info));
        store.add(event("b", EventType::Generic, Level::Info));
        store.add(event("c", EventType::Generic, Level::Info));
        assert_eq!(messages(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_listener_notified_once_per_mutation_after_drain() {
        let (store, queue) = store_with_queue(StoreConfig::default());
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let _sub = store.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        store.add(event("a", EventType::Generic, Level::Info));
        assert_eq!(calls.get(), 0, "notification fires on a later turn");
        queue.drain();
        assert_eq!(calls.get(), 1);

        store.add(event("b", EventType::Generic, Level::Info));
        store.add(event("c", EventType::Generic, Level::Info));
        store.clear();
        queue.drain();
        assert_eq!(calls.get(), 4);
        assert!(store.is_empty());
    }

    #[test]
    fn test_filtered_events_never_resurface() {
        let mut filter = EventFilter::new();
        filter.toggle_level(Level::Error);
        let (store, _queue) = store_with_queue(StoreConfig {
            max_events: 10,
            filter,
        });

        store.add(event("quiet", EventType::Generic, Level::Info));
        assert!(store.is_empty());
        assert_eq!(store.stats().dropped, 1);

        // Widening the filter afterwards cannot bring the event back.
        store.set_filter(EventFilter::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_filter_leaves_stored_events_alone() {
        let (store, _queue) = store_with_queue(StoreConfig::default());
        store.add(event("kept", EventType::Console, Level::Info));

        let mut narrow = EventFilter::new();
        narrow.toggle_level(Level::Error);
        store.set_filter(narrow);

        assert_eq!(messages(&store), vec!["kept"]);
    }

    #[test]
    fn test_panicking_listener_does_not_block_others() {
        let (store, queue) = store_with_queue(StoreConfig::default());
        let _bad = store.subscribe(Box::new(|| panic!("listener blew up")));
        let survived = Rc::new(Cell::new(false));
        let flag = Rc::clone(&survived);
        let _good = store.subscribe(Box::new(move || flag.set(true)));

        store.add(event("a", EventType::Generic, Level::Info));
        queue.drain();
        assert!(survived.get());
    }

    #[test]
    fn test_unsubscribed_listener_stops_receiving() {
        let (store, queue) = store_with_queue(StoreConfig::default());
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let sub = store.subscribe(Box::new(move || counter.set(counter.get() + 1)));
        assert_eq!(store.listener_count(), 1);

        sub.unsubscribe();
        assert_eq!(store.listener_count(), 0);
        store.add(event("a", EventType::Generic, Level::Info));
        queue.drain();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_snapshot_is_a_defensive_copy() {
        let (store, _queue) = store_with_queue(StoreConfig::default());
        store.add(event("a", EventType::Generic, Level::Info));
        let snapshot = store.get_events();
        store.add(event("b", EventType::Generic, Level::Info));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let (store, _queue) = store_with_queue(StoreConfig {
            max_events: 0,
            filter: EventFilter::new(),
        });
        store.add(event("only", EventType::Generic, Level::Info));
        assert_eq!(messages(&store), vec!["only"]);
    }

    #[test]
    fn test_batch_preserves_order_and_notifies_once() {
        let (store, queue) = store_with_queue(StoreConfig::default());
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let _sub = store.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        store.add_batch(vec![
            event("newest", EventType::Generic, Level::Info),
            event("middle", EventType::Generic, Level::Info),
            event("oldest", EventType::Generic, Level::Info),
        ]);
        assert_eq!(messages(&store), vec!["newest", "middle", "oldest"]);

        queue.drain();
        assert_eq!(calls.get(), 1);
    }
}
