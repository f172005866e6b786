//! Bridge attachment against a host-side bus: registration, forwarding,
//! classification of the folded envelopes, and the no-bus degradation.

use spyglass::domain::{EventType, Level};
use spyglass::ingest::{adapt, attach, BusProvider, SharedBus};
use spyglass_common::{
    BusHandler, Hook, RawBreadcrumb, RawSpan, RawTransaction, SdkSignal, TelemetryBus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct HostBus {
    handlers: Mutex<HashMap<Hook, Vec<BusHandler>>>,
}

impl HostBus {
    fn emit(&self, signal: SdkSignal) {
        let handlers = self.handlers.lock().expect("bus lock");
        if let Some(registered) = handlers.get(&signal.hook()) {
            for handler in registered {
                handler(signal.clone());
            }
        }
    }
}

impl TelemetryBus for HostBus {
    fn on(&self, hook: Hook, handler: BusHandler) {
        self.handlers.lock().expect("bus lock").entry(hook).or_default().push(handler);
    }
}

fn attached_bus() -> (Arc<HostBus>, crossbeam_channel::Receiver<spyglass_common::RawEnvelope>) {
    let bus = Arc::new(HostBus::default());
    let shared: SharedBus = Arc::clone(&bus) as SharedBus;
    let provider: BusProvider = Box::new(move || Some(Arc::clone(&shared)));
    let (tx, rx) = crossbeam_channel::unbounded();
    assert!(attach(&provider, &tx));
    (bus, rx)
}

#[test]
fn test_missing_bus_is_a_supported_mode() {
    let provider: BusProvider = Box::new(|| None);
    let (tx, rx) = crossbeam_channel::unbounded();
    assert!(!attach(&provider, &tx));
    assert!(rx.is_empty());
}

#[test]
fn test_span_lifecycle_becomes_two_classified_events() {
    let (bus, rx) = attached_bus();
    let span = RawSpan {
        op: Some("http.client".to_string()),
        description: Some("GET /api/users".to_string()),
        span_id: Some("span-7".to_string()),
        trace_id: Some("trace-1".to_string()),
        status: None,
        data: serde_json::json!({}),
    };
    bus.emit(SdkSignal::SpanStart(span.clone()));
    let mut finished = span;
    finished.status = Some("ok".to_string());
    bus.emit(SdkSignal::SpanEnd(finished));

    let start = adapt(&rx.try_recv().expect("start forwarded"));
    let end = adapt(&rx.try_recv().expect("end forwarded"));

    // The http.client category refines both phases to Network, and the
    // phase suffix keeps their ids distinct for dedup.
    assert_eq!(start.event_type, EventType::Network);
    assert_eq!(end.event_type, EventType::Network);
    assert_eq!(start.id.0, "span-7:start");
    assert_eq!(end.id.0, "span-7:end");
    assert_eq!(start.source, Hook::SpanStart);
    assert_eq!(end.source, Hook::SpanEnd);
}

#[test]
fn test_navigation_transaction_and_touch_breadcrumb_classify() {
    let (bus, rx) = attached_bus();
    bus.emit(SdkSignal::TransactionFinish(RawTransaction {
        name: Some("/settings".to_string()),
        op: Some("navigation".to_string()),
        trace_id: Some("trace-2".to_string()),
        status: Some("ok".to_string()),
        data: serde_json::json!({}),
    }));
    bus.emit(SdkSignal::Breadcrumb {
        crumb: RawBreadcrumb {
            category: Some("touch".to_string()),
            level: None,
            message: Some("swipe left".to_string()),
            data: serde_json::json!({ "dx": -120 }),
        },
        hint: None,
    });

    let navigation = adapt(&rx.try_recv().expect("transaction forwarded"));
    assert_eq!(navigation.event_type, EventType::Navigation);
    assert_eq!(navigation.message, "/settings");

    let touch = adapt(&rx.try_recv().expect("breadcrumb forwarded"));
    assert_eq!(touch.event_type, EventType::Touch);
    assert_eq!(touch.level, Level::Info);
    assert_eq!(touch.source, Hook::BeforeAddBreadcrumb);
}

#[test]
fn test_handlers_fire_from_foreign_threads() {
    let (bus, rx) = attached_bus();
    let worker_bus = Arc::clone(&bus);
    let worker = std::thread::spawn(move || {
        for n in 0..5 {
            let mut raw = spyglass_common::RawEnvelope::new(Hook::BeforeEnvelope);
            raw.message = Some(format!("from worker {n}"));
            worker_bus.emit(SdkSignal::Envelope(raw));
        }
    });
    worker.join().expect("worker finishes");

    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received.len(), 5);
    assert_eq!(received[0].message.as_deref(), Some("from worker 0"));
}
