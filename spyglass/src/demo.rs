//! Scripted demo feed
//!
//! A self-contained [`TelemetryBus`] plus a producer thread that emits a
//! representative mix of signals, so the console can be explored without
//! embedding it in a host application. Also provides the sample payload
//! the demo inspector opens on, including a cyclic corner so the
//! `[Circular]` terminal is visible.

use chrono::Utc;
use serde_json::json;
use spyglass_common::{
    BusHandler, Hook, RawBreadcrumb, RawEnvelope, RawSpan, RawTransaction, SdkSignal,
    TelemetryBus, KIND_EVENT, KIND_SESSION,
};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::inspect::{Value, ValueRef};

/// Pause between scripted signals; slow enough to watch arrive.
const SIGNAL_PACING: Duration = Duration::from_millis(700);

// ============================================================================
// Demo bus
// ============================================================================

/// In-process bus backing the demo feed.
///
/// Handlers run on whatever thread calls [`DemoBus::emit`]. The scripted
/// producer emits from its own thread, mirroring how real SDK hooks fire
/// off the console thread.
#[derive(Default)]
pub struct DemoBus {
    handlers: Mutex<HashMap<Hook, Vec<BusHandler>>>,
}

impl DemoBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `signal` to every handler registered on its hook.
    pub fn emit(&self, signal: SdkSignal) {
        if let Ok(handlers) = self.handlers.lock() {
            if let Some(list) = handlers.get(&signal.hook()) {
                for handler in list {
                    handler(signal.clone());
                }
            }
        }
    }
}

impl TelemetryBus for DemoBus {
    fn on(&self, hook: Hook, handler: BusHandler) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.entry(hook).or_default().push(handler);
        }
    }
}

// ============================================================================
// Scripted producer
// ============================================================================

/// Spawn the producer thread. It loops the script forever; the thread is
/// detached and dies with the process.
pub fn spawn_producer(bus: Arc<DemoBus>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut pass: u64 = 0;
        loop {
            for signal in script(pass) {
                bus.emit(signal);
                thread::sleep(SIGNAL_PACING);
            }
            pass += 1;
        }
    })
}

/// One pass of the scripted mix. Ids carry the pass number so retries are
/// distinguishable across passes.
fn script(pass: u64) -> Vec<SdkSignal> {
    let trace_id = format!("demo-trace-{pass}");
    vec![
        SdkSignal::TransactionStart(RawTransaction {
            name: Some("/checkout".to_string()),
            op: Some("navigation".to_string()),
            trace_id: Some(trace_id.clone()),
            status: None,
            data: json!({ "from": "/cart" }),
        }),
        SdkSignal::Breadcrumb {
            crumb: RawBreadcrumb {
                category: Some("ui.click".to_string()),
                level: None,
                message: Some("button#place-order".to_string()),
                data: json!({ "x": 412, "y": 233 }),
            },
            hint: Some(json!({ "target": "button#place-order" })),
        },
        SdkSignal::SpanStart(RawSpan {
            op: Some("http.client".to_string()),
            description: Some("POST /api/orders".to_string()),
            span_id: Some(format!("demo-span-{pass}")),
            trace_id: Some(trace_id.clone()),
            status: None,
            data: json!({ "method": "POST" }),
        }),
        SdkSignal::Breadcrumb {
            crumb: RawBreadcrumb {
                category: Some("console".to_string()),
                level: Some("warning".to_string()),
                message: Some("retrying order submit (attempt 2)".to_string()),
                data: json!({ "attempt": 2 }),
            },
            hint: None,
        },
        SdkSignal::SpanEnd(RawSpan {
            op: Some("http.client".to_string()),
            description: Some("POST /api/orders".to_string()),
            span_id: Some(format!("demo-span-{pass}")),
            trace_id: Some(trace_id.clone()),
            status: Some("internal_error".to_string()),
            data: json!({ "method": "POST", "status_code": 500 }),
        }),
        SdkSignal::Envelope(RawEnvelope {
            event_id: Some(format!("demo-err-{pass}")),
            kind: Some(KIND_EVENT.to_string()),
            level: Some("error".to_string()),
            message: Some("Unhandled rejection: order submit failed".to_string()),
            category: None,
            payload: json!({
                "exception": {
                    "type": "FetchError",
                    "value": "POST /api/orders returned 500",
                },
                "tags": { "flow": "checkout" },
            }),
            source: Hook::BeforeEnvelope,
            captured_at: Utc::now(),
        }),
        SdkSignal::TransactionFinish(RawTransaction {
            name: Some("/checkout".to_string()),
            op: Some("navigation".to_string()),
            trace_id: Some(trace_id),
            status: Some("internal_error".to_string()),
            data: json!({ "duration_ms": 2140 }),
        }),
        SdkSignal::Envelope(RawEnvelope {
            event_id: None,
            kind: Some(KIND_SESSION.to_string()),
            level: None,
            message: Some("session update".to_string()),
            category: None,
            payload: json!({ "status": "ok", "errors": 1 }),
            source: Hook::BeforeEnvelope,
            captured_at: Utc::now(),
        }),
    ]
}

// ============================================================================
// Sample payload
// ============================================================================

/// The nested document the demo inspector opens on.
///
/// The `view.window` entry points back at the root, so the tree shows a
/// `[Circular]` terminal two levels down.
#[must_use]
pub fn sample_payload() -> ValueRef {
    let root = Value::object([
        (
            "request",
            Value::object([
                ("method", Value::string("POST")),
                ("url", Value::string("https://shop.example/api/orders")),
                (
                    "headers",
                    Value::object([
                        ("content-type", Value::string("application/json")),
                        ("x-request-id", Value::string("f3b1c2")),
                    ]),
                ),
            ]),
        ),
        (
            "user",
            Value::object([
                ("id", Value::number(48221.0)),
                ("email", Value::string("jo@example.com")),
                ("premium", Value::boolean(true)),
            ]),
        ),
        (
            "tags",
            Value::array([
                Value::string("checkout"),
                Value::string("payment"),
                Value::string("retry"),
            ]),
        ),
        ("captured_at", Value::date(Utc::now())),
        ("last_error", Value::error("FetchError", "order submit failed")),
    ]);

    let view = Value::object([("name", Value::string("checkout"))]);
    view.insert("window", Rc::clone(&root));
    root.insert("view", view);
    root
}
