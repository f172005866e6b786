//! Host-side embedding walkthrough.
//!
//! The console never links against a concrete SDK; the host hands it a
//! provider for a [`TelemetryBus`]. This example plays the host: a toy SDK
//! with a hook registry, a `TelemetryBus` shim over that registry, and a
//! worker thread that captures "telemetry" while the console displays it.
//!
//! Run with: `cargo run --example embed`

use chrono::Utc;
use crossbeam_channel::bounded;
use serde_json::json;
use spyglass::ingest::{attach, BusProvider, SharedBus};
use spyglass::persist::open_state_store;
use spyglass::sched::{Scheduler, TaskQueue};
use spyglass::store::{EventStore, StoreConfig};
use spyglass::tui::ConsoleApp;
use spyglass_common::{BusHandler, Hook, RawBreadcrumb, RawEnvelope, SdkSignal, TelemetryBus};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// The part of a monitoring SDK a shim cares about: a hook registry and
/// capture entry points that fire the registered callbacks.
#[derive(Default)]
struct ToySdk {
    hooks: Mutex<HashMap<Hook, Vec<BusHandler>>>,
}

impl ToySdk {
    fn fire(&self, signal: SdkSignal) {
        if let Ok(hooks) = self.hooks.lock() {
            if let Some(handlers) = hooks.get(&signal.hook()) {
                for handler in handlers {
                    handler(signal.clone());
                }
            }
        }
    }

    fn capture_message(&self, level: &str, message: &str) {
        let mut envelope = RawEnvelope::new(Hook::BeforeEnvelope);
        envelope.kind = Some("event".to_string());
        envelope.level = Some(level.to_string());
        envelope.message = Some(message.to_string());
        envelope.payload = json!({ "logger": "toy-sdk", "captured": message });
        self.fire(SdkSignal::Envelope(envelope));
    }

    fn add_breadcrumb(&self, category: &str, message: &str) {
        self.fire(SdkSignal::Breadcrumb {
            crumb: RawBreadcrumb {
                category: Some(category.to_string()),
                level: None,
                message: Some(message.to_string()),
                data: json!({ "at": Utc::now().to_rfc3339() }),
            },
            hint: None,
        });
    }
}

// The shim: one trait impl over the SDK's own registry. A real host would
// adapt its SDK's `on(name, callback)` API here instead.
impl TelemetryBus for ToySdk {
    fn on(&self, hook: Hook, handler: BusHandler) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.entry(hook).or_default().push(handler);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let sdk = Arc::new(ToySdk::default());

    // Console plumbing: store, scheduler, state, envelope channel.
    let queue = Rc::new(TaskQueue::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&queue) as Rc<dyn Scheduler>;
    let store = Rc::new(EventStore::new(scheduler, StoreConfig::default()));
    let state = open_state_store(None);
    let (envelope_tx, envelope_rx) = bounded(1024);

    // The host hands the console a provider, not the bus itself; a host
    // whose SDK is not ready yet returns None and the console degrades
    // to an empty feed instead of failing.
    let shared: SharedBus = Arc::clone(&sdk) as SharedBus;
    let provider: BusProvider = Box::new(move || Some(Arc::clone(&shared)));
    let ingest_rx = attach(&provider, &envelope_tx).then_some(envelope_rx);

    // The host's own workload, firing hooks from a worker thread.
    let workload_sdk = Arc::clone(&sdk);
    thread::spawn(move || {
        let mut n = 0u32;
        loop {
            workload_sdk.add_breadcrumb("ui.click", "button#refresh");
            workload_sdk.capture_message("info", &format!("sync pass {n} finished"));
            if n % 4 == 3 {
                workload_sdk.capture_message("error", "sync pass lost connection");
            }
            n += 1;
            thread::sleep(Duration::from_millis(900));
        }
    });

    ConsoleApp::new(store, queue, state, ingest_rx, 6).run()
}
