//! Telemetry bus bridge
//!
//! Registers the console on every hook of a host-provided [`TelemetryBus`]
//! and folds each signal into a [`RawEnvelope`] on a channel. Handlers run on
//! whatever thread the host SDK fires them from; the control loop owns the
//! receiving end. The bus is resolved through a provider closure so a host
//! whose SDK is absent or not yet initialized degrades to a console with no
//! live feed instead of an error.

use chrono::Utc;
use crossbeam_channel::Sender;
use serde_json::Value;
use spyglass_common::{
    Hook, RawEnvelope, RawSpan, RawTransaction, SdkSignal, TelemetryBus, KIND_SPAN,
    KIND_TRANSACTION,
};
use std::sync::Arc;

/// A bus shared with the host's SDK threads.
pub type SharedBus = Arc<dyn TelemetryBus + Send + Sync>;

/// Resolves the bus at attach time. Returning `None` means the host has no
/// SDK to observe right now.
pub type BusProvider = Box<dyn Fn() -> Option<SharedBus>>;

/// Register on all hooks, forwarding every signal to `sender`.
///
/// Returns whether a bus was available. `false` is a supported mode, not a
/// failure: the console still renders whatever it is fed by other paths.
pub fn attach(provider: &BusProvider, sender: &Sender<RawEnvelope>) -> bool {
    let Some(bus) = provider() else {
        log::warn!("telemetry bus unavailable; running without live ingestion");
        return false;
    };
    for hook in Hook::ALL {
        let forward = sender.clone();
        bus.on(
            hook,
            Box::new(move |signal| {
                // Receiver gone means the console shut down first.
                let _ = forward.send(envelope_from_signal(signal));
            }),
        );
    }
    log::info!("attached to telemetry bus on {} hooks", Hook::ALL.len());
    true
}

/// Fold a hook signal into the one wire shape classification understands.
#[must_use]
pub fn envelope_from_signal(signal: SdkSignal) -> RawEnvelope {
    let source = signal.hook();
    match signal {
        SdkSignal::Envelope(raw) => raw,
        SdkSignal::SpanStart(span) => span_envelope(&span, source, "start"),
        SdkSignal::SpanEnd(span) => span_envelope(&span, source, "end"),
        SdkSignal::TransactionStart(tx) => transaction_envelope(&tx, source, "start"),
        SdkSignal::TransactionFinish(tx) => transaction_envelope(&tx, source, "finish"),
        SdkSignal::Breadcrumb { crumb, hint } => RawEnvelope {
            event_id: None,
            kind: None,
            level: crumb.level.clone(),
            message: crumb.message.clone(),
            category: crumb.category.clone(),
            payload: serde_json::json!({ "data": crumb.data, "hint": hint }),
            source,
            captured_at: Utc::now(),
        },
    }
}

/// The `:start` / `:end` id suffix keeps the two signals of one span
/// distinct under id deduplication while still collapsing SDK retries.
fn span_envelope(span: &RawSpan, source: Hook, phase: &str) -> RawEnvelope {
    RawEnvelope {
        event_id: span.span_id.as_ref().map(|id| format!("{id}:{phase}")),
        kind: Some(KIND_SPAN.to_string()),
        level: None,
        message: span.description.clone().or_else(|| span.op.clone()),
        category: span.op.clone(),
        payload: serde_json::to_value(span).unwrap_or(Value::Null),
        source,
        captured_at: Utc::now(),
    }
}

fn transaction_envelope(tx: &RawTransaction, source: Hook, phase: &str) -> RawEnvelope {
    RawEnvelope {
        event_id: tx.trace_id.as_ref().map(|id| format!("{id}:{phase}")),
        kind: Some(KIND_TRANSACTION.to_string()),
        level: None,
        message: tx.name.clone().or_else(|| tx.op.clone()),
        category: tx.op.clone(),
        payload: serde_json::to_value(tx).unwrap_or(Value::Null),
        source,
        captured_at: Utc::now(),
    }
}
