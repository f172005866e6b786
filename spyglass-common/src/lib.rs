//! # Shared Data Structures (SDK shim ↔ Console)
//!
//! Defines the contract between a host-side telemetry SDK shim and the
//! spyglass console. A shim adapts whatever monitoring SDK the host embeds
//! (error tracker, tracing client, session recorder) to the small surface the
//! console understands; the console never links against a concrete SDK.
//!
//! ## Key Types
//!
//! - [`TelemetryBus`] - The capability a shim must provide: hook registration
//! - [`Hook`] - The six interception points the console listens on
//! - [`SdkSignal`] - One captured occurrence, tagged with its hook payload
//! - [`RawEnvelope`] - The normalized wire record handed to the console
//!
//! Spans, transactions, and breadcrumbs each carry their own raw shape
//! ([`RawSpan`], [`RawTransaction`], [`RawBreadcrumb`]); the console's
//! ingestion bridge folds all of them into [`RawEnvelope`] before
//! classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Envelope Kind Tags
// ============================================================================

/// **Error reporting**: exception / message event envelope
///
/// Emitted by: `beforeEnvelope` for captured errors and messages
pub const KIND_EVENT: &str = "event";

/// **Tracing**: finished transaction envelope
///
/// Emitted by: `beforeEnvelope` or the transaction hooks
pub const KIND_TRANSACTION: &str = "transaction";

/// **Session health**: session start/update envelope
pub const KIND_SESSION: &str = "session";

/// **User feedback**: user-submitted report attached to an event
pub const KIND_USER_REPORT: &str = "user_report";

/// **Session replay**: replay segment metadata envelope
pub const KIND_REPLAY_EVENT: &str = "replay_event";

/// **SDK internals**: discarded-event statistics envelope
pub const KIND_CLIENT_REPORT: &str = "client_report";

/// **Tracing**: single span captured from the span hooks.
///
/// Not an SDK envelope kind; the bridge folds span signals into envelopes
/// under this tag so they flow through the same classification path.
pub const KIND_SPAN: &str = "span";

// ============================================================================
// Severity Tags
// ============================================================================

/// Severity strings as they appear on the wire, lowest to highest.
///
/// Unrecognized values are valid input; the console classifies them as
/// informational rather than rejecting the envelope.
pub const LEVELS: [&str; 5] = ["debug", "info", "warning", "error", "fatal"];

// ============================================================================
// Hooks
// ============================================================================

/// Interception points a [`TelemetryBus`] exposes.
///
/// Names mirror the host SDK's own hook vocabulary so a shim is a thin
/// passthrough. A bus only has to deliver the hooks it actually supports;
/// registering on an unsupported hook is a no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hook {
    /// An envelope is about to be sent to the backend.
    BeforeEnvelope,
    /// A tracing span started.
    SpanStart,
    /// A tracing span finished.
    SpanEnd,
    /// A transaction (root span) started.
    TransactionStart,
    /// A transaction finished and is ready to send.
    TransactionFinish,
    /// A breadcrumb is about to be recorded.
    BeforeAddBreadcrumb,
}

impl Hook {
    /// Every hook the console registers on, in registration order.
    pub const ALL: [Hook; 6] = [
        Hook::BeforeEnvelope,
        Hook::SpanStart,
        Hook::SpanEnd,
        Hook::TransactionStart,
        Hook::TransactionFinish,
        Hook::BeforeAddBreadcrumb,
    ];

    /// The hook's wire name as the host SDK spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Hook::BeforeEnvelope => "beforeEnvelope",
            Hook::SpanStart => "spanStart",
            Hook::SpanEnd => "spanEnd",
            Hook::TransactionStart => "transactionStart",
            Hook::TransactionFinish => "transactionFinish",
            Hook::BeforeAddBreadcrumb => "beforeAddBreadcrumb",
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Raw Payload Shapes
// ============================================================================

/// The normalized wire record the console ingests.
///
/// Everything the bridge captures ends up in this shape before
/// classification. Fields are optional because real envelopes are ragged:
/// a session envelope has no message, a breadcrumb has no id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnvelope {
    /// SDK-assigned event id, when the envelope carries one.
    ///
    /// The console generates an id for envelopes without one; duplicate ids
    /// across retries are deduplicated downstream (first occurrence wins).
    pub event_id: Option<String>,

    /// Coarse envelope kind tag (see the `KIND_*` constants).
    pub kind: Option<String>,

    /// Wire severity (see [`LEVELS`]).
    pub level: Option<String>,

    /// Human-readable summary, when the envelope carries one.
    pub message: Option<String>,

    /// Embedded category tag (`"touch"`, `"xhr"`, `"ui.click"`, ...).
    ///
    /// More specific than `kind`; the console's second classification stage
    /// keys off this field when present.
    pub category: Option<String>,

    /// Structured payload body, opaque to the bridge.
    pub payload: Value,

    /// Which hook captured this envelope.
    pub source: Hook,

    /// Wall-clock capture time at the shim.
    pub captured_at: DateTime<Utc>,
}

impl RawEnvelope {
    /// An empty envelope captured now from `source`.
    #[must_use]
    pub fn new(source: Hook) -> Self {
        Self {
            event_id: None,
            kind: None,
            level: None,
            message: None,
            category: None,
            payload: Value::Null,
            source,
            captured_at: Utc::now(),
        }
    }
}

/// A tracing span as the SDK hands it to the span hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpan {
    /// Span operation, e.g. `"http.client"`, `"db.query"`.
    pub op: Option<String>,
    /// Free-form description, e.g. the request URL.
    pub description: Option<String>,
    pub span_id: Option<String>,
    pub trace_id: Option<String>,
    /// Terminal status (`"ok"`, `"cancelled"`, ...); `None` while running.
    pub status: Option<String>,
    /// Span attributes, opaque.
    pub data: Value,
}

/// A transaction (root span) as the SDK hands it to the transaction hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction name, e.g. the route or screen.
    pub name: Option<String>,
    /// Root operation, e.g. `"navigation"`, `"pageload"`.
    pub op: Option<String>,
    pub trace_id: Option<String>,
    pub status: Option<String>,
    pub data: Value,
}

/// A breadcrumb about to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBreadcrumb {
    /// Breadcrumb category (`"console"`, `"xhr"`, `"ui.click"`, ...).
    pub category: Option<String>,
    pub level: Option<String>,
    pub message: Option<String>,
    pub data: Value,
}

// ============================================================================
// Signals and the Bus Capability
// ============================================================================

/// One captured occurrence, delivered to a registered handler.
///
/// The variant tells the bridge which hook fired; the payload is the raw
/// shape that hook carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SdkSignal {
    Envelope(RawEnvelope),
    SpanStart(RawSpan),
    SpanEnd(RawSpan),
    TransactionStart(RawTransaction),
    TransactionFinish(RawTransaction),
    Breadcrumb {
        crumb: RawBreadcrumb,
        /// Hook-supplied hint object, opaque (e.g. the originating DOM event).
        hint: Option<Value>,
    },
}

impl SdkSignal {
    /// The hook this signal was captured on.
    #[must_use]
    pub fn hook(&self) -> Hook {
        match self {
            SdkSignal::Envelope(_) => Hook::BeforeEnvelope,
            SdkSignal::SpanStart(_) => Hook::SpanStart,
            SdkSignal::SpanEnd(_) => Hook::SpanEnd,
            SdkSignal::TransactionStart(_) => Hook::TransactionStart,
            SdkSignal::TransactionFinish(_) => Hook::TransactionFinish,
            SdkSignal::Breadcrumb { .. } => Hook::BeforeAddBreadcrumb,
        }
    }
}

/// Handler registered on a bus hook.
///
/// `Send` because SDKs commonly fire hooks from worker threads; handlers
/// forward signals over a channel rather than touching console state.
pub type BusHandler = Box<dyn Fn(SdkSignal) + Send + 'static>;

/// The capability a host shim provides to the console.
///
/// This is the console's entire compile-time knowledge of the SDK: an object
/// that can register a callback on a named hook. Shims for different SDKs
/// implement this over whatever registration API the SDK exposes.
pub trait TelemetryBus {
    /// Register `handler` to run every time `hook` fires.
    ///
    /// A bus that does not support `hook` must accept the registration and
    /// simply never invoke the handler.
    fn on(&self, hook: Hook, handler: BusHandler);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names_match_sdk_vocabulary() {
        assert_eq!(Hook::BeforeEnvelope.as_str(), "beforeEnvelope");
        assert_eq!(Hook::BeforeAddBreadcrumb.as_str(), "beforeAddBreadcrumb");
        assert_eq!(Hook::ALL.len(), 6);
    }

    #[test]
    fn test_signal_reports_origin_hook() {
        let span = RawSpan {
            op: Some("http.client".to_string()),
            description: None,
            span_id: None,
            trace_id: None,
            status: None,
            data: Value::Null,
        };
        assert_eq!(SdkSignal::SpanStart(span.clone()).hook(), Hook::SpanStart);
        assert_eq!(SdkSignal::SpanEnd(span).hook(), Hook::SpanEnd);

        let env = RawEnvelope::new(Hook::BeforeEnvelope);
        assert_eq!(SdkSignal::Envelope(env).hook(), Hook::BeforeEnvelope);
    }
}
