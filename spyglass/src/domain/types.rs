//! Domain types for type safety and expressiveness
//!
//! Newtypes and enums shared by the store, the adapter, and the TUI.
//! Keeping ids and classification tags as real types (rather than bare
//! strings) makes signatures self-documenting and keeps the filter and
//! dedup logic honest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spyglass_common::Hook;
use std::fmt;

/// Unique identifier of an ingested telemetry event.
///
/// Taken from the envelope's SDK-assigned id when present, otherwise
/// generated at adaptation time. Hashable so duplicate detection is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// A fresh id for an envelope that carries none.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Normalized coarse classification of a telemetry event.
///
/// Stage 1 of the adapter maps envelope kind tags onto the first six
/// variants; stage 2 refines them from the embedded category tag
/// (`Network`, `Touch`, `Console`, `Debug`, `State`, `Auth`, `Business`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Captured error or message report.
    Error,
    /// Transaction / route change / page load.
    Navigation,
    /// Session health and SDK internals.
    System,
    /// User feedback or a UI interaction (`ui.*` categories).
    UserAction,
    /// Session-replay segment activity.
    Replay,
    /// Anything the tables do not recognize.
    Generic,
    /// Outgoing request (`xhr`/`fetch`/`http` categories).
    Network,
    /// Touch / gesture input.
    Touch,
    /// Console output breadcrumb.
    Console,
    /// SDK debug chatter.
    Debug,
    /// App state-management activity (`redux`/`state`).
    State,
    /// Authentication flow activity.
    Auth,
    /// Business instrumentation (`payment`/`analytics`/`webhook`).
    Business,
}

impl EventType {
    /// Every type, in the order the filter overlay lists them.
    pub const ALL: [EventType; 13] = [
        EventType::Error,
        EventType::Navigation,
        EventType::Network,
        EventType::UserAction,
        EventType::Touch,
        EventType::Console,
        EventType::State,
        EventType::Auth,
        EventType::Business,
        EventType::Replay,
        EventType::System,
        EventType::Debug,
        EventType::Generic,
    ];

    /// Stable snake_case tag, used in persisted filters and headless output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Error => "error",
            EventType::Navigation => "navigation",
            EventType::System => "system",
            EventType::UserAction => "user_action",
            EventType::Replay => "replay",
            EventType::Generic => "generic",
            EventType::Network => "network",
            EventType::Touch => "touch",
            EventType::Console => "console",
            EventType::Debug => "debug",
            EventType::State => "state",
            EventType::Auth => "auth",
            EventType::Business => "business",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized severity of a telemetry event, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Every level, lowest to highest.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized telemetry event as the store holds it.
///
/// `data` is the structured body the events panel summarizes; `raw_data`
/// is the complete original envelope, kept only so the inspector can open
/// it for deep inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub id: EventId,
    /// Capture time at the shim; arrival order is preserved by the store.
    pub timestamp: DateTime<Utc>,
    /// Which bus hook produced this event.
    pub source: Hook,
    pub event_type: EventType,
    pub level: Level,
    pub message: String,
    /// Normalized structured fields (always a JSON object).
    pub data: Value,
    /// Original envelope, opaque, for drill-down only.
    pub raw_data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_display() {
        let id = EventId::from("abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::UserAction.as_str(), "user_action");
        assert_eq!(EventType::Network.as_str(), "network");
        assert_eq!(EventType::ALL.len(), 13);
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::ALL.len(), 4);
    }
}
