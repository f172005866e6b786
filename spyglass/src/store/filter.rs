//! Event filter configuration
//!
//! Two independent dimensions, type and level. An empty set means "show
//! everything" for that dimension, so a fresh filter passes every event and
//! the overlay only ever narrows from there.

use crate::domain::{EventType, Level, TelemetryEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which events the store accepts. Checked once at ingest; events rejected
/// here are gone for good, they do not reappear when the filter widens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    types: HashSet<EventType>,
    #[serde(default)]
    levels: HashSet<Level>,
}

impl EventFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither dimension narrows anything.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.types.is_empty() && self.levels.is_empty()
    }

    /// Both dimensions must pass; an empty dimension always passes.
    #[must_use]
    pub fn allows(&self, event: &TelemetryEvent) -> bool {
        let type_ok = self.types.is_empty() || self.types.contains(&event.event_type);
        let level_ok = self.levels.is_empty() || self.levels.contains(&event.level);
        type_ok && level_ok
    }

    /// Flip one type in or out of the selection.
    pub fn toggle_type(&mut self, event_type: EventType) {
        if !self.types.remove(&event_type) {
            self.types.insert(event_type);
        }
    }

    /// Flip one level in or out of the selection.
    pub fn toggle_level(&mut self, level: Level) {
        if !self.levels.remove(&level) {
            self.levels.insert(level);
        }
    }

    #[must_use]
    pub fn has_type(&self, event_type: EventType) -> bool {
        self.types.contains(&event_type)
    }

    #[must_use]
    pub fn has_level(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// One-line description for the status bar.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_unfiltered() {
            return "all events".to_string();
        }
        let mut parts = Vec::new();
        if !self.types.is_empty() {
            parts.push(format!("{}/{} types", self.types.len(), EventType::ALL.len()));
        }
        if !self.levels.is_empty() {
            parts.push(format!("{}/{} levels", self.levels.len(), Level::ALL.len()));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventId;
    use chrono::Utc;
    use spyglass_common::Hook;

    fn sample(event_type: EventType, level: Level) -> TelemetryEvent {
        TelemetryEvent {
            id: EventId::generate(),
            timestamp: Utc::now(),
            source: Hook::BeforeEnvelope,
            event_type,
            level,
            message: "sample".to_string(),
            data: serde_json::Value::Null,
            raw_data: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = EventFilter::new();
        assert!(filter.is_unfiltered());
        for event_type in EventType::ALL {
            for level in Level::ALL {
                assert!(filter.allows(&sample(event_type, level)));
            }
        }
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let mut filter = EventFilter::new();
        filter.toggle_type(EventType::Network);
        filter.toggle_level(Level::Error);

        assert!(filter.allows(&sample(EventType::Network, Level::Error)));
        assert!(!filter.allows(&sample(EventType::Network, Level::Info)));
        assert!(!filter.allows(&sample(EventType::Console, Level::Error)));
    }

    #[test]
    fn test_empty_dimension_passes_while_other_narrows() {
        let mut filter = EventFilter::new();
        filter.toggle_level(Level::Warn);

        assert!(filter.allows(&sample(EventType::Touch, Level::Warn)));
        assert!(filter.allows(&sample(EventType::Replay, Level::Warn)));
        assert!(!filter.allows(&sample(EventType::Touch, Level::Debug)));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut filter = EventFilter::new();
        filter.toggle_type(EventType::State);
        assert!(filter.has_type(EventType::State));
        filter.toggle_type(EventType::State);
        assert!(!filter.has_type(EventType::State));
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_summary_reports_narrowed_dimensions() {
        let mut filter = EventFilter::new();
        assert_eq!(filter.summary(), "all events");

        filter.toggle_type(EventType::Error);
        filter.toggle_type(EventType::Network);
        filter.toggle_level(Level::Error);
        assert_eq!(filter.summary(), "2/13 types, 1/4 levels");
    }
}
