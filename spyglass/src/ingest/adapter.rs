//! Envelope adaptation
//!
//! Turns [`RawEnvelope`]s into [`TelemetryEvent`]s through two classification
//! stages: the coarse envelope kind picks a baseline type, then an embedded
//! category tag, when present, overrides it with something more specific.
//! Classification is total; anything unrecognized lands on a safe default
//! instead of failing ingestion.

use crate::domain::{EventId, EventType, Level, TelemetryEvent};
use spyglass_common::{
    RawEnvelope, KIND_CLIENT_REPORT, KIND_EVENT, KIND_REPLAY_EVENT, KIND_SESSION,
    KIND_TRANSACTION, KIND_USER_REPORT,
};
use std::collections::HashSet;

/// Stage 1: coarse envelope kind to baseline type.
///
/// `event` envelopes are error reports in SDK vocabulary. Span envelopes
/// (and anything else unlisted) start as `Generic` and rely on stage 2.
fn classify_kind(kind: Option<&str>) -> EventType {
    match kind {
        Some(KIND_EVENT) => EventType::Error,
        Some(KIND_TRANSACTION) => EventType::Navigation,
        Some(KIND_SESSION | KIND_CLIENT_REPORT) => EventType::System,
        Some(KIND_USER_REPORT) => EventType::UserAction,
        Some(KIND_REPLAY_EVENT) => EventType::Replay,
        _ => EventType::Generic,
    }
}

/// Wire severity to display level. Total: unrecognized or missing
/// severities read as informational.
#[must_use]
pub fn classify_level(level: Option<&str>) -> Level {
    match level {
        Some("debug") => Level::Debug,
        Some("info") => Level::Info,
        Some("warning") => Level::Warn,
        // Fatal has no display level of its own.
        Some("error" | "fatal") => Level::Error,
        _ => Level::Info,
    }
}

/// Stage 2: category tag override. Checked in order; exact names first,
/// then the network substrings, then prefixes, then the loose substrings.
fn refine_category(category: &str, baseline: EventType) -> EventType {
    let lower = category.to_ascii_lowercase();
    match lower.as_str() {
        "touch" => EventType::Touch,
        "navigation" => EventType::Navigation,
        "console" => EventType::Console,
        "debug" => EventType::Debug,
        "auth" => EventType::Auth,
        _ => {
            if lower.contains("xhr") || lower.contains("fetch") || lower.contains("http") {
                EventType::Network
            } else if lower.starts_with("ui.") {
                EventType::UserAction
            } else if lower.starts_with("replay.") {
                EventType::Replay
            } else if lower.contains("redux") || lower.contains("state") {
                EventType::State
            } else if lower.contains("payment")
                || lower.contains("analytics")
                || lower.contains("webhook")
            {
                EventType::Business
            } else {
                baseline
            }
        }
    }
}

/// Adapt one envelope. Envelopes without an id get a fresh one; envelopes
/// without a message get a placeholder so list rows are never blank.
#[must_use]
pub fn adapt(raw: &RawEnvelope) -> TelemetryEvent {
    let baseline = classify_kind(raw.kind.as_deref());
    let event_type = match raw.category.as_deref() {
        Some(category) if !category.is_empty() => refine_category(category, baseline),
        _ => baseline,
    };

    TelemetryEvent {
        id: raw
            .event_id
            .clone()
            .map_or_else(EventId::generate, EventId::from),
        timestamp: raw.captured_at,
        source: raw.source,
        event_type,
        level: classify_level(raw.level.as_deref()),
        message: raw
            .message
            .clone()
            .unwrap_or_else(|| "(no message)".to_string()),
        data: raw.payload.clone(),
        raw_data: serde_json::to_value(raw).unwrap_or(serde_json::Value::Null),
    }
}

/// Adapt a batch: duplicate ids collapse to their first occurrence, and the
/// result is sorted newest-first. The sort is stable, so envelopes sharing a
/// timestamp keep their input order.
#[must_use]
pub fn adapt_many(raws: &[RawEnvelope]) -> Vec<TelemetryEvent> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(raws.len());
    let mut events: Vec<TelemetryEvent> = raws
        .iter()
        .filter(|raw| match raw.event_id.as_deref() {
            Some(id) => seen.insert(id),
            // Id-less envelopes cannot collide; each gets a generated id.
            None => true,
        })
        .map(adapt)
        .collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use spyglass_common::{Hook, KIND_SPAN};

    fn envelope(kind: &str) -> RawEnvelope {
        let mut raw = RawEnvelope::new(Hook::BeforeEnvelope);
        raw.kind = Some(kind.to_string());
        raw
    }

    #[test]
    fn test_kind_baselines() {
        assert_eq!(classify_kind(Some(KIND_EVENT)), EventType::Error);
        assert_eq!(classify_kind(Some(KIND_TRANSACTION)), EventType::Navigation);
        assert_eq!(classify_kind(Some(KIND_SESSION)), EventType::System);
        assert_eq!(classify_kind(Some(KIND_CLIENT_REPORT)), EventType::System);
        assert_eq!(classify_kind(Some(KIND_USER_REPORT)), EventType::UserAction);
        assert_eq!(classify_kind(Some(KIND_REPLAY_EVENT)), EventType::Replay);
        assert_eq!(classify_kind(Some(KIND_SPAN)), EventType::Generic);
        assert_eq!(classify_kind(Some("mystery")), EventType::Generic);
        assert_eq!(classify_kind(None), EventType::Generic);
    }

    #[test]
    fn test_severity_table_is_total() {
        assert_eq!(classify_level(Some("debug")), Level::Debug);
        assert_eq!(classify_level(Some("info")), Level::Info);
        assert_eq!(classify_level(Some("warning")), Level::Warn);
        assert_eq!(classify_level(Some("error")), Level::Error);
        assert_eq!(classify_level(Some("fatal")), Level::Error);
        assert_eq!(classify_level(Some("loud")), Level::Info);
        assert_eq!(classify_level(None), Level::Info);
    }

    #[test]
    fn test_category_overrides_baseline() {
        let cases = [
            ("ui.click", EventType::UserAction),
            ("touch", EventType::Touch),
            ("http.client", EventType::Network),
            ("xhr", EventType::Network),
            ("fetch", EventType::Network),
            ("navigation", EventType::Navigation),
            ("auth", EventType::Auth),
            ("console", EventType::Console),
            ("debug", EventType::Debug),
            ("replay.start", EventType::Replay),
            ("redux", EventType::State),
            ("state.update", EventType::State),
            ("payment.flow", EventType::Business),
            ("analytics", EventType::Business),
            ("webhook.delivery", EventType::Business),
        ];
        for (category, expected) in cases {
            let mut raw = envelope(KIND_EVENT);
            raw.category = Some(category.to_string());
            assert_eq!(adapt(&raw).event_type, expected, "category {category:?}");
        }
    }

    #[test]
    fn test_unknown_category_keeps_baseline() {
        let mut raw = envelope(KIND_TRANSACTION);
        raw.category = Some("bespoke.thing".to_string());
        assert_eq!(adapt(&raw).event_type, EventType::Navigation);

        let mut blank = envelope(KIND_TRANSACTION);
        blank.category = Some(String::new());
        assert_eq!(adapt(&blank).event_type, EventType::Navigation);
    }

    #[test]
    fn test_adapt_fills_gaps() {
        let raw = RawEnvelope::new(Hook::SpanEnd);
        let event = adapt(&raw);
        assert_eq!(event.event_type, EventType::Generic);
        assert_eq!(event.level, Level::Info);
        assert_eq!(event.message, "(no message)");
        assert_eq!(event.source, Hook::SpanEnd);
        assert!(!event.id.0.is_empty());
    }

    #[test]
    fn test_adapt_many_dedups_first_wins_and_sorts_newest_first() {
        let base = Utc::now();
        let mut oldest = envelope(KIND_EVENT);
        oldest.event_id = Some("dup".to_string());
        oldest.message = Some("first".to_string());
        oldest.captured_at = base;

        let mut newest = envelope(KIND_EVENT);
        newest.event_id = Some("other".to_string());
        newest.message = Some("second".to_string());
        newest.captured_at = base + Duration::seconds(5);

        let mut duplicate = envelope(KIND_EVENT);
        duplicate.event_id = Some("dup".to_string());
        duplicate.message = Some("retry".to_string());
        duplicate.captured_at = base + Duration::seconds(10);

        let events = adapt_many(&[oldest, newest, duplicate]);
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }
}
