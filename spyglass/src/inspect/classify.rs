//! Value classification for the tree view
//!
//! Maps any runtime value to one of a fixed set of semantic kinds, and
//! produces the child count and display string the tree view renders.
//! Classification is total and deterministic: the same value always lands
//! in the same kind, and no input can make it fail.
//!
//! Check ordering mirrors how a dynamic runtime has to probe values:
//! `null`/`undefined` first (they masquerade as other types), wrapper
//! shapes (`date`, `error`, `map`, `set`, `regexp`) before the generic
//! container fallbacks, and `array` before plain `object`. The match arms
//! below keep that order so the precedence stays readable.

use super::value::{format_number, Value};
use chrono::SecondsFormat;

/// Longest function source rendered inline before truncation.
const MAX_FUNCTION_SOURCE: usize = 50;

/// Semantic kind of a runtime value.
///
/// `Circular` is never produced by [`classify`]; the flattener assigns it
/// when it refuses to descend into an already-visited reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Undefined,
    Boolean,
    Number,
    BigInt,
    Str,
    Symbol,
    Function,
    Date,
    Error,
    Regexp,
    Array,
    Object,
    Map,
    Set,
    Circular,
}

impl ValueKind {
    /// Every kind, in legend order.
    pub const ALL: [ValueKind; 16] = [
        ValueKind::Str,
        ValueKind::Number,
        ValueKind::BigInt,
        ValueKind::Boolean,
        ValueKind::Null,
        ValueKind::Undefined,
        ValueKind::Function,
        ValueKind::Symbol,
        ValueKind::Date,
        ValueKind::Error,
        ValueKind::Regexp,
        ValueKind::Array,
        ValueKind::Object,
        ValueKind::Map,
        ValueKind::Set,
        ValueKind::Circular,
    ];

    /// True for kinds the tree view can descend into.
    #[must_use]
    pub fn is_expandable(self) -> bool {
        matches!(
            self,
            ValueKind::Array | ValueKind::Object | ValueKind::Map | ValueKind::Set
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Undefined => "undefined",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::BigInt => "bigint",
            ValueKind::Str => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::Function => "function",
            ValueKind::Date => "date",
            ValueKind::Error => "error",
            ValueKind::Regexp => "regexp",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Map => "map",
            ValueKind::Set => "set",
            ValueKind::Circular => "circular",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a runtime value. Total and deterministic.
#[must_use]
pub fn classify(value: &Value) -> ValueKind {
    match value {
        // Null-ish checks come first.
        Value::Null => ValueKind::Null,
        Value::Undefined => ValueKind::Undefined,
        // Wrapper shapes, before the generic container fallbacks.
        Value::Date(_) => ValueKind::Date,
        Value::Error { .. } => ValueKind::Error,
        Value::Map(_) => ValueKind::Map,
        Value::Set(_) => ValueKind::Set,
        Value::Regexp(_) => ValueKind::Regexp,
        // Array before plain object.
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
        // Native primitive tags.
        Value::Bool(_) => ValueKind::Boolean,
        Value::Number(_) => ValueKind::Number,
        Value::BigInt(_) => ValueKind::BigInt,
        Value::Str(_) => ValueKind::Str,
        Value::Symbol(_) => ValueKind::Symbol,
        Value::Function { .. } => ValueKind::Function,
    }
}

/// Child count for a value: element count for arrays and sets, key count
/// for objects, entry count for maps, 0 for everything else.
///
/// This is the true count; the flattener clamps it for display.
#[must_use]
pub fn child_count(value: &Value) -> usize {
    value.child_len()
}

/// Display string for a value.
///
/// Containers render as `Kind(count)`; the leaf kinds each have a
/// dedicated shape. Cannot fail: every kind has an arm, and the JSON
/// fallback used elsewhere goes through [`safe_stringify`].
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => format!("{n}n"),
        Value::Str(s) => format!("{s:?}"),
        Value::Symbol(desc) => format!("Symbol({desc})"),
        Value::Function { source, .. } => truncate_source(source),
        Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
        Value::Error { name, message } => format!("{name}: {message}"),
        Value::Regexp(pattern) => format!("/{pattern}/"),
        Value::Array(_) => format!("Array({})", value.child_len()),
        Value::Object(_) => format!("Object({})", value.child_len()),
        Value::Map(_) => format!("Map({})", value.child_len()),
        Value::Set(_) => format!("Set({})", value.child_len()),
    }
}

/// Stringify arbitrary JSON for one-line summaries.
///
/// Never fails: serialization errors collapse to a placeholder instead of
/// surfacing to the caller.
#[must_use]
pub fn safe_stringify(json: &serde_json::Value) -> String {
    serde_json::to_string(json).unwrap_or_else(|_| "<unprintable>".to_string())
}

/// Truncate function source to [`MAX_FUNCTION_SOURCE`] characters.
fn truncate_source(source: &str) -> String {
    let mut out: String = source.chars().take(MAX_FUNCTION_SOURCE).collect();
    if source.chars().count() > MAX_FUNCTION_SOURCE {
        out.push('…');
    }
    out
}
