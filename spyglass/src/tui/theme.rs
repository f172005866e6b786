//! TUI color theme
//!
//! Dark-terminal scheme: green chrome, amber for caution states, per-kind
//! syntax colors in the value inspector.

use crate::domain::Level;
use crate::inspect::ValueKind;
use ratatui::style::Color;

pub const PRIMARY: Color = Color::Rgb(0, 220, 130);
pub const CRITICAL_RED: Color = Color::Rgb(255, 80, 80);
pub const CAUTION_AMBER: Color = Color::Rgb(255, 191, 0);
pub const INFO_DIM: Color = Color::Rgb(110, 150, 120);
pub const TEXT: Color = Color::Rgb(220, 220, 220);

/// Syntax color for a classified value, mirroring how web consoles tint
/// their object trees.
#[must_use]
pub fn kind_color(kind: ValueKind) -> Color {
    match kind {
        ValueKind::Str => Color::Rgb(120, 220, 120),
        ValueKind::Number | ValueKind::BigInt => Color::Rgb(100, 190, 255),
        ValueKind::Boolean | ValueKind::Symbol => Color::Rgb(210, 130, 255),
        ValueKind::Null | ValueKind::Undefined => Color::DarkGray,
        ValueKind::Function | ValueKind::Regexp => Color::Rgb(230, 200, 90),
        ValueKind::Date => Color::Rgb(90, 220, 220),
        ValueKind::Error => CRITICAL_RED,
        ValueKind::Circular => CAUTION_AMBER,
        ValueKind::Array | ValueKind::Object | ValueKind::Map | ValueKind::Set => TEXT,
    }
}

/// Short bracketed tag for the inspector's kind column.
#[must_use]
pub fn kind_badge(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Null => "null",
        ValueKind::Undefined => "und",
        ValueKind::Boolean => "bool",
        ValueKind::Number => "num",
        ValueKind::BigInt => "big",
        ValueKind::Str => "str",
        ValueKind::Symbol => "sym",
        ValueKind::Function => "fn",
        ValueKind::Date => "date",
        ValueKind::Error => "err",
        ValueKind::Regexp => "re",
        ValueKind::Array => "arr",
        ValueKind::Object => "obj",
        ValueKind::Map => "map",
        ValueKind::Set => "set",
        ValueKind::Circular => "circ",
    }
}

/// Severity color for an event level.
#[must_use]
#[allow(dead_code)] // Available for future use
pub fn level_color(level: Level) -> Color {
    match level {
        Level::Debug => Color::DarkGray,
        Level::Info => PRIMARY,
        Level::Warn => CAUTION_AMBER,
        Level::Error => CRITICAL_RED,
    }
}

/// Severity marker for event list rows.
/// Returns `(marker, color)` tuple for display
#[must_use]
pub fn level_marker(level: Level) -> (&'static str, Color) {
    match level {
        Level::Debug => ("[.]", Color::DarkGray),
        Level::Info => ("[-]", PRIMARY),
        Level::Warn => ("[!]", CAUTION_AMBER),
        Level::Error => ("[X]", CRITICAL_RED),
    }
}
