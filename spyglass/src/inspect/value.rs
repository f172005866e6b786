//! In-memory model of an arbitrary runtime value
//!
//! A [`Value`] is what the host hands the console for browsing: API
//! payloads, event metadata, application state. Containers hold
//! reference-counted children behind `RefCell`, so one value can appear in
//! several places and graphs may contain cycles; the flattener is the part
//! that makes such graphs safe to walk.
//!
//! Everything here is single-threaded (`Rc`, not `Arc`); values live on
//! the console's control thread.

use chrono::{DateTime, Utc};
use std::cell::{BorrowError, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a value. Clones are aliases, not copies.
pub type ValueRef = Rc<Value>;

/// An arbitrary runtime value, as the classifier sees it.
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    Str(String),
    /// Symbol with its description string.
    Symbol(String),
    Function {
        name: String,
        /// Full source text; the formatter truncates for display.
        source: String,
    },
    Date(DateTime<Utc>),
    Error {
        name: String,
        message: String,
    },
    /// Regular expression source, without delimiters.
    Regexp(String),
    Array(RefCell<Vec<ValueRef>>),
    /// Key/value pairs in insertion order.
    Object(RefCell<Vec<(String, ValueRef)>>),
    /// Entries in insertion order; keys are themselves values.
    Map(RefCell<Vec<(ValueRef, ValueRef)>>),
    Set(RefCell<Vec<ValueRef>>),
}

/// Identity of a shared value, for the traversal-scoped seen set.
///
/// Two `ValueRef`s compare equal here iff they alias the same allocation.
#[must_use]
pub fn identity(value: &ValueRef) -> usize {
    Rc::as_ptr(value) as usize
}

// ============================================================================
// Constructors
// ============================================================================

impl Value {
    #[must_use]
    pub fn null() -> ValueRef {
        Rc::new(Value::Null)
    }

    #[must_use]
    pub fn undefined() -> ValueRef {
        Rc::new(Value::Undefined)
    }

    #[must_use]
    pub fn boolean(b: bool) -> ValueRef {
        Rc::new(Value::Bool(b))
    }

    #[must_use]
    pub fn number(n: f64) -> ValueRef {
        Rc::new(Value::Number(n))
    }

    #[must_use]
    pub fn bigint(n: i128) -> ValueRef {
        Rc::new(Value::BigInt(n))
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> ValueRef {
        Rc::new(Value::Str(s.into()))
    }

    #[must_use]
    pub fn symbol(description: impl Into<String>) -> ValueRef {
        Rc::new(Value::Symbol(description.into()))
    }

    #[must_use]
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> ValueRef {
        Rc::new(Value::Function { name: name.into(), source: source.into() })
    }

    #[must_use]
    pub fn date(when: DateTime<Utc>) -> ValueRef {
        Rc::new(Value::Date(when))
    }

    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> ValueRef {
        Rc::new(Value::Error { name: name.into(), message: message.into() })
    }

    #[must_use]
    pub fn regexp(pattern: impl Into<String>) -> ValueRef {
        Rc::new(Value::Regexp(pattern.into()))
    }

    #[must_use]
    pub fn array(items: impl IntoIterator<Item = ValueRef>) -> ValueRef {
        Rc::new(Value::Array(RefCell::new(items.into_iter().collect())))
    }

    #[must_use]
    pub fn object<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, ValueRef)>,
    ) -> ValueRef {
        Rc::new(Value::Object(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    #[must_use]
    pub fn map(entries: impl IntoIterator<Item = (ValueRef, ValueRef)>) -> ValueRef {
        Rc::new(Value::Map(RefCell::new(entries.into_iter().collect())))
    }

    #[must_use]
    pub fn set(items: impl IntoIterator<Item = ValueRef>) -> ValueRef {
        Rc::new(Value::Set(RefCell::new(items.into_iter().collect())))
    }
}

// ============================================================================
// Mutation (hosts keep editing graphs they have handed over)
// ============================================================================

impl Value {
    /// Append to an array or set. Returns false if `self` is neither.
    pub fn push(&self, item: ValueRef) -> bool {
        match self {
            Value::Array(items) | Value::Set(items) => {
                items.borrow_mut().push(item);
                true
            }
            _ => false,
        }
    }

    /// Insert into an object. An existing key is overwritten in place so
    /// keys stay unique and keep their original position.
    /// Returns false if `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: ValueRef) -> bool {
        match self {
            Value::Object(entries) => {
                let key = key.into();
                let mut entries = entries.borrow_mut();
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    entries.push((key, value));
                }
                true
            }
            _ => false,
        }
    }

    /// Insert an entry into a map. Returns false if `self` is not a map.
    pub fn insert_entry(&self, key: ValueRef, value: ValueRef) -> bool {
        match self {
            Value::Map(entries) => {
                entries.borrow_mut().push((key, value));
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Enumeration
// ============================================================================

impl Value {
    /// True for the four container shapes the tree view can descend into.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_)
        )
    }

    /// Number of children, or 0 for non-containers.
    ///
    /// Returns 0 when the container's cell is mutably borrowed by the host;
    /// callers treat that as "children unavailable", not as an error.
    #[must_use]
    pub fn child_len(&self) -> usize {
        match self {
            Value::Array(items) | Value::Set(items) => {
                items.try_borrow().map_or(0, |v| v.len())
            }
            Value::Object(entries) => entries.try_borrow().map_or(0, |v| v.len()),
            Value::Map(entries) => entries.try_borrow().map_or(0, |v| v.len()),
            _ => 0,
        }
    }

    /// Container entries as `(key, child)` pairs, in the order the tree
    /// view presents them: arrays and sets by index, objects by insertion
    /// order, maps by insertion order with keys coerced to strings.
    ///
    /// Non-containers yield an empty list. Fails only when the host holds a
    /// conflicting mutable borrow on the container's cell.
    pub fn child_entries(&self) -> Result<Vec<(String, ValueRef)>, BorrowError> {
        match self {
            Value::Array(items) | Value::Set(items) => Ok(items
                .try_borrow()?
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), Rc::clone(v)))
                .collect()),
            Value::Object(entries) => Ok(entries
                .try_borrow()?
                .iter()
                .map(|(k, v)| (k.clone(), Rc::clone(v)))
                .collect()),
            Value::Map(entries) => Ok(entries
                .try_borrow()?
                .iter()
                .map(|(k, v)| (k.key_string(), Rc::clone(v)))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// String coercion for map keys, mirroring how a dynamic runtime keys a
    /// map display: raw text for strings, literals for primitives, a
    /// bracketed kind tag for anything structural.
    #[must_use]
    pub fn key_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Date(d) => d.to_rfc3339(),
            Value::Symbol(desc) => format!("Symbol({desc})"),
            Value::Array(_) => "[array]".to_string(),
            Value::Object(_) => "[object]".to_string(),
            Value::Map(_) => "[map]".to_string(),
            Value::Set(_) => "[set]".to_string(),
            Value::Function { name, .. } => format!("[function {name}]"),
            Value::Error { name, .. } => format!("[{name}]"),
            Value::Regexp(pattern) => format!("/{pattern}/"),
        }
    }
}

/// Numeric display without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

// ============================================================================
// Conversion from JSON
// ============================================================================

impl Value {
    /// Build a value graph from a JSON document.
    ///
    /// Used for `--inspect` files and for opening an event's raw envelope
    /// in the inspector. JSON cannot express cycles, maps, or the exotic
    /// primitive kinds, so the result only uses the plain shapes.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> ValueRef {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::boolean(*b),
            serde_json::Value::Number(n) => {
                Value::number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => Value::string(s.clone()),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from_json))
            }
            serde_json::Value::Object(fields) => {
                Value::object(fields.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }
}

impl fmt::Debug for Value {
    /// Shallow: container children are elided so cyclic graphs can be
    /// printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::BigInt(n) => write!(f, "BigInt({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Symbol(desc) => write!(f, "Symbol({desc:?})"),
            Value::Function { name, .. } => write!(f, "Function({name:?})"),
            Value::Date(d) => write!(f, "Date({d})"),
            Value::Error { name, message } => write!(f, "Error({name}: {message})"),
            Value::Regexp(pattern) => write!(f, "Regexp(/{pattern}/)"),
            Value::Array(_) => write!(f, "Array(len={})", self.child_len()),
            Value::Object(_) => write!(f, "Object(len={})", self.child_len()),
            Value::Map(_) => write!(f, "Map(len={})", self.child_len()),
            Value::Set(_) => write!(f, "Set(len={})", self.child_len()),
        }
    }
}
