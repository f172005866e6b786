//! Value inspection engine
//!
//! The pipeline that turns an arbitrary runtime value into the rows the
//! inspector view renders:
//! - Value model (shared, mutable, possibly cyclic graphs)
//! - Classification (kind, child count, display string)
//! - Expansion state (which node ids are open)
//! - Flattening (bounded pre-order walk, cooperative sessions)

pub mod classify;
pub mod expansion;
pub mod flatten;
pub mod value;

// Re-export the surface the TUI and tests use most.
pub use classify::{classify, child_count, format_value, safe_stringify, ValueKind};
pub use expansion::{ExpansionState, ROOT_ID};
pub use flatten::{
    flatten, flatten_with, CycleRule, FlatNode, FlattenHandle, FlattenOptions,
    FlattenSession, StepOutcome, ABSOLUTE_DEPTH_CEILING, CIRCULAR_DISPLAY,
    FLATTEN_BATCH_SIZE, MAX_ITEMS_PER_LEVEL,
};
pub use value::{identity, Value, ValueRef};
