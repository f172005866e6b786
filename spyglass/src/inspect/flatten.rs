//! Tree flattening: value graph → bounded, ordered node list
//!
//! Turns an arbitrary, possibly cyclic value graph into the flat pre-order
//! sequence the tree view renders. The walk honors the expansion state, a
//! depth bound, and a per-container width bound, and is cycle-safe via a
//! traversal-scoped identity set.
//!
//! The walker is a resumable [`FlattenSession`] holding an explicit frame
//! stack. One-shot [`flatten`] drives a session to completion inline; the
//! cooperative path runs the same session in budgeted steps across
//! scheduler turns and converges to the identical node list, with every
//! bounded entry guaranteed to be processed eventually. A session can be
//! cancelled through its [`FlattenHandle`] when a newer pass supersedes it.

use super::classify::{self, ValueKind};
use super::expansion::{ExpansionState, ROOT_ID};
use super::value::{identity, ValueRef};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

/// Maximum children enumerated per container. Wider containers render
/// their first `MAX_ITEMS_PER_LEVEL` entries; `child_count` is clamped to
/// match so the view never promises rows it will not produce.
pub const MAX_ITEMS_PER_LEVEL: usize = 100;

/// Depth ceiling applied regardless of the requested max depth.
/// The root sits at depth 0.
pub const ABSOLUTE_DEPTH_CEILING: usize = 10;

/// Nodes emitted per cooperative batch before yielding to the scheduler.
pub const FLATTEN_BATCH_SIZE: usize = 64;

/// Display string of a terminal circular placeholder.
pub const CIRCULAR_DISPLAY: &str = "[Circular]";

/// One renderable unit of a flattened value.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    /// Dot-joined path from the root, e.g. `root.items.2.name`.
    /// Unique within one flattening pass.
    pub id: String,
    /// Local key or index string.
    pub key: String,
    pub kind: ValueKind,
    /// 0 for the root; never exceeds the effective depth bound.
    pub depth: usize,
    pub expandable: bool,
    pub expanded: bool,
    /// True child count clamped to [`MAX_ITEMS_PER_LEVEL`]; always 0 for
    /// `circular` nodes.
    pub child_count: usize,
    /// Back-reference for lookups; not ownership.
    pub parent_id: Option<String>,
    /// Preformatted display string.
    pub display: String,
}

/// How the seen set treats a reference met a second time in one pass.
///
/// Both rules terminate on any input graph; they differ on non-cyclic
/// shared references (the same child reachable through two branches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleRule {
    /// Every revisit is terminal: aliased branches render as `circular`
    /// just like true back-edges. Keeps output bounded on diamond-heavy
    /// graphs.
    #[default]
    AnyRevisit,
    /// Only revisits on the current ancestor chain are terminal; aliased
    /// siblings render in full.
    AncestorOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions {
    /// Requested depth bound; the effective bound is
    /// `min(max_depth, ABSOLUTE_DEPTH_CEILING)`.
    pub max_depth: usize,
    pub cycle_rule: CycleRule,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self { max_depth: ABSOLUTE_DEPTH_CEILING, cycle_rule: CycleRule::default() }
    }
}

impl FlattenOptions {
    #[must_use]
    pub fn with_depth(max_depth: usize) -> Self {
        Self { max_depth, ..Self::default() }
    }
}

/// Outcome of one budgeted [`FlattenSession::run_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Work remains; run another step on a later turn.
    Pending,
    /// The node list is final.
    Complete,
    /// The session was cancelled; its output is abandoned.
    Cancelled,
}

/// Cancellation flag for an in-flight session.
///
/// Cloned out of the session before it is handed to the scheduler, so the
/// owner of the viewport can abandon a pass that a newer toggle has
/// superseded.
#[derive(Clone)]
pub struct FlattenHandle {
    cancelled: Rc<Cell<bool>>,
}

impl FlattenHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// A frame of the explicit walk stack: one container mid-enumeration.
struct Frame {
    /// Children still to visit, already truncated to the width bound.
    entries: Vec<(String, ValueRef)>,
    next: usize,
    /// Id of the container node; children derive their ids from it.
    parent_id: String,
    child_depth: usize,
    /// Container identity, dropped from the seen set on pop under
    /// [`CycleRule::AncestorOnly`].
    identity: usize,
}

/// A resumable flattening pass.
///
/// Takes a snapshot of the expansion state at construction; toggles made
/// while a session is in flight belong to the next pass, not this one.
pub struct FlattenSession {
    // Configuration
    opts: FlattenOptions,
    expansion: ExpansionState,
    depth_bound: usize,

    // Work queue
    root: Option<ValueRef>,
    stack: Vec<Frame>,

    // Pass-scoped state
    seen: HashSet<usize>,
    nodes: Vec<FlatNode>,
    cancelled: Rc<Cell<bool>>,
    complete: bool,
}

impl FlattenSession {
    #[must_use]
    pub fn new(root: &ValueRef, expansion: &ExpansionState, opts: FlattenOptions) -> Self {
        Self {
            opts,
            expansion: expansion.clone(),
            depth_bound: opts.max_depth.min(ABSOLUTE_DEPTH_CEILING),
            root: Some(Rc::clone(root)),
            stack: Vec::new(),
            seen: HashSet::new(),
            nodes: Vec::new(),
            cancelled: Rc::new(Cell::new(false)),
            complete: false,
        }
    }

    /// Handle for abandoning this session from outside.
    #[must_use]
    pub fn handle(&self) -> FlattenHandle {
        FlattenHandle { cancelled: Rc::clone(&self.cancelled) }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Nodes emitted so far; final once [`Self::is_complete`] holds.
    #[must_use]
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<FlatNode> {
        self.nodes
    }

    /// Emit up to `budget` nodes, then yield.
    pub fn run_step(&mut self, budget: usize) -> StepOutcome {
        if self.cancelled.get() {
            return StepOutcome::Cancelled;
        }
        let budget = budget.max(1);
        let mut emitted = 0;
        while emitted < budget && !self.complete {
            if self.advance() {
                emitted += 1;
            }
        }
        if self.complete {
            StepOutcome::Complete
        } else {
            StepOutcome::Pending
        }
    }

    /// Drive the session to its final node list inline.
    #[must_use]
    pub fn run_to_completion(mut self) -> Vec<FlatNode> {
        while self.run_step(usize::MAX) == StepOutcome::Pending {}
        self.nodes
    }

    /// Visit the next pending value. Returns true if a node was emitted,
    /// false when the walk just finished instead.
    fn advance(&mut self) -> bool {
        if let Some(root) = self.root.take() {
            self.visit(&root, ROOT_ID.to_string(), ROOT_ID.to_string(), 0, None);
            return true;
        }

        // Retire exhausted frames before taking the next entry.
        while let Some(frame) = self.stack.last() {
            if frame.next < frame.entries.len() {
                break;
            }
            if let Some(done) = self.stack.pop() {
                if self.opts.cycle_rule == CycleRule::AncestorOnly {
                    self.seen.remove(&done.identity);
                }
            }
        }

        let Some(frame) = self.stack.last_mut() else {
            self.complete = true;
            return false;
        };
        let (key, child) = frame.entries[frame.next].clone();
        frame.next += 1;
        let parent_id = frame.parent_id.clone();
        let depth = frame.child_depth;
        let id = format!("{parent_id}.{key}");
        self.visit(&child, key, id, depth, Some(parent_id));
        true
    }

    /// Emit the node for one value and, when the expansion gate passes,
    /// queue its children.
    fn visit(
        &mut self,
        value: &ValueRef,
        key: String,
        id: String,
        depth: usize,
        parent_id: Option<String>,
    ) {
        let kind = classify::classify(value);
        let expandable = kind.is_expandable();
        let expanded = self.expansion.is_expanded(&id);
        let child_count = classify::child_count(value).min(MAX_ITEMS_PER_LEVEL);

        if expandable && expanded && depth < self.depth_bound {
            let ident = identity(value);
            if self.seen.contains(&ident) {
                // Terminal placeholder instead of a second descent.
                self.nodes.push(FlatNode {
                    id,
                    key,
                    kind: ValueKind::Circular,
                    depth,
                    expandable: false,
                    expanded: false,
                    child_count: 0,
                    parent_id,
                    display: CIRCULAR_DISPLAY.to_string(),
                });
                return;
            }
            let mut entries = match value.child_entries() {
                Ok(entries) => entries,
                Err(_) => {
                    log::warn!(
                        "subtree at {id} is mutably borrowed by the host; rendering it childless"
                    );
                    Vec::new()
                }
            };
            entries.truncate(MAX_ITEMS_PER_LEVEL);
            self.seen.insert(ident);
            self.stack.push(Frame {
                entries,
                next: 0,
                parent_id: id.clone(),
                child_depth: depth + 1,
                identity: ident,
            });
        }

        self.nodes.push(FlatNode {
            id,
            key,
            kind,
            depth,
            expandable,
            expanded,
            child_count,
            parent_id,
            display: classify::format_value(value),
        });
    }
}

/// Flatten with the default cycle rule.
#[must_use]
pub fn flatten(
    root: &ValueRef,
    expansion: &ExpansionState,
    max_depth: usize,
) -> Vec<FlatNode> {
    flatten_with(root, expansion, FlattenOptions::with_depth(max_depth))
}

/// Flatten with explicit options. Single code path with the cooperative
/// sessions: this is a session run to completion inline.
#[must_use]
pub fn flatten_with(
    root: &ValueRef,
    expansion: &ExpansionState,
    opts: FlattenOptions,
) -> Vec<FlatNode> {
    FlattenSession::new(root, expansion, opts).run_to_completion()
}
