//! Expansion state for the tree view
//!
//! A set of node ids the user has opened. Owned by the presentation layer
//! and handed to each flattening pass read-only; the only mutation path is
//! [`ExpansionState::toggle`].

use std::collections::HashSet;

/// Id of the synthetic root node; expanded in every fresh state.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    /// A fresh state with only the root expanded.
    #[must_use]
    pub fn new() -> Self {
        let mut expanded = HashSet::new();
        expanded.insert(ROOT_ID.to_string());
        Self { expanded }
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// How many ids are currently expanded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new()
    }
}
