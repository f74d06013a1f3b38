//! Cross-field dependency graph.
//!
//! When field A's rule parameter names field B, the graph records
//! "B is watched by A". Edges are keyed by the *target's name* rather
//! than its id so a dependent may attach before its target exists
//! (`confirmed:password` attached ahead of `password`). Cycles are legal;
//! termination is the cascade's job (per-run visited set in the
//! validator).
//!
//! The graph owns nothing; it is a lookup structure only.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::trace;

use crate::field::FieldId;

/// Directed edge set: target field name -> ids of fields depending on it.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: RwLock<HashMap<String, HashSet<FieldId>>>,
}

impl DependencyGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` reads the value of the field named
    /// `target`.
    pub fn watch(&self, target: &str, dependent: FieldId) {
        trace!(target, %dependent, "registering dependency edge");
        self.edges
            .write()
            .entry(target.to_owned())
            .or_default()
            .insert(dependent);
    }

    /// Ids of all fields depending on the field named `target`.
    pub fn dependents_of(&self, target: &str) -> Vec<FieldId> {
        self.edges
            .read()
            .get(target)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Removes a detached field from every edge it participates in.
    /// Name keys survive as long as they still have dependents, so a
    /// replacement field with the same name keeps its watchers.
    pub fn remove_field(&self, id: FieldId) {
        let mut edges = self.edges.write();
        edges.retain(|_, dependents| {
            dependents.remove(&id);
            !dependents.is_empty()
        });
    }

    /// Total number of edges, for diagnostics.
    pub fn edge_count(&self) -> usize {
        self.edges.read().values().map(HashSet::len).sum()
    }
}
