//! The mutable candidate matrix and the one-to-one output mapping it is
//! filtered into. Both are the same type: `process` is handed a
//! [`ContextMapping`] full of candidate relations and fills fresh, empty
//! `ContextMapping`s with the winners.

use rustc_hash::FxHashMap;

use crate::{relation::Relation, tree::NodeId};

/// An immutable triple `(source, target, relation)` with `relation != IDK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingElement {
    pub source: NodeId,
    pub target: NodeId,
    pub relation: Relation,
}

/// A mutable partial function `(source_node, target_node) -> Relation`.
///
/// Rather than borrowing the source/target trees directly (which would make
/// the mapping self-referential with respect to the trees the filter engine
/// builds internally), a `ContextMapping` only remembers how many nodes each
/// side has. `iter_source_nodes`/`iter_target_nodes` enumerate by id alone,
/// exactly as the teacher's `Matching::translate` re-keys matches by node id
/// rather than carrying long-lived cross-arena references.
#[derive(Debug, Clone)]
pub struct ContextMapping {
    source_len: usize,
    target_len: usize,
    entries: FxHashMap<(NodeId, NodeId), Relation>,
    similarity: f64,
}

impl ContextMapping {
    /// Creates an empty mapping over a source tree with `source_len` nodes
    /// and a target tree with `target_len` nodes.
    pub fn new(source_len: usize, target_len: usize) -> Self {
        Self {
            source_len,
            target_len,
            entries: FxHashMap::default(),
            similarity: 0.0,
        }
    }

    /// Reads the relation stored for `(s, t)`, defaulting to `IDK`.
    pub fn get(&self, s: NodeId, t: NodeId) -> Relation {
        self.entries.get(&(s, t)).copied().unwrap_or_default()
    }

    /// Stores a relation for `(s, t)`, or deletes the entry if `r` is `IDK`.
    pub fn set(&mut self, s: NodeId, t: NodeId, r: Relation) {
        if r == Relation::Idk {
            self.entries.remove(&(s, t));
        } else {
            self.entries.insert((s, t), r);
        }
    }

    /// Inserts a mapping element (equivalent to `set(e.source, e.target, e.relation)`).
    pub fn add(&mut self, e: MappingElement) {
        self.set(e.source, e.target, e.relation);
    }

    /// All nodes of the source tree this mapping was created over, including
    /// ones with no non-`IDK` entry.
    pub fn iter_source_nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.source_len).map(NodeId::from_raw)
    }

    /// All nodes of the target tree this mapping was created over, including
    /// ones with no non-`IDK` entry.
    pub fn iter_target_nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.target_len).map(NodeId::from_raw)
    }

    /// The number of non-`IDK` entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over every surviving mapping element.
    pub fn iter(&self) -> impl Iterator<Item = MappingElement> + '_ {
        self.entries.iter().map(|(&(source, target), &relation)| MappingElement {
            source,
            target,
            relation,
        })
    }

    /// Attaches a similarity score to this mapping.
    pub fn set_similarity(&mut self, similarity: f64) {
        self.similarity = similarity;
    }

    /// The similarity score last attached via `set_similarity`.
    pub fn get_similarity(&self) -> f64 {
        self.similarity
    }

    /// The target node, if any, that `s` is mapped to.
    pub fn get_from_source(&self, s: NodeId) -> Option<NodeId> {
        self.iter_target_nodes().find(|&t| self.get(s, t) != Relation::Idk)
    }

    /// The source node, if any, that `t` is mapped from.
    pub fn get_from_target(&self, t: NodeId) -> Option<NodeId> {
        self.iter_source_nodes().find(|&s| self.get(s, t) != Relation::Idk)
    }
}

/// Creates a fresh, empty mapping sized for the given source/target trees.
pub fn new_mapping<M>(source_context: &crate::tree::Tree<M>, target_context: &crate::tree::Tree<M>) -> ContextMapping {
    ContextMapping::new(source_context.len(), target_context.len())
}
