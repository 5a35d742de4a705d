//! A rooted ordered tree, arena-backed and addressed by [`NodeId`].
//!
//! Nodes are indexed rather than borrowed, following the design note that
//! accompanies this algorithm: sibling-swap mutation (see
//! [`crate::tree_matcher`]) has no aliasing hazard once identity is a plain
//! `usize` rather than a reference into the arena being mutated.

use rustc_hash::FxHashMap;

use crate::error::MappingFilterError;

/// The identity of a node within one particular [`Tree`].
///
/// Two `NodeId`s are only meaningfully comparable when they were produced by
/// the same `Tree`; comparing ids minted by different trees is the caller's
/// responsibility to avoid (the filter engine only ever does so through an
/// explicit copy map, never by raw equality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Constructs a `NodeId` from a raw arena index. Only meant for code
    /// within this crate that enumerates `0..len`, such as
    /// [`crate::mapping_matrix::ContextMapping`]'s node iterators.
    pub(crate) const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw arena index. Exposed only for the bug-compatible row-pruning
    /// mode described in [`crate::settings::RowPruneMode::SourceNeq`], which
    /// intentionally compares indices across what should be distinct node
    /// spaces.
    pub(crate) const fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<M> {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    ancestor_count: usize,
    metadata: M,
}

/// A rooted ordered tree of nodes, each carrying a name and opaque metadata.
///
/// The core never inspects `M`; it is carried along purely so that callers
/// can attach concepts, formulas, or provenance to a node and get them back
/// untouched on the copies the filter produces.
#[derive(Debug, Clone)]
pub struct Tree<M> {
    nodes: Vec<Node<M>>,
    root: NodeId,
}

impl<M> Tree<M> {
    /// Creates a new tree with a single root node.
    pub fn create_root(name: impl Into<String>, metadata: M) -> Self {
        let root = Node {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            ancestor_count: 0,
            metadata,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root of the tree.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes. Always false: a `Tree` always has a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node<M> {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<M> {
        &mut self.nodes[id.0]
    }

    /// The name of a node.
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// The metadata attached to a node.
    pub fn metadata(&self, id: NodeId) -> &M {
        &self.node(id).metadata
    }

    /// The parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The depth of a node from the root (the root has depth 0).
    pub fn ancestor_count(&self, id: NodeId) -> usize {
        self.node(id).ancestor_count
    }

    /// Whether a node has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }

    /// Creates a new child of `parent`, appended at the end of its child list.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        metadata: M,
    ) -> NodeId {
        let ancestor_count = self.node(parent).ancestor_count + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            ancestor_count,
            metadata,
        });
        self.node_mut(parent).children.push(id);
        id
    }

    /// Inserts an existing node as a child of `parent` at `index`, setting
    /// its parent link accordingly.
    pub fn add_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Removes a specific child (by identity) from `parent`'s child list.
    ///
    /// Returns an error if `child` is not currently one of `parent`'s children.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), MappingFilterError> {
        let children = &mut self.node_mut(parent).children;
        let position = children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| MappingFilterError::new("cannot remove a node that is not a child of the given parent"))?;
        children.remove(position);
        Ok(())
    }

    /// Swaps the children of `parent` at positions `i` and `k`.
    ///
    /// Implemented as remove-then-reinsert rather than a plain slice swap, so
    /// that the recipe stays correct regardless of whether a given tree
    /// implementation stores children as a mutable or structurally frozen
    /// collection (see the copy-tree swap design note); for the `Vec`-backed
    /// arena used here, this has the same observable effect as
    /// `children.swap(i, k)`.
    pub fn swap_children(&mut self, parent: NodeId, i: usize, k: usize) -> Result<(), MappingFilterError> {
        if i == k {
            return Ok(());
        }
        let (lo, hi) = (i.min(k), i.max(k));
        let children = self.children(parent);
        let lo_node = *children
            .get(lo)
            .ok_or_else(|| MappingFilterError::new("swap index out of range for parent's children"))?;
        let hi_node = *children
            .get(hi)
            .ok_or_else(|| MappingFilterError::new("swap index out of range for parent's children"))?;
        self.remove_child(parent, hi_node)?;
        self.remove_child(parent, lo_node)?;
        self.add_child_at(parent, lo, hi_node);
        self.add_child_at(parent, hi, lo_node);
        Ok(())
    }

    /// Iterates over every node of the tree, in arena (creation) order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeId> + use<M> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// A depth-first, pre-order traversal starting at `start`.
    pub fn dfs_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        result
    }

    /// Deep-copies the tree into a fresh arena, returning the copy together
    /// with a side table mapping each original node id to its counterpart in
    /// the copy. Metadata is cloned; parent/child links are freshly built.
    pub fn deep_copy(&self) -> (Self, FxHashMap<NodeId, NodeId>)
    where
        M: Clone,
    {
        let mut copy_map = FxHashMap::default();
        let root_metadata = self.node(self.root).metadata.clone();
        let mut copy = Self::create_root(self.name(self.root), root_metadata);
        copy_map.insert(self.root, copy.root());

        for original in self.dfs_from(self.root) {
            for &child in self.children(original) {
                let copied_parent = copy_map[&original];
                let copied_child = copy.create_child(
                    copied_parent,
                    self.name(child),
                    self.node(child).metadata.clone(),
                );
                copy_map.insert(child, copied_child);
            }
        }
        (copy, copy_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<()> {
        let mut t = Tree::create_root("f", ());
        let a = t.create_child(t.root(), "a", ());
        let _b = t.create_child(t.root(), "b", ());
        t.create_child(a, "c", ());
        t
    }

    #[test]
    fn depths_and_leaves() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.ancestor_count(t.root()), 0);
        let a = t.children(t.root())[0];
        assert_eq!(t.ancestor_count(a), 1);
        assert!(!t.is_leaf(t.root()));
        assert!(!t.is_leaf(a));
        let c = t.children(a)[0];
        assert!(t.is_leaf(c));
    }

    #[test]
    fn deep_copy_is_isomorphic_but_distinct() {
        let t = sample();
        let (copy, map) = t.deep_copy();
        assert_eq!(copy.len(), t.len());
        for id in t.iter_nodes() {
            let copied = map[&id];
            assert_eq!(t.name(id), copy.name(copied));
            assert_eq!(t.children(id).len(), copy.children(copied).len());
        }
    }

    #[test]
    fn swap_children_reorders_in_place() {
        let mut t = sample();
        let root = t.root();
        let [a, b] = [t.children(root)[0], t.children(root)[1]];
        t.swap_children(root, 0, 1).unwrap();
        assert_eq!(t.children(root), [b, a]);
    }

    #[test]
    fn remove_nonexistent_child_errors() {
        let mut t = sample();
        let root = t.root();
        let stray = t.create_child(root, "stray", ());
        t.remove_child(root, stray).unwrap();
        assert!(t.remove_child(root, stray).is_err());
    }
}
