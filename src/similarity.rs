//! Similarity scoring via tree edit distance over a filtered mapping.
//!
//! Grounded on the teacher's `tree_matcher.rs` `TEDTree` adapter around the
//! `tree-edit-distance` crate: a small wrapper tree whose `kind()` folds in
//! whether a node is mapped, so the external crate's generic diff routine
//! enforces the "only `EQ`-mapped nodes may be considered equal" constraint
//! without any SPSM-specific code inside the crate itself. Unlike the
//! teacher's `matched_to_id: Option<usize>` (where two unrelated unmatched
//! nodes of the same AST kind can collide via `None == None`), this scorer's
//! `Kind` keeps unmatched source and target nodes in disjoint, individually
//! unique variants, so only genuine `EQ` pairs ever compare equal.

use log::warn;
use tree_edit_distance::{Edit, diff};

use crate::{mapping_matrix::ContextMapping, relation::Relation, settings::FilterSettings, tree::Tree};

/// Which side is treated as the free-to-extend one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// `1 - ed / max(|source|, |target|)`; neither side is privileged.
    Symmetric,
    /// `1 - ed / |source|` with insertions into the target free; meant for
    /// a query source matched against a larger reference target.
    Asymmetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Matched(usize),
    SourceOnly(usize),
    TargetOnly(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

struct TedNode {
    kind: Kind,
    children: Vec<Self>,
}

impl tree_edit_distance::Node for TedNode {
    type Kind = Kind;

    fn kind(&self) -> Self::Kind {
        self.kind
    }

    type Weight = u64;

    fn weight(&self) -> Self::Weight {
        1
    }
}

impl tree_edit_distance::Tree for TedNode {
    type Children<'c> = std::slice::Iter<'c, Self>;

    fn children(&self) -> Self::Children<'_> {
        self.children.iter()
    }
}

/// Per-node-id index shared by an `EQ`-mapped source/target pair; built
/// once per scoring call rather than re-derived per node.
struct MatchIndex {
    source: rustc_hash::FxHashMap<crate::tree::NodeId, usize>,
    target: rustc_hash::FxHashMap<crate::tree::NodeId, usize>,
}

impl MatchIndex {
    fn build(mapping: &ContextMapping) -> Self {
        let mut source = rustc_hash::FxHashMap::default();
        let mut target = rustc_hash::FxHashMap::default();
        for (i, element) in mapping.iter().filter(|e| e.relation == Relation::Eq).enumerate() {
            source.insert(element.source, i);
            target.insert(element.target, i);
        }
        Self { source, target }
    }

    fn kind_of(&self, id: crate::tree::NodeId, side: Side) -> Kind {
        match side {
            Side::Source => self.source.get(&id).map_or(Kind::SourceOnly(id_raw(id)), |&i| Kind::Matched(i)),
            Side::Target => self.target.get(&id).map_or(Kind::TargetOnly(id_raw(id)), |&i| Kind::Matched(i)),
        }
    }
}

fn id_raw(id: crate::tree::NodeId) -> usize {
    // `NodeId` exposes `raw()` only within the crate; this stays inside it.
    id.raw()
}

fn build_ted_node<M>(tree: &Tree<M>, id: crate::tree::NodeId, side: Side, index: &MatchIndex) -> TedNode {
    let children = tree.children(id).iter().map(|&child| build_ted_node(tree, child, side, index)).collect();
    TedNode {
        kind: index.kind_of(id, side),
        children,
    }
}

/// Walks an edit script against the two wrapper-node forests in lock step,
/// accumulating a weighted cost. Mirrors the teacher's
/// `convert_tree_edits_to_matches` cursor-walking pattern, which similarly
/// discards the crate's own returned cost and re-derives one from the edit
/// script instead.
fn walk_cost(left_nodes: &[TedNode], right_nodes: &[TedNode], edits: &[Edit], settings: &FilterSettings) -> f64 {
    let mut left_iter = left_nodes.iter();
    let mut right_iter = right_nodes.iter();
    let mut left_cursor = left_iter.next();
    let mut right_cursor = right_iter.next();
    let mut cost = 0.0;
    for edit in edits {
        match edit {
            Edit::Replace(child_edits) => {
                let (Some(left), Some(right)) = (left_cursor, right_cursor) else {
                    break;
                };
                if left.kind != right.kind {
                    cost += settings.ted_weight_substitute;
                }
                cost += walk_cost(&left.children, &right.children, child_edits, settings);
                left_cursor = left_iter.next();
                right_cursor = right_iter.next();
            }
            Edit::Insert => {
                cost += settings.ted_weight_insert;
                right_cursor = right_iter.next();
            }
            Edit::Remove => {
                cost += settings.ted_weight_delete;
                left_cursor = left_iter.next();
            }
        }
    }
    cost
}

/// Computes the weighted tree edit distance between `source` and `target`
/// under a filtered `mapping`, then stores and exposes it.
pub struct TreeEditDistance<'a, M> {
    source: &'a Tree<M>,
    target: &'a Tree<M>,
    mapping: &'a ContextMapping,
    settings: FilterSettings,
    distance: Option<f64>,
}

impl<'a, M> TreeEditDistance<'a, M> {
    pub fn new(source: &'a Tree<M>, target: &'a Tree<M>, mapping: &'a ContextMapping, settings: FilterSettings) -> Self {
        Self {
            source,
            target,
            mapping,
            settings,
            distance: None,
        }
    }

    /// Runs the external crate's diff, then re-derives a weighted cost from
    /// its edit script via [`walk_cost`]. Stores the result for
    /// [`Self::get_tree_edit_distance`] and returns it.
    ///
    /// `diff` is called on the two roots directly, so `edits` is a
    /// singleton-wrapped script (`[Edit::Replace(real_children_script)]`)
    /// describing the 1-element-forest comparison of the roots themselves,
    /// with the real per-child alignment nested one level inside. `left`/
    /// `right` are wrapped into one-element slices before being handed to
    /// `walk_cost`, mirroring the teacher's `last_chance_match`, which wraps
    /// `left_stripped`/`right_stripped` into `left_nodes`/`right_nodes`
    /// arrays for exactly this reason before calling
    /// `convert_tree_edits_to_matches`.
    pub fn calculate(&mut self) -> f64 {
        let index = MatchIndex::build(self.mapping);
        let left = build_ted_node(self.source, self.source.root(), Side::Source, &index);
        let right = build_ted_node(self.target, self.target.root(), Side::Target, &index);
        let (edits, _cost) = diff(&left, &right);
        let left_nodes = [left];
        let right_nodes = [right];
        let distance = walk_cost(&left_nodes, &right_nodes, &edits, &self.settings);
        self.distance = Some(distance);
        distance
    }

    /// The last computed distance, or `0.0` if `calculate` was never called.
    pub fn get_tree_edit_distance(&self) -> f64 {
        self.distance.unwrap_or(0.0)
    }
}

/// Scores a filtered mapping in `[0,1]`, falling back to a cheap
/// matched-node ratio when either tree exceeds
/// `settings.ted_path_length_limit` (mirroring the teacher's size-gated
/// fallback from RTED matching to `match_subtrees_linearly`).
pub fn score<M>(source: &Tree<M>, target: &Tree<M>, mapping: &ContextMapping, settings: FilterSettings, weighting: Weighting) -> f64 {
    let mut settings = settings;
    if weighting == Weighting::Asymmetric {
        settings.ted_weight_insert = 0.0;
    }

    let denom = match weighting {
        Weighting::Symmetric => source.len().max(target.len()) as f64,
        Weighting::Asymmetric => source.len() as f64,
    };
    if denom == 0.0 {
        return 1.0;
    }

    if source.len() > settings.ted_path_length_limit || target.len() > settings.ted_path_length_limit {
        warn!(
            "trees too large for edit-distance scoring ({} vs {} nodes, limit {}); falling back to matched-node ratio",
            source.len(),
            target.len(),
            settings.ted_path_length_limit
        );
        let matched = mapping.iter().filter(|e| e.relation == Relation::Eq).count() as f64;
        return (matched / denom).clamp(0.0, 1.0);
    }

    let ed = TreeEditDistance::new(source, target, mapping, settings).calculate();
    (1.0 - ed / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping_matrix::{MappingElement, new_mapping};

    fn leaf_pair() -> (Tree<()>, Tree<()>) {
        let mut source = Tree::create_root("f", ());
        source.create_child(source.root(), "a", ());
        source.create_child(source.root(), "b", ());
        let mut target = Tree::create_root("f", ());
        target.create_child(target.root(), "a", ());
        target.create_child(target.root(), "b", ());
        (source, target)
    }

    #[test]
    fn identical_trees_fully_matched_score_one() {
        let (source, target) = leaf_pair();
        let mut mapping = new_mapping(&source, &target);
        mapping.add(MappingElement { source: source.root(), target: target.root(), relation: Relation::Eq });
        for (s, t) in source.children(source.root()).iter().zip(target.children(target.root())) {
            mapping.add(MappingElement { source: *s, target: *t, relation: Relation::Eq });
        }
        let similarity = score(&source, &target, &mapping, FilterSettings::default(), Weighting::Symmetric);
        assert!((similarity - 1.0).abs() < 1e-9, "expected 1.0, got {similarity}");
    }

    #[test]
    fn empty_mapping_scores_low() {
        let (source, target) = leaf_pair();
        let mapping = new_mapping(&source, &target);
        let similarity = score(&source, &target, &mapping, FilterSettings::default(), Weighting::Symmetric);
        assert!(similarity < 0.2, "expected near-zero, got {similarity}");
    }

    #[test]
    fn asymmetric_weighting_is_free_about_target_only_nodes() {
        let mut source = Tree::create_root("f", ());
        source.create_child(source.root(), "a", ());
        let mut target = Tree::create_root("f", ());
        target.create_child(target.root(), "a", ());
        target.create_child(target.root(), "c", ());

        let mut mapping = new_mapping(&source, &target);
        mapping.add(MappingElement { source: source.root(), target: target.root(), relation: Relation::Eq });
        mapping.add(MappingElement {
            source: source.children(source.root())[0],
            target: target.children(target.root())[0],
            relation: Relation::Eq,
        });

        let similarity = score(&source, &target, &mapping, FilterSettings::default(), Weighting::Asymmetric);
        assert!((similarity - 1.0).abs() < 1e-9, "expected 1.0, got {similarity}");
    }
}
