//! The filter engine's top-level entry point, `process`, and the recursive
//! left-to-right sibling matcher it drives.
//!
//! Grounded on the teacher's `TreeMatcher::match_trees` (the `tree_matcher.rs`
//! top-down/recovery pipeline) for the overall phase structure — build
//! working copies, run a structural pass, then a similarity pass — though the
//! matching rule itself is entirely different (precedence-ordered relation
//! lookup instead of AST-kind/signature heuristics).

mod strongest_mapping;

use log::debug;

use crate::{
    error::MappingFilterError,
    mapping_matrix::{ContextMapping, new_mapping},
    relation::Relation,
    settings::FilterSettings,
    similarity::{self, Weighting},
    tree::{NodeId, Tree},
};

/// The result of filtering a candidate mapping: the primary, crossing-free
/// mapping over reordered tree copies (with similarity attached), alongside
/// the ordered mapping over the original, untouched trees for reference.
///
/// The parallel ordered/unordered pair reflects a deliberate design choice:
/// the ordered mapping preserves input tree structure but can contain sibling
/// crossings; the unordered one eliminates crossings by permuting sibling
/// order in the copies, at the cost of no longer being the caller's own trees.
pub struct FilteredMapping<M> {
    /// The crossing-free mapping over `reordered_source`/`reordered_target`,
    /// with [`ContextMapping::get_similarity`] set.
    pub mapping: ContextMapping,
    /// A deep copy of the source tree, its sibling order possibly permuted.
    pub reordered_source: Tree<M>,
    /// A deep copy of the target tree, its sibling order possibly permuted.
    pub reordered_target: Tree<M>,
    /// The mapping over the original, unreordered trees, with its own
    /// similarity set. May contain sibling crossings.
    pub ordered_mapping: ContextMapping,
}

/// Filters a candidate mapping into a one-to-one, same-structure-preserving
/// mapping, attaching a similarity score.
///
/// `candidate` is mutated in place and should be treated as consumed once
/// this returns. An empty candidate is returned unchanged (wrapped in a
/// same-shaped [`FilteredMapping`]) without creating any tree copies.
pub fn process<M: Clone>(
    source: &Tree<M>,
    target: &Tree<M>,
    candidate: &mut ContextMapping,
    settings: FilterSettings,
    weighting: Weighting,
) -> Result<FilteredMapping<M>, MappingFilterError> {
    let (mut reordered_source, source_copy_map) = source.deep_copy();
    let (mut reordered_target, target_copy_map) = target.deep_copy();

    let mut unordered_candidate = new_mapping(&reordered_source, &reordered_target);
    for element in candidate.iter() {
        let copy_source = source_copy_map[&element.source];
        let copy_target = target_copy_map[&element.target];
        unordered_candidate.set(copy_source, copy_target, element.relation);
    }

    let mut spsm_mapping = new_mapping(source, target);
    let mut unordered_spsm_mapping = new_mapping(&reordered_source, &reordered_target);

    if candidate.size() == 0 {
        debug!("empty candidate matrix, returning unchanged");
    } else {
        let root_relation = candidate.get(source.root(), target.root());
        debug!("root relation is {root_relation:?}");
        if matches!(root_relation, Relation::Eq | Relation::Mg | Relation::Lg) {
            let copy_root_source = source_copy_map[&source.root()];
            let copy_root_target = target_copy_map[&target.root()];

            strongest_mapping::set_strongest_mapping(
                source.root(),
                target.root(),
                candidate,
                &mut spsm_mapping,
                source,
                target,
                settings,
            )?;
            strongest_mapping::set_strongest_mapping(
                copy_root_source,
                copy_root_target,
                &mut unordered_candidate,
                &mut unordered_spsm_mapping,
                &reordered_source,
                &reordered_target,
                settings,
            )?;

            filter_mappings_of_children(
                source,
                target,
                &mut reordered_source,
                &mut reordered_target,
                source.root(),
                target.root(),
                copy_root_source,
                copy_root_target,
                candidate,
                &mut spsm_mapping,
                &mut unordered_candidate,
                &mut unordered_spsm_mapping,
                settings,
            )?;
        } else {
            debug!("root pair is not EQ/MG/LG, no pairs will be mapped");
        }
    }

    let ordered_similarity = similarity::score(source, target, &spsm_mapping, settings, weighting);
    spsm_mapping.set_similarity(ordered_similarity);
    let unordered_similarity = similarity::score(&reordered_source, &reordered_target, &unordered_spsm_mapping, settings, weighting);
    unordered_spsm_mapping.set_similarity(unordered_similarity);
    debug!("similarity ordered={ordered_similarity:.3} unordered={unordered_similarity:.3}");

    Ok(FilteredMapping {
        mapping: unordered_spsm_mapping,
        reordered_source,
        reordered_target,
        ordered_mapping: spsm_mapping,
    })
}

/// Recurses into a pair of already-matched parents, filtering their
/// children, provided both actually have any.
#[allow(clippy::too_many_arguments)]
fn filter_mappings_of_children<M: Clone>(
    source: &Tree<M>,
    target: &Tree<M>,
    reordered_source: &mut Tree<M>,
    reordered_target: &mut Tree<M>,
    source_parent: NodeId,
    target_parent: NodeId,
    copy_source_parent: NodeId,
    copy_target_parent: NodeId,
    candidate: &mut ContextMapping,
    spsm_mapping: &mut ContextMapping,
    unordered_candidate: &mut ContextMapping,
    unordered_spsm_mapping: &mut ContextMapping,
    settings: FilterSettings,
) -> Result<(), MappingFilterError> {
    if source.is_leaf(source_parent) || target.is_leaf(target_parent) {
        return Ok(());
    }
    filter_siblings(
        source,
        target,
        reordered_source,
        reordered_target,
        source_parent,
        target_parent,
        copy_source_parent,
        copy_target_parent,
        candidate,
        spsm_mapping,
        unordered_candidate,
        unordered_spsm_mapping,
        settings,
    )
}

/// Matches one level of siblings left-to-right.
///
/// Local working-order vectors (`source_order`/`target_order`) drive every
/// positional decision so the original trees stay structurally untouched;
/// the copy trees' real child lists are mutated in lockstep with every swap
/// applied to these vectors, so a position `i` always names the same pair of
/// (original, copy) nodes on either side. Unmatched children whose parent
/// never won a relation are never visited, so their descendants are silently
/// dropped — a known limitation, not a bug.
#[allow(clippy::too_many_arguments)]
fn filter_siblings<M: Clone>(
    source: &Tree<M>,
    target: &Tree<M>,
    reordered_source: &mut Tree<M>,
    reordered_target: &mut Tree<M>,
    source_parent: NodeId,
    target_parent: NodeId,
    copy_source_parent: NodeId,
    copy_target_parent: NodeId,
    candidate: &mut ContextMapping,
    spsm_mapping: &mut ContextMapping,
    unordered_candidate: &mut ContextMapping,
    unordered_spsm_mapping: &mut ContextMapping,
    settings: FilterSettings,
) -> Result<(), MappingFilterError> {
    let mut source_order = source.children(source_parent).to_vec();
    let mut target_order = target.children(target_parent).to_vec();

    let mut i = 0usize;
    let mut j = 0usize;
    let mut src_size = source_order.len();

    while i < src_size && j < target_order.len() {
        let mut matched = false;

        for &relation in &[Relation::Eq, Relation::Mg, Relation::Lg] {
            let swap_at = if candidate.get(source_order[i], target_order[j]) == relation {
                Some(j)
            } else {
                get_related_index(candidate, &source_order, &target_order, relation, i, j)
            };

            let Some(found_at) = swap_at else { continue };
            if found_at != j {
                target_order.swap(j, found_at);
                reordered_target.swap_children(copy_target_parent, j, found_at)?;
            }

            let source_node = source_order[i];
            let target_node = target_order[j];
            let copy_source_node = reordered_source.children(copy_source_parent)[i];
            let copy_target_node = reordered_target.children(copy_target_parent)[j];

            strongest_mapping::set_strongest_mapping(source_node, target_node, candidate, spsm_mapping, source, target, settings)?;
            strongest_mapping::set_strongest_mapping(
                copy_source_node,
                copy_target_node,
                unordered_candidate,
                unordered_spsm_mapping,
                reordered_source,
                reordered_target,
                settings,
            )?;

            filter_mappings_of_children(
                source,
                target,
                reordered_source,
                reordered_target,
                source_node,
                target_node,
                copy_source_node,
                copy_target_node,
                candidate,
                spsm_mapping,
                unordered_candidate,
                unordered_spsm_mapping,
                settings,
            )?;

            i += 1;
            j += 1;
            matched = true;
            break;
        }

        if !matched {
            let last = src_size - 1;
            if i != last {
                source_order.swap(i, last);
                reordered_source.swap_children(copy_source_parent, i, last)?;
            }
            src_size -= 1;
        }
    }

    Ok(())
}

/// Scans `target_order[j+1..]` for the first index holding `relation` against
/// `source_order[i]`.
///
/// The acceptance check compares the found index against `i` (the source
/// cursor) rather than `j` (the target cursor it was found relative to) —
/// preserved as documented source behavior rather than normalised to `> j`.
/// `i` and `j` advance in lockstep throughout `filter_siblings`, so in
/// practice the two comparisons never disagree.
fn get_related_index(candidate: &ContextMapping, source_order: &[NodeId], target_order: &[NodeId], relation: Relation, i: usize, j: usize) -> Option<usize> {
    let source_node = source_order[i];
    ((j + 1)..target_order.len())
        .find(|&k| candidate.get(source_node, target_order[k]) == relation)
        .filter(|&k| k > i)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mapping_matrix::MappingElement;

    fn build_f_ab() -> Tree<()> {
        let mut t = Tree::create_root("f", ());
        t.create_child(t.root(), "a", ());
        t.create_child(t.root(), "b", ());
        t
    }

    #[test]
    fn empty_candidate_returns_unchanged_shape() {
        let source = build_f_ab();
        let target = build_f_ab();
        let mut candidate = new_mapping(&source, &target);
        let result = process(&source, &target, &mut candidate, FilterSettings::default(), Weighting::Symmetric).unwrap();
        assert_eq!(result.mapping.size(), 0);
    }

    #[test]
    fn identical_trees_map_every_node() {
        let source = build_f_ab();
        let target = build_f_ab();
        let mut candidate = new_mapping(&source, &target);
        candidate.add(MappingElement { source: source.root(), target: target.root(), relation: Relation::Eq });
        for (s, t) in source.children(source.root()).iter().zip(target.children(target.root())) {
            candidate.add(MappingElement { source: *s, target: *t, relation: Relation::Eq });
        }
        let result = process(&source, &target, &mut candidate, FilterSettings::default(), Weighting::Symmetric).unwrap();
        assert_eq!(result.mapping.size(), 3);
        assert!((result.mapping.get_similarity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn swapped_siblings_are_realigned_in_the_copy() {
        let source = build_f_ab();
        let mut target = Tree::create_root("f", ());
        target.create_child(target.root(), "b", ());
        target.create_child(target.root(), "a", ());

        let [sa, sb] = [source.children(source.root())[0], source.children(source.root())[1]];
        let [tb, ta] = [target.children(target.root())[0], target.children(target.root())[1]];

        let mut candidate = new_mapping(&source, &target);
        candidate.add(MappingElement { source: source.root(), target: target.root(), relation: Relation::Eq });
        candidate.add(MappingElement { source: sa, target: ta, relation: Relation::Eq });
        candidate.add(MappingElement { source: sb, target: tb, relation: Relation::Eq });

        let result = process(&source, &target, &mut candidate, FilterSettings::default(), Weighting::Symmetric).unwrap();
        assert_eq!(result.mapping.size(), 3);
        let reordered_children = result.reordered_target.children(result.reordered_target.root());
        assert_eq!(result.reordered_target.name(reordered_children[0]), "a");
        assert_eq!(result.reordered_target.name(reordered_children[1]), "b");
        assert!((result.mapping.get_similarity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn root_gate_blocks_mismatched_roots() {
        let source = {
            let mut t = Tree::create_root("f", ());
            t.create_child(t.root(), "a", ());
            t
        };
        let target = {
            let mut t = Tree::create_root("g", ());
            t.create_child(t.root(), "a", ());
            t
        };
        let sa = source.children(source.root())[0];
        let ta = target.children(target.root())[0];
        let mut candidate = new_mapping(&source, &target);
        candidate.add(MappingElement { source: sa, target: ta, relation: Relation::Eq });

        let result = process(&source, &target, &mut candidate, FilterSettings::default(), Weighting::Symmetric).unwrap();
        assert_eq!(result.mapping.size(), 0);
    }

    #[test]
    fn unmatchable_sibling_is_pushed_past_the_window() {
        let mut source = Tree::create_root("f", ());
        source.create_child(source.root(), "a", ());
        source.create_child(source.root(), "b", ());
        source.create_child(source.root(), "c", ());
        let mut target = Tree::create_root("f", ());
        target.create_child(target.root(), "a", ());
        target.create_child(target.root(), "b", ());

        let [sa, sb, _sc] = [
            source.children(source.root())[0],
            source.children(source.root())[1],
            source.children(source.root())[2],
        ];
        let [ta, tb] = [target.children(target.root())[0], target.children(target.root())[1]];

        let mut candidate = new_mapping(&source, &target);
        candidate.add(MappingElement { source: source.root(), target: target.root(), relation: Relation::Eq });
        candidate.add(MappingElement { source: sa, target: ta, relation: Relation::Eq });
        candidate.add(MappingElement { source: sb, target: tb, relation: Relation::Eq });

        let result = process(&source, &target, &mut candidate, FilterSettings::default(), Weighting::Symmetric).unwrap();
        assert_eq!(result.mapping.size(), 3);
    }
}
