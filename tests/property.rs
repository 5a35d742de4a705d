//! Property-based checks of the universal invariants over randomly generated
//! trees, grounded in `pinnacle-comp-pinnacle`'s `prop_recursive` pattern for
//! building arbitrary recursive structures (the pack's only example of
//! property testing).

use std::collections::HashSet;

use proptest::prelude::*;
use spsm::{
    SPSMTreeMatcher,
    mapping_matrix::{ContextMapping, MappingElement, new_mapping},
    relation::Relation,
    tree::{NodeId, Tree},
};

#[derive(Clone, Debug)]
struct ArbitraryNode {
    name: &'static str,
    children: Vec<Self>,
}

fn arbitrary_tree() -> impl Strategy<Value = ArbitraryNode> {
    let name = prop_oneof![Just("a"), Just("b"), Just("c"), Just("d"), Just("e")].boxed();
    let leaf = name.clone().prop_map(|name| ArbitraryNode { name, children: Vec::new() });
    leaf.prop_recursive(4, 64, 4, move |inner| {
        (name.clone(), proptest::collection::vec(inner, 0..=4)).prop_map(|(name, children)| ArbitraryNode { name, children })
    })
}

fn to_tree(node: &ArbitraryNode) -> Tree<()> {
    let mut tree = Tree::create_root(node.name, ());
    let root = tree.root();
    build_children(&mut tree, root, &node.children);
    tree
}

fn build_children(tree: &mut Tree<()>, parent: NodeId, children: &[ArbitraryNode]) {
    for child in children {
        let id = tree.create_child(parent, child.name, ());
        build_children(tree, id, &child.children);
    }
}

/// Adds an `EQ` relation between every structurally corresponding pair of
/// nodes, relying on `source` and `target` having been built from the same
/// `ArbitraryNode` and therefore sharing identical shape.
fn add_identity_mapping(source: &Tree<()>, target: &Tree<()>, mapping: &mut ContextMapping) {
    align(source, source.root(), target, target.root(), mapping);
}

fn align(source: &Tree<()>, s: NodeId, target: &Tree<()>, t: NodeId, mapping: &mut ContextMapping) {
    mapping.add(MappingElement { source: s, target: t, relation: Relation::Eq });
    for (&source_child, &target_child) in source.children(s).iter().zip(target.children(t)) {
        align(source, source_child, target, target_child, mapping);
    }
}

proptest! {
    #[test]
    fn filtering_an_identity_mapping_preserves_universal_invariants(node in arbitrary_tree()) {
        let source = to_tree(&node);
        let target = to_tree(&node);
        let mut base_candidate = new_mapping(&source, &target);
        add_identity_mapping(&source, &target, &mut base_candidate);

        let matcher = SPSMTreeMatcher::default();
        let mut first_run = base_candidate.clone();
        let result = matcher.process(&source, &target, &mut first_run).unwrap();

        let mut seen_sources = HashSet::new();
        let mut seen_targets = HashSet::new();
        for element in result.mapping.iter() {
            assert!(seen_sources.insert(element.source), "source node mapped more than once");
            assert!(seen_targets.insert(element.target), "target node mapped more than once");
            assert_eq!(
                result.reordered_source.is_leaf(element.source),
                result.reordered_target.is_leaf(element.target),
                "mapped pair does not preserve leaf/internal structure"
            );
            assert_eq!(element.relation, Relation::Eq, "every surviving relation must have existed in the candidate matrix");
        }

        let similarity = result.mapping.get_similarity();
        assert!((0.0..=1.0).contains(&similarity), "similarity {similarity} out of range");

        let mut second_run = base_candidate.clone();
        let result2 = matcher.process(&source, &target, &mut second_run).unwrap();
        assert_eq!(result.mapping.size(), result2.mapping.size(), "two runs over equal inputs must agree");
        assert!((similarity - result2.mapping.get_similarity()).abs() < 1e-9, "two runs over equal inputs must agree on similarity");
    }

    #[test]
    fn root_gate_empties_the_mapping_when_roots_are_unrelated(node in arbitrary_tree()) {
        let source = to_tree(&node);
        let target = to_tree(&node);
        // Every node gets an EQ candidate except the roots, whose entry is
        // left absent (IDK by default) so the root gate must reject it.
        let mut candidate = new_mapping(&source, &target);
        for (&source_child, &target_child) in source.children(source.root()).iter().zip(target.children(target.root())) {
            align(&source, source_child, &target, target_child, &mut candidate);
        }

        let result = SPSMTreeMatcher::default().process(&source, &target, &mut candidate).unwrap();
        assert_eq!(result.mapping.size(), 0, "a candidate root pair that is IDK must produce an empty mapping");
    }
}
