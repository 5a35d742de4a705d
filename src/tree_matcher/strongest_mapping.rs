//! Picking the single strongest candidate relation for one source node.
//!
//! Grounded on the teacher's `Matching::add`/`can_be_matched` one-to-one
//! enforcement in `matching.rs`, generalized from a strict yes/no match to a
//! graded [`Relation`] with precedence-based tie-breaking.

use crate::{
    error::MappingFilterError,
    mapping_matrix::{ContextMapping, MappingElement},
    relation::Relation,
    settings::{FilterSettings, RowPruneMode},
    tree::{NodeId, Tree},
};

/// Both nodes are leaves, or both have children.
pub(crate) fn is_same_structure<M>(source: &Tree<M>, s: NodeId, target: &Tree<M>, t: NodeId) -> bool {
    source.is_leaf(s) == target.is_leaf(t)
}

/// Whether some source node other than `s` holds a relation to `t` that is
/// more precedent than `baseline`.
fn exists_stronger_in_column(s: NodeId, t: NodeId, candidate: &ContextMapping, baseline: Relation) -> bool {
    candidate.iter_source_nodes().any(|i| {
        i != s && {
            let other = candidate.get(i, t);
            other != Relation::Idk && Relation::is_precedent(other, baseline)
        }
    })
}

/// Clears the winner's column (other sources mapped to its target) and row
/// (other targets mapped from its source).
fn delete_remaining_relations_from_matrix(winner: MappingElement, candidate: &mut ContextMapping) {
    for n in candidate.iter_source_nodes() {
        if n != winner.source {
            candidate.set(n, winner.target, Relation::Idk);
        }
    }
    for n in candidate.iter_target_nodes() {
        if n != winner.target {
            candidate.set(winner.source, n, Relation::Idk);
        }
    }
}

/// Installs the strongest relation between `s` and `t` into `out`, pruning
/// weaker competitors out of `candidate` along the way.
pub(crate) fn set_strongest_mapping<M>(
    s: NodeId,
    t: NodeId,
    candidate: &mut ContextMapping,
    out: &mut ContextMapping,
    source: &Tree<M>,
    target: &Tree<M>,
    settings: FilterSettings,
) -> Result<(), MappingFilterError> {
    if is_same_structure(source, s, target, t) {
        let winner = candidate.get(s, t);
        out.set(s, t, winner);

        for n in candidate.iter_target_nodes() {
            let prune_candidate = match settings.row_prune_mode {
                RowPruneMode::TargetNeq => n != t,
                // Bug-compatible: compares a target-space index against the
                // source node directly, across what should be distinct
                // node spaces.
                RowPruneMode::SourceNeq => n.raw() != s.raw(),
            };
            if prune_candidate {
                let other = candidate.get(s, n);
                if other != Relation::Idk && Relation::is_precedent(winner, other) {
                    candidate.set(s, n, Relation::Idk);
                }
            }
        }

        for n in candidate.iter_source_nodes() {
            if n != s {
                candidate.set(n, t, Relation::Idk);
            }
        }
        Ok(())
    } else {
        compute_strongest_mapping_for_source(s, candidate, out, source, target)
    }
}

/// Scans `s`'s entire row for the strongest same-structure candidate,
/// resolves ties by case-insensitive trimmed name equality with `s`, then
/// commits the winner and sweeps the rest of its row/column away.
///
/// The row-pruning asymmetry documented on [`RowPruneMode`] is specific to
/// the same-structure branch of [`set_strongest_mapping`]; this function has
/// no equivalent switch to make.
pub(crate) fn compute_strongest_mapping_for_source<M>(
    s: NodeId,
    candidate: &mut ContextMapping,
    out: &mut ContextMapping,
    source: &Tree<M>,
    target: &Tree<M>,
) -> Result<(), MappingFilterError> {
    let mut strongest = Vec::new();
    let mut strongest_relation = Relation::Idk;

    for j in candidate.iter_target_nodes() {
        let relation = if is_same_structure(source, s, target, j) {
            candidate.get(s, j)
        } else {
            Relation::Idk
        };
        if relation == Relation::Idk || exists_stronger_in_column(s, j, candidate, relation) {
            continue;
        }
        if strongest.is_empty() || Relation::is_precedent(relation, strongest_relation) {
            strongest.clear();
            strongest.push(j);
            strongest_relation = relation;
        }
    }

    if strongest.is_empty() {
        return Ok(());
    }

    for j in candidate.iter_target_nodes() {
        if strongest.contains(&j) {
            continue;
        }
        let relation = candidate.get(s, j);
        if relation == Relation::Idk {
            continue;
        }
        if Relation::is_precedent(strongest_relation, relation) {
            candidate.set(s, j, Relation::Idk);
        } else if relation == strongest_relation && is_same_structure(source, s, target, j) {
            strongest.push(j);
        }
    }

    let winner_target = if strongest.len() > 1 {
        let source_name = source.name(s).trim().to_lowercase();
        strongest
            .iter()
            .find(|&&j| target.name(j).trim().to_lowercase() == source_name)
            .copied()
            .unwrap_or(strongest[0])
    } else {
        strongest[0]
    };

    for n in candidate.iter_source_nodes() {
        if n != s {
            candidate.set(n, winner_target, Relation::Idk);
        }
    }

    let winner = MappingElement {
        source: s,
        target: winner_target,
        relation: strongest_relation,
    };
    out.add(winner);
    delete_remaining_relations_from_matrix(winner, candidate);
    Ok(())
}
