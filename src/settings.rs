//! Tunables for the filter engine and the similarity scorer.
//!
//! Grounded on the teacher's `TreeMatcher` tunable-bag struct and its
//! `DisplaySettings::default()` pattern in `settings.rs`.

/// Default maximum path length considered by the tree-edit-distance walk.
pub const DEFAULT_PATH_LENGTH_LIMIT: usize = 1_000;

/// Default weight of a delete edit.
pub const DEFAULT_WEIGHT_DELETE: f64 = 1.0;

/// Default weight of a substitute edit.
pub const DEFAULT_WEIGHT_SUBSTITUTE: f64 = 1.0;

/// Which comparison the row-pruning step of `set_strongest_mapping` uses
/// when clearing weaker entries out of the winning column.
///
/// The richer variant of the algorithm compares the pruned node's index
/// against the *source* node that just won, rather than against the
/// target; this looks like a latent bug (comparing across what should be
/// distinct node spaces) but is preserved here as an explicit, opt-in mode
/// rather than silently "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPruneMode {
    /// Prune every row entry whose *target* differs from the winning
    /// target. The consistent, default behavior.
    #[default]
    TargetNeq,
    /// Prune by comparing raw node indices against the winning *source*
    /// instead. Bug-compatible with the richer variant described above.
    SourceNeq,
}

/// Bundles the filter engine's and similarity scorer's tunable parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    /// Which row-pruning comparison `set_strongest_mapping` uses.
    pub row_prune_mode: RowPruneMode,
    /// Upper bound on the path length considered by the TED walk.
    pub ted_path_length_limit: usize,
    /// Weight assigned to an insert edit (a target-only node).
    pub ted_weight_insert: f64,
    /// Weight assigned to a delete edit (a source-only node).
    pub ted_weight_delete: f64,
    /// Weight assigned to a substitute edit (a non-`EQ`-mapped pair).
    pub ted_weight_substitute: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            row_prune_mode: RowPruneMode::default(),
            ted_path_length_limit: DEFAULT_PATH_LENGTH_LIMIT,
            ted_weight_insert: 1.0,
            ted_weight_delete: DEFAULT_WEIGHT_DELETE,
            ted_weight_substitute: DEFAULT_WEIGHT_SUBSTITUTE,
        }
    }
}

impl FilterSettings {
    /// The asymmetric (query-vs-reference) weighting: insertions into the
    /// target are free, so extending the target with unrelated structure
    /// never penalises the similarity score.
    pub fn asymmetric() -> Self {
        Self {
            ted_weight_insert: 0.0,
            ..Self::default()
        }
    }
}
