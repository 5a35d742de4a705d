//! Structure-preserving semantic matching
//!
//! ## Overview
//!
//! This crate filters a dense candidate relation matrix between two rooted
//! ordered trees down to a one-to-one, structure-preserving mapping, greedily
//! and deterministically, left to right. It also scores the result via a
//! weighted tree edit distance, either symmetrically or treating the source
//! as a query against a larger reference target.
//!
//! ## Using as a library
//!
//! [`SPSMTreeMatcher`] is the facade most callers want; the individual
//! modules (`tree`, `mapping_matrix`, `relation`, `similarity`) are public so
//! a caller can build candidate matrices directly instead of going through
//! the [`expr`] notation the demo binary and test suite use.

pub mod error;
pub mod expr;
pub mod mapping_matrix;
pub mod relation;
pub mod settings;
pub mod similarity;
pub mod tree;
pub(crate) mod tree_matcher;

use std::time::Instant;

use log::debug;

pub use tree_matcher::FilteredMapping;

use crate::{
    error::TreeMatcherError,
    mapping_matrix::ContextMapping,
    settings::FilterSettings,
    similarity::Weighting,
    tree::Tree,
};

/// The library's facade: bundles the tunables and exposes a single
/// `process` entry point over the free functions in [`tree_matcher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SPSMTreeMatcher {
    /// Tunables for the filter engine and the similarity scorer.
    pub settings: FilterSettings,
    /// Which similarity weighting to attach to the result.
    pub weighting: WeightingChoice,
}

/// A `Copy`-friendly stand-in for [`Weighting`], which the facade exposes as
/// a field rather than asking callers to reach into `similarity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightingChoice {
    #[default]
    Symmetric,
    Asymmetric,
}

impl From<WeightingChoice> for Weighting {
    fn from(choice: WeightingChoice) -> Self {
        match choice {
            WeightingChoice::Symmetric => Self::Symmetric,
            WeightingChoice::Asymmetric => Self::Asymmetric,
        }
    }
}

impl SPSMTreeMatcher {
    /// Filters `candidate` into a one-to-one mapping over `source`/`target`,
    /// timing the call the way the teacher's `TreeMatcher::match_trees` does.
    pub fn process<M: Clone>(&self, source: &Tree<M>, target: &Tree<M>, candidate: &mut ContextMapping) -> Result<FilteredMapping<M>, TreeMatcherError> {
        let start = Instant::now();
        let result = tree_matcher::process(source, target, candidate, self.settings, self.weighting.into())?;
        debug!("SPSM filtering took {:?}", start.elapsed());
        Ok(result)
    }
}
