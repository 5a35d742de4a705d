//! Error types raised by the filter core and its surrounding facade.

use thiserror::Error;

/// Raised when the candidate matrix or the trees it refers to are
/// structurally inconsistent, e.g. a swap is requested on a node whose
/// parent cannot be determined, or a `NodeId` does not belong to the tree
/// it is being looked up against.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct MappingFilterError {
    message: String,
}

impl MappingFilterError {
    /// Creates a new error.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// The outward-facing error of the `SPSMTreeMatcher` facade.
#[derive(Debug, Error)]
pub enum TreeMatcherError {
    /// Filtering the candidate mapping failed.
    #[error("SPSM filtering failed: {0}")]
    Filter(#[from] MappingFilterError),
}
