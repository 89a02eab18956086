//! Error types for grouping

use crate::heuristic::GroupingMethod;

/// Grouping failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingError {
    /// Requested grouping method has no implementation
    #[error("grouping method not supported: {0:?}")]
    Unsupported(GroupingMethod),

    /// Criterion phrase was empty
    #[error("empty grouping criterion")]
    EmptyCriterion,
}
