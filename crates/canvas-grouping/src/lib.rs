//! Canvas Grouping
//!
//! Infers structure among canvas elements from their chart fields.
//!
//! # Core Concepts
//!
//! - [`Relationship`]: field overlap, temporal, comparison or drill-down link
//! - [`Group`]: elements joined by strong relationships
//! - [`StrategySuggestion`]: layout strategy chosen from element mix
//! - [`HeuristicGrouper`]: keyword-table semantic buckets and [`semantic_zones`]
//!
//! # Example
//!
//! ```rust
//! use canvas_grouping::RelationshipGrouper;
//! use canvas_layout::{CanvasElement, ChartFields, ElementKind, Point, Size};
//!
//! let chart = |id: &str, measure: &str| {
//!     CanvasElement::new(id, ElementKind::Chart, Point::default(), Size::new(400.0, 300.0).unwrap())
//!         .unwrap()
//!         .with_fields(ChartFields::new(["Region"], [measure]))
//! };
//! let elements = vec![chart("a", "Revenue"), chart("b", "Profit")];
//!
//! let grouper = RelationshipGrouper::default();
//! let relationships = grouper.detect_relationships(&elements);
//! let groups = grouper.suggest_groupings(&elements, &relationships);
//! assert_eq!(groups.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod grouping;
pub mod heuristic;
pub mod relationship;
pub mod suggest;
pub mod title;
pub mod zones;

pub use config::GroupingConfig;
pub use error::GroupingError;
pub use grouping::Group;
pub use heuristic::{Bucket, GroupingMethod, HeuristicGrouper, SemanticGrouping, OTHER_LABEL};
pub use relationship::{Relationship, RelationshipKind};
pub use suggest::StrategySuggestion;
pub use title::{chart_title, display_title};
pub use zones::semantic_zones;

use canvas_layout::CanvasElement;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Relationship detection, grouping and strategy suggestion
#[derive(Debug, Clone, Default)]
pub struct RelationshipGrouper {
    config: GroupingConfig,
}

impl RelationshipGrouper {
    /// Create grouper with configuration
    #[inline]
    #[must_use]
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Pairwise relationships among elements that carry fields
    #[must_use]
    pub fn detect_relationships(&self, elements: &[CanvasElement]) -> Vec<Relationship> {
        relationship::detect_relationships(elements, &self.config)
    }

    /// Partition elements by strong relationships
    #[must_use]
    pub fn suggest_groupings(
        &self,
        elements: &[CanvasElement],
        relationships: &[Relationship],
    ) -> Vec<Group> {
        grouping::suggest_groupings(elements, relationships, self.config.min_strength)
    }

    /// Layout strategy for `elements`
    #[must_use]
    pub fn suggest_strategy(&self, elements: &[CanvasElement]) -> StrategySuggestion {
        let relationships = self.detect_relationships(elements);
        suggest::suggest_strategy(elements, &relationships, self.config.min_strength)
    }

    /// Bucket elements by a criterion phrase
    ///
    /// # Errors
    ///
    /// [`GroupingError::Unsupported`] for [`GroupingMethod::ModelAssisted`],
    /// [`GroupingError::EmptyCriterion`] for a blank criterion.
    pub fn group_semantic(
        &self,
        method: GroupingMethod,
        criterion: &str,
        elements: &[CanvasElement],
    ) -> Result<SemanticGrouping, GroupingError> {
        match method {
            GroupingMethod::Heuristic => HeuristicGrouper::new().group(criterion, elements),
            GroupingMethod::ModelAssisted => Err(GroupingError::Unsupported(method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_assisted_is_rejected() {
        let grouper = RelationshipGrouper::default();
        assert_eq!(
            grouper.group_semantic(GroupingMethod::ModelAssisted, "funnel", &[]),
            Err(GroupingError::Unsupported(GroupingMethod::ModelAssisted))
        );
    }
}
