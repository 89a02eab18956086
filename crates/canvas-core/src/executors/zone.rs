//! Semantic zones drawn around related elements

use crate::action::Action;
use crate::canvas::CanvasState;
use crate::error::ExecutorError;
use crate::executor::{ActionExecutor, ExecutorOutput};
use async_trait::async_trait;
use canvas_grouping::{semantic_zones, GroupingMethod, RelationshipGrouper};

/// Buckets elements by a criterion and wraps each bucket in a zone
#[derive(Debug, Clone)]
pub struct SemanticZoneExecutor {
    grouper: RelationshipGrouper,
    default_padding: f64,
}

impl SemanticZoneExecutor {
    /// Create executor with the padding used when the action gives none
    #[must_use]
    pub fn new(grouper: RelationshipGrouper, default_padding: f64) -> Self {
        Self {
            grouper,
            default_padding,
        }
    }
}

impl Default for SemanticZoneExecutor {
    fn default() -> Self {
        Self::new(RelationshipGrouper::default(), 20.0)
    }
}

#[async_trait]
impl ActionExecutor for SemanticZoneExecutor {
    async fn execute(
        &self,
        action: &Action,
        canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError> {
        let Action::GroupSemantic { criterion, padding } = action else {
            return Err(ExecutorError::Failed(format!(
                "zone executor cannot run {}",
                action.action_type()
            )));
        };

        let elements = canvas.element_vec();
        let grouping = self
            .grouper
            .group_semantic(GroupingMethod::Heuristic, criterion, &elements)?;
        let zones = semantic_zones(
            &elements,
            &grouping.buckets,
            padding.unwrap_or(self.default_padding),
        );

        let message = format!("{} zones for \"{}\"", zones.len(), grouping.criterion);
        Ok(ExecutorOutput {
            zones,
            message: Some(message),
            ..ExecutorOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_layout::{CanvasElement, ChartFields, ElementKind, Point, Size};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn zones_follow_buckets() {
        let chart = |id: &str, x: f64, measure: &str| {
            CanvasElement::new(id, ElementKind::Chart, Point::new(x, 0.0), Size::new(300.0, 200.0).unwrap())
                .unwrap()
                .with_fields(ChartFields::new(["Region"], [measure]))
        };
        let canvas = CanvasState::from_elements([
            chart("rev", 0.0, "Revenue"),
            chart("cost", 400.0, "Cost"),
            chart("sessions", 800.0, "Sessions"),
        ]);
        let action = Action::GroupSemantic {
            criterion: "financial".into(),
            padding: Some(10.0),
        };
        let output = SemanticZoneExecutor::default()
            .execute(&action, &canvas)
            .await
            .unwrap();

        let labels: Vec<&str> = output.zones.iter().map(|z| z.label.as_str()).collect();
        assert_eq!(labels, vec!["Revenue", "Cost"]);
        assert_eq!(output.zones[0].bounds.x, -10.0);
        assert!(output.elements.is_empty());
    }
}
