//! Arrangement of canvas elements with a requested or suggested strategy

use crate::action::Action;
use crate::canvas::CanvasState;
use crate::error::ExecutorError;
use crate::executor::{ActionExecutor, ExecutorOutput};
use async_trait::async_trait;
use canvas_grouping::RelationshipGrouper;
use canvas_layout::{
    CanvasElement, ElementSpec, LayoutError, LayoutStrategy, SpatialLayoutEngine,
};

/// Re-arranges selected elements with a named or suggested strategy
#[derive(Debug, Clone, Default)]
pub struct ArrangeExecutor {
    engine: SpatialLayoutEngine,
    grouper: RelationshipGrouper,
}

impl ArrangeExecutor {
    /// Create executor
    #[must_use]
    pub fn new(engine: SpatialLayoutEngine, grouper: RelationshipGrouper) -> Self {
        Self { engine, grouper }
    }
}

#[async_trait]
impl ActionExecutor for ArrangeExecutor {
    async fn execute(
        &self,
        action: &Action,
        canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError> {
        let Action::Arrange { strategy, elements } = action else {
            return Err(ExecutorError::Failed(format!(
                "arrange executor cannot run {}",
                action.action_type()
            )));
        };

        let mut targets: Vec<CanvasElement> = if elements.is_empty() {
            canvas.element_vec()
        } else {
            elements
                .iter()
                .map(|id| {
                    canvas
                        .get(id)
                        .cloned()
                        .ok_or_else(|| LayoutError::UnknownElement(id.clone()))
                })
                .collect::<Result<_, _>>()?
        };
        if targets.is_empty() {
            return Err(LayoutError::EmptyInput.into());
        }

        let (strategy, reason) = match strategy {
            Some(name) => (LayoutStrategy::from_name(name), "requested".to_string()),
            None => {
                let suggestion = self.grouper.suggest_strategy(&targets);
                (suggestion.strategy, suggestion.reason)
            }
        };

        let specs: Vec<ElementSpec> = targets.iter().map(ElementSpec::from).collect();
        let plan = self.engine.arrange(&specs, strategy, &canvas.element_vec())?;
        plan.apply_to(&mut targets)?;

        let message = format!("arranged {} elements with {strategy} ({reason})", targets.len());
        Ok(ExecutorOutput::elements(targets).with_message(message))
    }
}
