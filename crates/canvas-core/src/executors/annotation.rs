//! Annotation placement beside an anchor element or in free space

use crate::action::Action;
use crate::canvas::CanvasState;
use crate::error::ExecutorError;
use crate::executor::{ActionExecutor, ExecutorOutput};
use async_trait::async_trait;
use canvas_layout::{CanvasElement, ElementKind, LayoutError, SpatialLayoutEngine};

/// Places a text annotation next to its anchor, or near the canvas centre
#[derive(Debug, Clone, Default)]
pub struct AnnotationExecutor {
    engine: SpatialLayoutEngine,
}

impl AnnotationExecutor {
    /// Create executor
    #[must_use]
    pub fn new(engine: SpatialLayoutEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ActionExecutor for AnnotationExecutor {
    async fn execute(
        &self,
        action: &Action,
        canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError> {
        let Action::AddAnnotation { id, text, anchor } = action else {
            return Err(ExecutorError::Failed(format!(
                "annotation executor cannot run {}",
                action.action_type()
            )));
        };

        let elements = canvas.element_vec();
        let anchor_point = match anchor {
            Some(anchor) => canvas
                .get(anchor)
                .map(|e| e.bounds().center())
                .ok_or_else(|| LayoutError::UnknownElement(anchor.clone()))?,
            None => self.engine.canvas_center(&elements),
        };

        let position =
            self.engine
                .find_optimal_position(ElementKind::Annotation, anchor_point, &elements);
        let size = self.engine.config().default_size(ElementKind::Annotation);
        let note = CanvasElement::new(id.clone(), ElementKind::Annotation, position, size)?
            .with_title(text.clone());

        Ok(ExecutorOutput::elements(vec![note]).with_message(format!("annotation {id} added")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_layout::{Point, Size};

    fn chart(id: &str, x: f64, y: f64) -> CanvasElement {
        CanvasElement::new(id, ElementKind::Chart, Point::new(x, y), Size::new(400.0, 300.0).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn annotation_avoids_existing_content() {
        let canvas = CanvasState::from_elements([chart("a", 0.0, 0.0), chart("b", 1000.0, 0.0)]);
        let action = Action::AddAnnotation {
            id: "note".into(),
            text: "Revenue peaked in Q3".into(),
            anchor: Some("a".into()),
        };
        let output = AnnotationExecutor::default()
            .execute(&action, &canvas)
            .await
            .unwrap();

        let note = &output.elements[0];
        assert_eq!(note.kind, ElementKind::Annotation);
        assert_eq!(note.title.as_deref(), Some("Revenue peaked in Q3"));
        assert!(!canvas_layout::collides(note.position, note.size, &canvas.element_vec()));
    }

    #[tokio::test]
    async fn missing_anchor_is_an_error() {
        let action = Action::AddAnnotation {
            id: "note".into(),
            text: "x".into(),
            anchor: Some("ghost".into()),
        };
        let err = AnnotationExecutor::default()
            .execute(&action, &CanvasState::new())
            .await
            .unwrap_err();
        assert_eq!(err, ExecutorError::Layout(LayoutError::UnknownElement("ghost".into())));
    }
}
