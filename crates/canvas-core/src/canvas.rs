//! Canvas state owned by a pipeline run

use crate::executor::ExecutorOutput;
use canvas_layout::{
    collides, CanvasElement, ElementId, LayoutError, Rect, SemanticZone, SpatialLayoutEngine,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Elements and zones currently on the canvas, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    elements: IndexMap<ElementId, CanvasElement>,
    zones: Vec<SemanticZone>,
}

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Newly added elements
    pub inserted: Vec<ElementId>,
    /// Existing elements replaced in place
    pub updated: Vec<ElementId>,
    /// New elements moved off an occupied spot
    pub relocated: Vec<ElementId>,
    /// Zones added or replaced
    pub zones: Vec<String>,
}

impl MergeSummary {
    /// Ids touched by the merge, inserted first
    pub fn touched(&self) -> impl Iterator<Item = &ElementId> {
        self.inserted.iter().chain(self.updated.iter())
    }
}

impl CanvasState {
    /// Empty canvas
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas holding `elements`; later duplicates replace earlier ones
    #[must_use]
    pub fn from_elements(elements: impl IntoIterator<Item = CanvasElement>) -> Self {
        Self {
            elements: elements.into_iter().map(|e| (e.id.clone(), e)).collect(),
            zones: Vec::new(),
        }
    }

    /// Element count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// No elements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element by id
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.get(id)
    }

    /// Elements in insertion order
    pub fn elements(&self) -> impl Iterator<Item = &CanvasElement> {
        self.elements.values()
    }

    /// Owned copy of the elements, for layout calls
    #[must_use]
    pub fn element_vec(&self) -> Vec<CanvasElement> {
        self.elements.values().cloned().collect()
    }

    /// Semantic zones
    #[inline]
    #[must_use]
    pub fn zones(&self) -> &[SemanticZone] {
        &self.zones
    }

    /// Bounding box of all elements
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let rects: Vec<Rect> = self.elements.values().map(CanvasElement::bounds).collect();
        Rect::bounding(&rects)
    }

    /// First pair of overlapping elements, if any
    #[must_use]
    pub fn first_overlap(&self) -> Option<(ElementId, ElementId)> {
        let elements: Vec<&CanvasElement> = self.elements.values().collect();
        for (i, a) in elements.iter().enumerate() {
            for b in &elements[i + 1..] {
                if a.bounds().intersects(&b.bounds()) {
                    return Some((a.id.clone(), b.id.clone()));
                }
            }
        }
        None
    }

    /// Merge an executor result
    ///
    /// Elements upsert by id. A new element landing on occupied space is
    /// moved to the nearest free position. An update that would overlap
    /// another element fails the whole merge and leaves the canvas as it was.
    /// Zones replace any zone with the same label.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Collision`] for an overlapping update.
    pub fn merge(
        &mut self,
        output: &ExecutorOutput,
        engine: &SpatialLayoutEngine,
    ) -> Result<MergeSummary, LayoutError> {
        let mut staged = self.elements.clone();
        let mut summary = MergeSummary::default();

        let (updates, inserts): (Vec<&CanvasElement>, Vec<&CanvasElement>) = output
            .elements
            .iter()
            .partition(|e| staged.contains_key(&e.id));

        for element in &updates {
            staged.insert(element.id.clone(), (*element).clone());
            summary.updated.push(element.id.clone());
        }
        for element in &updates {
            let others: Vec<CanvasElement> = staged
                .values()
                .filter(|other| other.id != element.id)
                .cloned()
                .collect();
            if let Some(hit) = others.iter().find(|o| o.bounds().intersects(&element.bounds())) {
                return Err(LayoutError::Collision {
                    a: element.id.clone(),
                    b: hit.id.clone(),
                });
            }
        }

        for element in inserts {
            let mut element = element.clone();
            let occupied: Vec<CanvasElement> = staged.values().cloned().collect();
            if collides(element.position, element.size, &occupied) {
                let anchor = element.bounds().center();
                let position = engine.find_position_for(element.size, anchor, &occupied);
                warn!(
                    element = %element.id,
                    x = position.x,
                    y = position.y,
                    "new element collided, relocating"
                );
                element.position = position;
                summary.relocated.push(element.id.clone());
            }
            summary.inserted.push(element.id.clone());
            staged.insert(element.id.clone(), element);
        }

        let mut zones = self.zones.clone();
        for zone in &output.zones {
            zones.retain(|z| z.label != zone.label);
            zones.push(zone.clone());
            summary.zones.push(zone.label.clone());
        }

        self.elements = staged;
        self.zones = zones;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_layout::{ElementKind, Point, Size};
    use pretty_assertions::assert_eq;

    fn element(id: &str, x: f64, y: f64) -> CanvasElement {
        CanvasElement::new(
            id,
            ElementKind::Chart,
            Point::new(x, y),
            Size::new(100.0, 100.0).unwrap(),
        )
        .unwrap()
    }

    fn output(elements: Vec<CanvasElement>) -> ExecutorOutput {
        ExecutorOutput::elements(elements)
    }

    #[test]
    fn new_elements_are_relocated_off_occupied_space() {
        let mut canvas = CanvasState::from_elements([element("a", 0.0, 0.0)]);
        let engine = SpatialLayoutEngine::default();
        let summary = canvas
            .merge(&output(vec![element("b", 50.0, 50.0)]), &engine)
            .unwrap();

        assert_eq!(summary.inserted, vec![ElementId::from("b")]);
        assert_eq!(summary.relocated, vec![ElementId::from("b")]);
        assert_eq!(canvas.len(), 2);
        assert!(canvas.first_overlap().is_none());
    }

    #[test]
    fn colliding_update_leaves_canvas_unchanged() {
        let mut canvas =
            CanvasState::from_elements([element("a", 0.0, 0.0), element("b", 200.0, 0.0)]);
        let before = canvas.clone();
        let engine = SpatialLayoutEngine::default();

        let err = canvas
            .merge(&output(vec![element("b", 50.0, 0.0)]), &engine)
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Collision {
                a: "b".into(),
                b: "a".into()
            }
        );
        assert_eq!(canvas, before);
    }

    #[test]
    fn updates_upsert_by_id_and_keep_order() {
        let mut canvas =
            CanvasState::from_elements([element("a", 0.0, 0.0), element("b", 200.0, 0.0)]);
        let engine = SpatialLayoutEngine::default();
        canvas
            .merge(&output(vec![element("a", 0.0, 300.0)]), &engine)
            .unwrap();

        let ids: Vec<&str> = canvas.elements().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(canvas.get(&"a".into()).unwrap().position, Point::new(0.0, 300.0));
    }

    #[test]
    fn zones_replace_by_label_and_skip_collisions() {
        let mut canvas = CanvasState::from_elements([element("a", 0.0, 0.0)]);
        let engine = SpatialLayoutEngine::default();
        let zone = SemanticZone {
            label: "Revenue".into(),
            bounds: Rect::new(-10.0, -10.0, 120.0, 120.0),
            members: vec!["a".into()],
        };
        let out = ExecutorOutput {
            zones: vec![zone.clone(), zone],
            ..ExecutorOutput::default()
        };
        canvas.merge(&out, &engine).unwrap();
        assert_eq!(canvas.zones().len(), 1);
        assert!(canvas.first_overlap().is_none());
    }
}
