//! Layout plans
//!
//! A [`LayoutPlan`] is the output of an arrangement pass: one placement per
//! element. Plans are order-independent and applied back onto canvas state by
//! the caller.

use crate::element::{CanvasElement, ElementId};
use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size};
use crate::strategy::LayoutStrategy;
use serde::{Deserialize, Serialize};

/// Position and size assigned to one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Element the placement refers to
    pub element: ElementId,
    /// Assigned top-left corner
    pub position: Point,
    /// Assigned extent
    pub size: Size,
}

impl Placement {
    /// Create placement
    #[inline]
    #[must_use]
    pub fn new(element: ElementId, position: Point, size: Size) -> Self {
        Self {
            element,
            position,
            size,
        }
    }

    /// Occupied rectangle
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

/// Result of arranging a set of elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    /// Strategy that produced the plan
    pub strategy: LayoutStrategy,
    /// One entry per arranged element
    pub placements: Vec<Placement>,
}

impl LayoutPlan {
    /// Create plan
    #[inline]
    #[must_use]
    pub fn new(strategy: LayoutStrategy, placements: Vec<Placement>) -> Self {
        Self {
            strategy,
            placements,
        }
    }

    /// Number of placements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Plan contains no placements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placement for `id`, if any
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.element == id)
    }

    /// Bounding box of all placements
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let rects: Vec<Rect> = self.placements.iter().map(Placement::bounds).collect();
        Rect::bounding(rects.iter())
    }

    /// First pair of overlapping placements, if any
    #[must_use]
    pub fn first_overlap(&self) -> Option<(&ElementId, &ElementId)> {
        for (i, a) in self.placements.iter().enumerate() {
            for b in &self.placements[i + 1..] {
                if a.bounds().intersects(&b.bounds()) {
                    return Some((&a.element, &b.element));
                }
            }
        }
        None
    }

    /// No two placements overlap
    #[inline]
    #[must_use]
    pub fn is_collision_free(&self) -> bool {
        self.first_overlap().is_none()
    }

    /// Write positions and sizes onto matching elements
    ///
    /// # Errors
    /// `LayoutError::UnknownElement` if a placement names an element not in
    /// `elements`; nothing is modified in that case.
    pub fn apply_to(&self, elements: &mut [CanvasElement]) -> Result<(), LayoutError> {
        for placement in &self.placements {
            if !elements.iter().any(|e| e.id == placement.element) {
                return Err(LayoutError::UnknownElement(placement.element.clone()));
            }
        }
        for element in elements.iter_mut() {
            if let Some(placement) = self.get(&element.id) {
                element.position = placement.position;
                element.size = placement.size;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn size(w: f64, h: f64) -> Size {
        Size::new(w, h).unwrap()
    }

    #[test]
    fn detects_overlap() {
        let plan = LayoutPlan::new(
            LayoutStrategy::Hero,
            vec![
                Placement::new("a".into(), Point::new(0.0, 0.0), size(100.0, 100.0)),
                Placement::new("b".into(), Point::new(50.0, 50.0), size(100.0, 100.0)),
            ],
        );
        let (a, b) = plan.first_overlap().unwrap();
        assert_eq!(a.as_str(), "a");
        assert_eq!(b.as_str(), "b");
        assert!(!plan.is_collision_free());
    }

    #[test]
    fn apply_updates_geometry() {
        let mut elements = vec![CanvasElement::new(
            "a",
            ElementKind::Chart,
            Point::default(),
            size(10.0, 10.0),
        )
        .unwrap()];
        let plan = LayoutPlan::new(
            LayoutStrategy::Hero,
            vec![Placement::new(
                "a".into(),
                Point::new(5.0, 6.0),
                size(20.0, 30.0),
            )],
        );
        plan.apply_to(&mut elements).unwrap();
        assert_eq!(elements[0].position, Point::new(5.0, 6.0));
        assert_eq!(elements[0].size, size(20.0, 30.0));
    }

    #[test]
    fn apply_rejects_unknown_element() {
        let mut elements = Vec::new();
        let plan = LayoutPlan::new(
            LayoutStrategy::Hero,
            vec![Placement::new("ghost".into(), Point::default(), size(1.0, 1.0))],
        );
        assert!(matches!(
            plan.apply_to(&mut elements),
            Err(LayoutError::UnknownElement(_))
        ));
    }
}
