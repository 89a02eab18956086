//! Spatial layout engine
//!
//! Entry point for analysis, collision checks, strategy-based arrangement and
//! single-element placement. All operations are pure functions of their
//! inputs and the engine's [`LayoutConfig`].

use crate::analysis::{analyze, SpatialAnalysis};
use crate::config::LayoutConfig;
use crate::element::{CanvasElement, ElementKind, ElementSpec};
use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size};
use crate::plan::LayoutPlan;
use crate::strategy::LayoutStrategy;

/// Standard AABB test of a prospective placement against placed elements
#[must_use]
pub fn collides(position: Point, size: Size, existing: &[CanvasElement]) -> bool {
    let candidate = Rect::from_parts(position, size);
    existing.iter().any(|e| e.bounds().intersects(&candidate))
}

/// Deterministic layout engine
#[derive(Debug, Clone, Default)]
pub struct SpatialLayoutEngine {
    config: LayoutConfig,
}

impl SpatialLayoutEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Bounds, density, clusters and empty regions of `elements`
    #[must_use]
    pub fn analyze(&self, elements: &[CanvasElement]) -> SpatialAnalysis {
        analyze(elements, &self.config)
    }

    /// See [`collides`]
    #[inline]
    #[must_use]
    pub fn collides(&self, position: Point, size: Size, existing: &[CanvasElement]) -> bool {
        collides(position, size, existing)
    }

    /// Arrange `new_elements` with `strategy`, clear of `existing_elements`
    ///
    /// Existing elements that share an id with a new element are treated as
    /// being moved and are ignored for placement. On a canvas with other
    /// content the arrangement starts below the current bounds.
    ///
    /// # Errors
    /// - `LayoutError::EmptyInput` if there is nothing to arrange
    /// - `LayoutError::InvalidSize` for a non-positive size hint
    /// - `LayoutError::Collision` if the plan would overlap anything
    pub fn arrange(
        &self,
        new_elements: &[ElementSpec],
        strategy: LayoutStrategy,
        existing_elements: &[CanvasElement],
    ) -> Result<LayoutPlan, LayoutError> {
        if new_elements.is_empty() {
            return Err(LayoutError::EmptyInput);
        }
        if let Some(bad) = new_elements
            .iter()
            .filter_map(|s| s.size)
            .find(|s| !s.is_valid())
        {
            return Err(LayoutError::InvalidSize {
                width: bad.width,
                height: bad.height,
            });
        }

        let others: Vec<CanvasElement> = existing_elements
            .iter()
            .filter(|e| !new_elements.iter().any(|s| s.id == e.id))
            .cloned()
            .collect();

        let origin = self.arrangement_origin(&others);
        let plan = LayoutPlan::new(strategy, strategy.place(new_elements, origin, &self.config));

        if let Some((a, b)) = plan.first_overlap() {
            return Err(LayoutError::Collision {
                a: a.clone(),
                b: b.clone(),
            });
        }
        for placement in &plan.placements {
            let rect = placement.bounds();
            if let Some(hit) = others.iter().find(|e| e.bounds().intersects(&rect)) {
                return Err(LayoutError::Collision {
                    a: placement.element.clone(),
                    b: hit.id.clone(),
                });
            }
        }

        tracing::debug!(
            strategy = %strategy,
            placed = plan.len(),
            origin_x = origin.x,
            origin_y = origin.y,
            "arranged elements"
        );
        Ok(plan)
    }

    /// Where a new arrangement starts given the remaining content
    #[must_use]
    pub fn arrangement_origin(&self, others: &[CanvasElement]) -> Point {
        let rects: Vec<Rect> = others.iter().map(CanvasElement::bounds).collect();
        match Rect::bounding(rects.iter()) {
            Some(bounds) => Point::new(bounds.x, bounds.bottom() + self.config.section_gap),
            None => self.config.origin,
        }
    }

    /// Centre of the current content, or the configured origin when empty
    #[must_use]
    pub fn canvas_center(&self, elements: &[CanvasElement]) -> Point {
        let rects: Vec<Rect> = elements.iter().map(CanvasElement::bounds).collect();
        Rect::bounding(rects.iter()).map_or(self.config.origin, |b| b.center())
    }

    /// Position for a default-sized element of `kind` near `anchor`
    #[must_use]
    pub fn find_optimal_position(
        &self,
        kind: ElementKind,
        anchor: Point,
        elements: &[CanvasElement],
    ) -> Point {
        self.find_position_for(self.config.default_size(kind), anchor, elements)
    }

    /// Position for an element of `size` near `anchor`
    ///
    /// Scans the empty regions from [`Self::analyze`] for ones large enough,
    /// preferring the candidate closest to `anchor`. Falls back to just right
    /// of the overall bounds when no region fits.
    #[must_use]
    pub fn find_position_for(
        &self,
        size: Size,
        anchor: Point,
        elements: &[CanvasElement],
    ) -> Point {
        let analysis = self.analyze(elements);
        let Some(bounds) = analysis.bounds else {
            return Point::new(anchor.x - size.width / 2.0, anchor.y - size.height / 2.0);
        };

        let mut best: Option<(Point, f64)> = None;
        for region in analysis.empty_regions.iter().filter(|r| r.size().contains(&size)) {
            let position = clamp_into(region, size, anchor);
            let distance = Rect::from_parts(position, size).center().distance(&anchor);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((position, distance));
            }
        }

        match best {
            Some((position, _)) if !collides(position, size, elements) => position,
            _ => {
                tracing::debug!("no empty region fits, placing right of content");
                Point::new(bounds.right() + self.config.gap, bounds.y)
            }
        }
    }
}

/// Top-left corner inside `region` that puts the element centre nearest `anchor`
fn clamp_into(region: &Rect, size: Size, anchor: Point) -> Point {
    let x = (anchor.x - size.width / 2.0).clamp(region.x, region.right() - size.width);
    let y = (anchor.y - size.height / 2.0).clamp(region.y, region.bottom() - size.height);
    Point::new(x, y)
}
