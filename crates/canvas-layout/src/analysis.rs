//! Spatial analysis of the current canvas
//!
//! Produces the overall bounding box, a coarse occupancy grid with a density
//! estimate, greedy distance-threshold clusters, and the list of empty regions
//! inside the bounds.
//!
//! Clustering is a single greedy pass in element order: an element joins the
//! first cluster whose centroid lies within the radius, otherwise it starts a
//! new cluster. The result depends on input order.

use crate::config::LayoutConfig;
use crate::element::{CanvasElement, ElementId};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound on grid cells inside the bounds; larger canvases coarsen the grid.
pub const MAX_GRID_CELLS: u64 = 250_000;

/// Group of spatially close elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Members in join order
    pub members: Vec<ElementId>,
    /// Mean of member centres
    pub centroid: Point,
    /// Union of member bounds
    pub bounds: Rect,
}

/// Snapshot analysis of element placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAnalysis {
    /// Bounding box of all elements, `None` on an empty canvas
    pub bounds: Option<Rect>,
    /// Effective grid cell size (coarsened for very large canvases)
    pub cell_size: f64,
    /// Occupied `(column, row)` cells
    pub occupied_cells: BTreeSet<(i64, i64)>,
    /// Cells covering the bounds
    pub total_cells: u64,
    /// Occupied cells / total cells, 0 on an empty canvas
    pub density: f64,
    /// Greedy spatial clusters
    pub clusters: Vec<Cluster>,
    /// Maximal empty cell rectangles inside the bounds, top to bottom
    pub empty_regions: Vec<Rect>,
}

impl SpatialAnalysis {
    fn empty(cell_size: f64) -> Self {
        Self {
            bounds: None,
            cell_size,
            occupied_cells: BTreeSet::new(),
            total_cells: 0,
            density: 0.0,
            clusters: Vec::new(),
            empty_regions: Vec::new(),
        }
    }
}

/// Inclusive cell range along one axis
#[derive(Debug, Clone, Copy)]
struct Span {
    first: i64,
    last: i64,
}

impl Span {
    fn covering(start: f64, end: f64, cell: f64) -> Self {
        // Float-to-int casts saturate, so far-off coordinates clamp to the i64 range.
        let first = (start / cell).floor() as i64;
        let last = ((end / cell).ceil() as i64).saturating_sub(1).max(first);
        Self { first, last }
    }

    fn len(&self) -> u64 {
        u64::try_from(self.last.saturating_sub(self.first)).map_or(u64::MAX, |d| d.saturating_add(1))
    }
}

/// Cells covering `start..end`, counted in floating point so no extent overflows
fn cells_along(start: f64, end: f64, cell: f64) -> f64 {
    ((end / cell).ceil() - (start / cell).floor()).max(1.0)
}

/// Analyse a set of placed elements
#[must_use]
pub fn analyze(elements: &[CanvasElement], config: &LayoutConfig) -> SpatialAnalysis {
    let rects: Vec<Rect> = elements.iter().map(CanvasElement::bounds).collect();
    let Some(bounds) = Rect::bounding(rects.iter()) else {
        return SpatialAnalysis::empty(config.cell_size);
    };

    let cell_size = effective_cell_size(&bounds, config.cell_size);
    let columns = Span::covering(bounds.x, bounds.right(), cell_size);
    let rows = Span::covering(bounds.y, bounds.bottom(), cell_size);
    let total_cells = columns.len().saturating_mul(rows.len());

    let mut occupied_cells = BTreeSet::new();
    for rect in &rects {
        let cols = Span::covering(rect.x, rect.right(), cell_size);
        let rs = Span::covering(rect.y, rect.bottom(), cell_size);
        for col in cols.first..=cols.last {
            for row in rs.first..=rs.last {
                occupied_cells.insert((col, row));
            }
        }
    }

    let density = occupied_cells.len() as f64 / total_cells as f64;
    let empty_regions = empty_regions(&occupied_cells, columns, rows, cell_size);
    let clusters = cluster(elements, config.cluster_radius);

    tracing::debug!(
        elements = elements.len(),
        density,
        clusters = clusters.len(),
        empty_regions = empty_regions.len(),
        "analyzed canvas"
    );

    SpatialAnalysis {
        bounds: Some(bounds),
        cell_size,
        occupied_cells,
        total_cells,
        density,
        clusters,
        empty_regions,
    }
}

fn effective_cell_size(bounds: &Rect, configured: f64) -> f64 {
    let mut cell = if configured.is_finite() && configured > 0.0 {
        configured
    } else {
        LayoutConfig::default().cell_size
    };
    loop {
        let cells = cells_along(bounds.x, bounds.right(), cell)
            * cells_along(bounds.y, bounds.bottom(), cell);
        if cells <= MAX_GRID_CELLS as f64 || !(cell * 2.0).is_finite() {
            return cell;
        }
        cell *= 2.0;
    }
}

/// Merge per-row runs of empty cells into rectangles.
///
/// A run stays open while consecutive rows contain a run with the exact same
/// column span.
fn empty_regions(
    occupied: &BTreeSet<(i64, i64)>,
    columns: Span,
    rows: Span,
    cell: f64,
) -> Vec<Rect> {
    let to_rect = |(c0, c1): (i64, i64), r0: i64, r1: i64| {
        Rect::new(
            c0 as f64 * cell,
            r0 as f64 * cell,
            (c1 - c0 + 1) as f64 * cell,
            (r1 - r0 + 1) as f64 * cell,
        )
    };

    let mut regions: Vec<(i64, i64, Rect)> = Vec::new();
    let mut open: BTreeMap<(i64, i64), i64> = BTreeMap::new();

    for row in rows.first..=rows.last {
        let mut runs = BTreeSet::new();
        let mut run_start = None;
        for col in columns.first..=columns.last {
            let free = !occupied.contains(&(col, row));
            match (free, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    runs.insert((start, col - 1));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.insert((start, columns.last));
        }

        let closed: Vec<(i64, i64)> = open
            .keys()
            .filter(|span| !runs.contains(span))
            .copied()
            .collect();
        for span in closed {
            if let Some(start_row) = open.remove(&span) {
                regions.push((start_row, span.0, to_rect(span, start_row, row - 1)));
            }
        }
        for span in runs {
            open.entry(span).or_insert(row);
        }
    }
    for (span, start_row) in open {
        regions.push((start_row, span.0, to_rect(span, start_row, rows.last)));
    }

    regions.sort_by_key(|&(row, col, _)| (row, col));
    regions.into_iter().map(|(_, _, rect)| rect).collect()
}

fn cluster(elements: &[CanvasElement], radius: f64) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for element in elements {
        let center = element.bounds().center();
        let target = clusters
            .iter_mut()
            .find(|c| c.centroid.distance(&center) <= radius);
        match target {
            Some(cluster) => {
                let n = cluster.members.len() as f64;
                cluster.centroid = Point::new(
                    (cluster.centroid.x * n + center.x) / (n + 1.0),
                    (cluster.centroid.y * n + center.y) / (n + 1.0),
                );
                cluster.bounds = cluster.bounds.union(&element.bounds());
                cluster.members.push(element.id.clone());
            }
            None => clusters.push(Cluster {
                members: vec![element.id.clone()],
                centroid: center,
                bounds: element.bounds(),
            }),
        }
    }
    clusters
}
