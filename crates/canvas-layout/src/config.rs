//! Layout configuration

use crate::element::ElementKind;
use crate::geometry::{Point, Size};
use serde::{Deserialize, Serialize};

/// Tunables for spatial analysis and arrangement strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between neighbouring placements
    pub gap: f64,
    /// Vertical gap between existing content and a new arrangement
    pub section_gap: f64,
    /// Row width used by hero and comparison strategies
    pub dashboard_width: f64,
    /// Fraction of the row taken by the hero element
    pub hero_ratio: f64,
    /// Height of the hero row
    pub hero_height: f64,
    /// Height of each paired row below the hero
    pub pair_height: f64,
    /// Fixed size of metric cards in the metric row
    pub metric_size: Size,
    /// Where arrangements start on an empty canvas
    pub origin: Point,
    /// Occupancy grid cell size for density analysis
    pub cell_size: f64,
    /// Centroid distance under which elements join a cluster
    pub cluster_radius: f64,
}

impl LayoutConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With gap
    #[inline]
    #[must_use]
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// With dashboard width
    #[inline]
    #[must_use]
    pub fn with_dashboard_width(mut self, width: f64) -> Self {
        self.dashboard_width = width;
        self
    }

    /// With grid cell size
    #[inline]
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// With cluster radius
    #[inline]
    #[must_use]
    pub fn with_cluster_radius(mut self, radius: f64) -> Self {
        self.cluster_radius = radius;
        self
    }

    /// Default size for an element of `kind`
    #[must_use]
    pub fn default_size(&self, kind: ElementKind) -> Size {
        match kind {
            ElementKind::Chart => Size {
                width: 400.0,
                height: 300.0,
            },
            ElementKind::Metric => self.metric_size,
            ElementKind::Table => Size {
                width: 500.0,
                height: 300.0,
            },
            ElementKind::Annotation => Size {
                width: 300.0,
                height: 120.0,
            },
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: 20.0,
            section_gap: 40.0,
            dashboard_width: 1200.0,
            hero_ratio: 0.75,
            hero_height: 400.0,
            pair_height: 300.0,
            metric_size: Size {
                width: 200.0,
                height: 100.0,
            },
            origin: Point::default(),
            cell_size: 100.0,
            cluster_radius: 900.0,
        }
    }
}
