//! Layout strategies
//!
//! Each strategy is a pure function from an ordered list of element specs to
//! placements. Placements are collision-free by construction: every strategy
//! advances by fixed offsets that include the configured gap, so no search is
//! involved and identical inputs always produce identical positions.

use crate::config::LayoutConfig;
use crate::element::{ElementKind, ElementSpec};
use crate::geometry::{Point, Size};
use crate::plan::Placement;
use serde::{Deserialize, Serialize};

/// Axis for the flow strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowAxis {
    /// Left to right
    #[default]
    Horizontal,
    /// Top to bottom
    Vertical,
}

/// Named arrangement algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum LayoutStrategy {
    /// Row-major grid with a fixed column count
    Grid {
        /// Column count; derived from element count when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<usize>,
    },
    /// Large lead element with a secondary beside it and pairs below
    Hero,
    /// Single unwrapped sequence along one axis
    Flow {
        /// Sequence direction
        #[serde(default)]
        axis: FlowAxis,
    },
    /// Equal-width pairs side by side
    Comparison,
    /// Metric cards in a row, remaining elements in a hero arrangement below
    MetricRowPlusBody,
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::Grid { columns: None }
    }
}

impl LayoutStrategy {
    /// Parse a strategy name, `None` if unrecognised
    ///
    /// Matching ignores case and treats `_` and spaces like `-`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace(['_', ' '], "-");
        let strategy = match normalized.as_str() {
            "grid" => Self::Grid { columns: None },
            "hero" | "hero-emphasis" => Self::Hero,
            "flow" | "flow-horizontal" | "horizontal" => Self::Flow {
                axis: FlowAxis::Horizontal,
            },
            "flow-vertical" | "vertical" => Self::Flow {
                axis: FlowAxis::Vertical,
            },
            "comparison" | "side-by-side" => Self::Comparison,
            "metric-row-plus-body" | "kpi-dashboard" | "metrics" => Self::MetricRowPlusBody,
            _ => return None,
        };
        Some(strategy)
    }

    /// Parse a strategy name, falling back to `grid` when unrecognised
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(strategy = name, "unknown layout strategy, falling back to grid");
            Self::default()
        })
    }

    /// Canonical name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grid { .. } => "grid",
            Self::Hero => "hero",
            Self::Flow {
                axis: FlowAxis::Horizontal,
            } => "flow-horizontal",
            Self::Flow {
                axis: FlowAxis::Vertical,
            } => "flow-vertical",
            Self::Comparison => "comparison",
            Self::MetricRowPlusBody => "metric-row-plus-body",
        }
    }

    /// Compute placements starting at `origin`
    #[must_use]
    pub fn place(
        &self,
        specs: &[ElementSpec],
        origin: Point,
        config: &LayoutConfig,
    ) -> Vec<Placement> {
        match *self {
            Self::Grid { columns } => grid(specs, columns, origin, config),
            Self::Hero => hero(specs, origin, config),
            Self::Flow { axis } => flow(specs, axis, origin, config),
            Self::Comparison => comparison(specs, origin, config),
            Self::MetricRowPlusBody => metric_row_plus_body(specs, origin, config),
        }
    }
}

impl std::fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn resolved_size(spec: &ElementSpec, config: &LayoutConfig) -> Size {
    spec.size
        .filter(Size::is_valid)
        .unwrap_or_else(|| config.default_size(spec.kind))
}

fn default_columns(count: usize) -> usize {
    ((count as f64).sqrt().ceil() as usize).max(1)
}

fn grid(
    specs: &[ElementSpec],
    columns: Option<usize>,
    origin: Point,
    config: &LayoutConfig,
) -> Vec<Placement> {
    let columns = columns
        .filter(|&c| c > 0)
        .unwrap_or_else(|| default_columns(specs.len()));
    let sizes: Vec<Size> = specs.iter().map(|s| resolved_size(s, config)).collect();
    let cell_width = sizes.iter().map(|s| s.width).fold(0.0, f64::max);

    let mut placements = Vec::with_capacity(specs.len());
    let mut y = origin.y;
    for (row_specs, row_sizes) in specs.chunks(columns).zip(sizes.chunks(columns)) {
        let row_height = row_sizes.iter().map(|s| s.height).fold(0.0, f64::max);
        for (col, (spec, size)) in row_specs.iter().zip(row_sizes).enumerate() {
            let x = origin.x + col as f64 * (cell_width + config.gap);
            placements.push(Placement::new(spec.id.clone(), Point::new(x, y), *size));
        }
        y += row_height + config.gap;
    }
    placements
}

fn hero(specs: &[ElementSpec], origin: Point, config: &LayoutConfig) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(specs.len());
    let Some((lead, rest)) = specs.split_first() else {
        return placements;
    };

    let width = config.dashboard_width;
    let ratio = config.hero_ratio.clamp(0.05, 0.95);
    let hero_width = width * ratio;
    placements.push(Placement::new(
        lead.id.clone(),
        origin,
        Size {
            width: hero_width,
            height: config.hero_height,
        },
    ));

    let Some((secondary, rest)) = rest.split_first() else {
        return placements;
    };
    placements.push(Placement::new(
        secondary.id.clone(),
        Point::new(origin.x + hero_width + config.gap, origin.y),
        Size {
            width: width - hero_width,
            height: config.hero_height,
        },
    ));

    let slot_width = (width - config.gap) / 2.0;
    let slot = Size {
        width: slot_width,
        height: config.pair_height,
    };
    let body_top = origin.y + config.hero_height + config.gap;
    for (row, pair) in rest.chunks(2).enumerate() {
        let y = body_top + row as f64 * (config.pair_height + config.gap);
        for (col, spec) in pair.iter().enumerate() {
            let x = origin.x + col as f64 * (slot_width + config.gap);
            placements.push(Placement::new(spec.id.clone(), Point::new(x, y), slot));
        }
    }
    placements
}

fn flow(
    specs: &[ElementSpec],
    axis: FlowAxis,
    origin: Point,
    config: &LayoutConfig,
) -> Vec<Placement> {
    let mut cursor = origin;
    specs
        .iter()
        .map(|spec| {
            let size = resolved_size(spec, config);
            let placement = Placement::new(spec.id.clone(), cursor, size);
            match axis {
                FlowAxis::Horizontal => cursor.x += size.width + config.gap,
                FlowAxis::Vertical => cursor.y += size.height + config.gap,
            }
            placement
        })
        .collect()
}

fn comparison(specs: &[ElementSpec], origin: Point, config: &LayoutConfig) -> Vec<Placement> {
    let slot_width = (config.dashboard_width - config.gap) / 2.0;
    let mut placements = Vec::with_capacity(specs.len());
    let mut y = origin.y;
    for pair in specs.chunks(2) {
        let height = pair
            .iter()
            .map(|s| resolved_size(s, config).height)
            .fold(0.0, f64::max);
        let size = Size {
            width: slot_width,
            height,
        };
        for (col, spec) in pair.iter().enumerate() {
            let x = origin.x + col as f64 * (slot_width + config.gap);
            placements.push(Placement::new(spec.id.clone(), Point::new(x, y), size));
        }
        y += height + config.gap;
    }
    placements
}

fn metric_row_plus_body(
    specs: &[ElementSpec],
    origin: Point,
    config: &LayoutConfig,
) -> Vec<Placement> {
    let (metrics, body): (Vec<ElementSpec>, Vec<ElementSpec>) = specs
        .iter()
        .cloned()
        .partition(|s| s.kind == ElementKind::Metric);

    let metric = config.metric_size;
    let mut placements: Vec<Placement> = metrics
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let x = origin.x + i as f64 * (metric.width + config.gap);
            Placement::new(spec.id.clone(), Point::new(x, origin.y), metric)
        })
        .collect();

    let body_origin = if metrics.is_empty() {
        origin
    } else {
        Point::new(origin.x, origin.y + metric.height + config.gap)
    };
    placements.extend(hero(&body, body_origin, config));
    placements
}
