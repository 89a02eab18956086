//! Canvas Layout
//!
//! Deterministic, collision-free spatial layout for canvas elements.
//!
//! # Core Concepts
//!
//! - [`CanvasElement`]: a placed chart, metric, table or annotation
//! - [`SpatialLayoutEngine`]: analysis, collision checks, arrangement, placement
//! - [`LayoutStrategy`]: grid, hero, flow, comparison, metric-row-plus-body
//! - [`LayoutPlan`]: placements produced by an arrangement pass
//!
//! # Example
//!
//! ```rust
//! use canvas_layout::{ElementKind, ElementSpec, LayoutStrategy, SpatialLayoutEngine};
//!
//! let engine = SpatialLayoutEngine::default();
//! let specs = vec![
//!     ElementSpec::new("revenue", ElementKind::Chart),
//!     ElementSpec::new("cost", ElementKind::Chart),
//! ];
//! let plan = engine.arrange(&specs, LayoutStrategy::Hero, &[]).unwrap();
//! assert!(plan.is_collision_free());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod analysis;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod plan;
pub mod strategy;

pub use analysis::{Cluster, SpatialAnalysis};
pub use config::LayoutConfig;
pub use element::{CanvasElement, ChartFields, ElementId, ElementKind, ElementSpec, SemanticZone};
pub use engine::{collides, SpatialLayoutEngine};
pub use error::LayoutError;
pub use geometry::{Point, Rect, Size};
pub use plan::{LayoutPlan, Placement};
pub use strategy::{FlowAxis, LayoutStrategy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
