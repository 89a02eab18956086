//! Canvas Core
//!
//! Multi-action execution pipeline for an interactive canvas.
//!
//! # Core Concepts
//!
//! - [`Action`]: tagged unit of work with a fixed quota [`canvas_quota::Weight`] and [`Tier`]
//! - [`ExecutorRegistry`]: one [`ActionExecutor`] per [`ActionType`]
//! - [`ActionScheduler`]: locals first, remotes serialized through the quota governor
//! - [`CanvasState`]: elements and zones the run mutates
//! - [`PipelineConfig`]: quota, layout, grouping and scheduler settings
//!
//! # Example
//!
//! ```rust
//! use canvas_core::{Action, ActionScheduler, CanvasState, ExecutorRegistry, PipelineConfig};
//! use canvas_grouping::RelationshipGrouper;
//! use canvas_layout::SpatialLayoutEngine;
//! use canvas_quota::QuotaGovernor;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let config = PipelineConfig::default();
//! let engine = SpatialLayoutEngine::new(config.layout.clone());
//! let registry = ExecutorRegistry::with_builtin(engine, RelationshipGrouper::default());
//! let scheduler = ActionScheduler::new(registry, Arc::new(QuotaGovernor::new(config.quota)));
//!
//! let mut canvas = CanvasState::new();
//! let report = scheduler
//!     .run(
//!         vec![Action::AddAnnotation { id: "note".into(), text: "Hello".into(), anchor: None }],
//!         &mut canvas,
//!     )
//!     .await;
//! assert_eq!(report.succeeded(), 1);
//! assert_eq!(canvas.len(), 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod canvas;
pub mod config;
pub mod error;
pub mod executor;
pub mod executors;
pub mod scheduler;

pub use action::{Action, ActionType, Tier};
pub use canvas::{CanvasState, MergeSummary};
pub use config::{PipelineConfig, SchedulerConfig};
pub use error::{ActionError, ConfigError, ExecutorError};
pub use executor::{ActionExecutor, ExecutorOutput, ExecutorRegistry};
pub use executors::{
    AnnotationExecutor, ArrangeExecutor, SemanticZoneExecutor, SimulatedRemoteExecutor,
};
pub use scheduler::{
    ActionResult, ActionScheduler, ActionStatus, ProgressEvent, RunReport,
    DAILY_QUOTA_SKIP_REASON,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
