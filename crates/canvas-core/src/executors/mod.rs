//! Built-in executors
//!
//! Local actions are pure geometry and grouping over the canvas snapshot.
//! [`SimulatedRemoteExecutor`] stands in for the remote side in dry runs.

mod annotation;
mod arrange;
mod simulated;
mod zone;

pub use annotation::AnnotationExecutor;
pub use arrange::ArrangeExecutor;
pub use simulated::SimulatedRemoteExecutor;
pub use zone::SemanticZoneExecutor;
