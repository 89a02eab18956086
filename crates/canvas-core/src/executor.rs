//! Executor trait and registry
//!
//! Every [`ActionType`] is served by one [`ActionExecutor`]. Local types
//! get the built-in executors from [`crate::executors`]; remote types are
//! registered by the embedding application.

use crate::action::{Action, ActionType};
use crate::canvas::CanvasState;
use crate::error::ExecutorError;
use crate::executors::{AnnotationExecutor, ArrangeExecutor, SemanticZoneExecutor};
use async_trait::async_trait;
use canvas_grouping::RelationshipGrouper;
use canvas_layout::{CanvasElement, SemanticZone, SpatialLayoutEngine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What an executor hands back for merging into the canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorOutput {
    /// New or updated elements
    pub elements: Vec<CanvasElement>,
    /// New or replaced zones
    pub zones: Vec<SemanticZone>,
    /// Human-readable note for the report
    pub message: Option<String>,
}

impl ExecutorOutput {
    /// Output carrying only elements
    #[must_use]
    pub fn elements(elements: Vec<CanvasElement>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// With report message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Handler for one kind of action
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run `action` against a read-only view of the canvas
    async fn execute(
        &self,
        action: &Action,
        canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError>;
}

/// Action type to executor map
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<ActionType, Arc<dyn ActionExecutor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&ActionType> = self.executors.keys().collect();
        types.sort();
        f.debug_struct("ExecutorRegistry")
            .field("types", &types)
            .finish()
    }
}

impl ExecutorRegistry {
    /// Empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the local executors installed
    #[must_use]
    pub fn with_builtin(engine: SpatialLayoutEngine, grouper: RelationshipGrouper) -> Self {
        Self::new()
            .with(
                ActionType::AddAnnotation,
                AnnotationExecutor::new(engine.clone()),
            )
            .with(
                ActionType::Arrange,
                ArrangeExecutor::new(engine.clone(), grouper.clone()),
            )
            .with(
                ActionType::GroupSemantic,
                SemanticZoneExecutor::new(grouper, engine.config().section_gap / 2.0),
            )
    }

    /// With `executor` serving `action_type`, replacing any previous one
    #[must_use]
    pub fn with(mut self, action_type: ActionType, executor: impl ActionExecutor + 'static) -> Self {
        self.register(action_type, Arc::new(executor));
        self
    }

    /// Serve `action_type` with a shared executor
    pub fn register(&mut self, action_type: ActionType, executor: Arc<dyn ActionExecutor>) {
        self.executors.insert(action_type, executor);
    }

    /// Executor for `action_type`
    #[must_use]
    pub fn get(&self, action_type: ActionType) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(&action_type).cloned()
    }

    /// Whether `action_type` has an executor
    #[must_use]
    pub fn contains(&self, action_type: ActionType) -> bool {
        self.executors.contains_key(&action_type)
    }
}
