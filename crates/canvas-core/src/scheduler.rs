//! Action scheduler
//!
//! Runs a batch of actions against a canvas:
//!
//! - local actions first, then remote actions one at a time through the
//!   [`QuotaGovernor`]; with priority tiers this split applies per tier
//! - every action yields exactly one [`ActionResult`], reported in
//!   submission order
//! - once the daily quota is spent the remaining remote actions are skipped

use crate::action::{Action, ActionType, Tier};
use crate::canvas::CanvasState;
use crate::config::SchedulerConfig;
use crate::error::{ActionError, ExecutorError};
use crate::executor::ExecutorRegistry;
use canvas_layout::{ElementId, SpatialLayoutEngine};
use canvas_quota::{QuotaGovernor, QuotaSnapshot, RemoteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Reason recorded for remote actions skipped after quota exhaustion
pub const DAILY_QUOTA_SKIP_REASON: &str = "daily quota exceeded";

/// Outcome of one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    /// Executed and merged
    Succeeded,
    /// Attempted and failed
    Failed {
        /// Error text
        error: String,
    },
    /// Not attempted
    Skipped {
        /// Why it was not attempted
        reason: String,
    },
}

impl ActionStatus {
    /// Whether the action succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Short label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Result of one submitted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Position in the submitted batch
    pub index: usize,
    /// Action type
    pub action_type: ActionType,
    /// Outcome
    pub status: ActionStatus,
    /// Executor note, if any
    pub message: Option<String>,
    /// Elements added or changed
    pub elements: Vec<ElementId>,
}

/// Progress notification sent after each action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Actions finished so far, including this one
    pub completed: usize,
    /// Actions in the batch
    pub total: usize,
    /// Type of the action just finished
    pub action_type: ActionType,
    /// Its outcome
    pub status: ActionStatus,
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: Ulid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// One result per action, in submission order
    pub results: Vec<ActionResult>,
    /// Quota state after the run
    pub quota: QuotaSnapshot,
}

impl RunReport {
    fn count(&self, label: &str) -> usize {
        self.results.iter().filter(|r| r.status.label() == label).count()
    }

    /// Succeeded actions
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count("succeeded")
    }

    /// Failed actions
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Skipped actions
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    /// Multi-line human-readable summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "run {}: {} actions, {} succeeded, {} failed, {} skipped\n",
            self.run_id,
            self.results.len(),
            self.succeeded(),
            self.failed(),
            self.skipped()
        );
        for result in &self.results {
            let detail = match &result.status {
                ActionStatus::Succeeded => result.message.clone().unwrap_or_default(),
                ActionStatus::Failed { error } => error.clone(),
                ActionStatus::Skipped { reason } => reason.clone(),
            };
            let _ = writeln!(
                out,
                "  #{:<3} {:<18} {:<9} {}",
                result.index,
                result.action_type.as_str(),
                result.status.label(),
                detail
            );
        }
        let _ = write!(
            out,
            "quota: {}/{} calls today, backoff {}ms, circuit {:?}",
            self.quota.calls_today, self.quota.daily_cap, self.quota.backoff_ms, self.quota.circuit
        );
        out
    }
}

/// Runs action batches against a canvas under the quota
#[derive(Debug)]
pub struct ActionScheduler {
    registry: ExecutorRegistry,
    governor: Arc<QuotaGovernor>,
    engine: SpatialLayoutEngine,
    config: SchedulerConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl ActionScheduler {
    /// Scheduler over `registry`, sharing `governor`
    #[must_use]
    pub fn new(registry: ExecutorRegistry, governor: Arc<QuotaGovernor>) -> Self {
        Self {
            registry,
            governor,
            engine: SpatialLayoutEngine::default(),
            config: SchedulerConfig::default(),
            progress: None,
        }
    }

    /// With layout engine used for merging
    #[must_use]
    pub fn with_engine(mut self, engine: SpatialLayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    /// With scheduler options
    #[must_use]
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// With progress sink
    #[must_use]
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Shared governor
    #[must_use]
    pub fn governor(&self) -> &Arc<QuotaGovernor> {
        &self.governor
    }

    /// Execution order as indices into `actions`
    #[must_use]
    pub fn plan_order(&self, actions: &[Action]) -> Vec<usize> {
        let split = |indices: Vec<usize>| -> Vec<usize> {
            let (local, remote): (Vec<usize>, Vec<usize>) =
                indices.into_iter().partition(|&i| !actions[i].is_remote());
            local.into_iter().chain(remote).collect()
        };

        if self.config.priority_tiers {
            Tier::ORDER
                .iter()
                .flat_map(|&tier| {
                    split(
                        (0..actions.len())
                            .filter(|&i| actions[i].tier() == tier)
                            .collect(),
                    )
                })
                .collect()
        } else {
            split((0..actions.len()).collect())
        }
    }

    /// Execute `actions` against `canvas`
    pub async fn run(&self, actions: Vec<Action>, canvas: &mut CanvasState) -> RunReport {
        let run_id = Ulid::new();
        let started_at = Utc::now();
        let total = actions.len();
        info!(%run_id, total, priority_tiers = self.config.priority_tiers, "run started");

        let mut results: Vec<Option<ActionResult>> = vec![None; total];
        let mut quota_exhausted = false;

        for (completed, index) in self.plan_order(&actions).into_iter().enumerate() {
            let action = &actions[index];
            let action_type = action.action_type();

            let result = if action.is_remote() && quota_exhausted {
                ActionResult {
                    index,
                    action_type,
                    status: ActionStatus::Skipped {
                        reason: DAILY_QUOTA_SKIP_REASON.to_string(),
                    },
                    message: None,
                    elements: Vec::new(),
                }
            } else {
                match self.execute_one(action, canvas).await {
                    Ok((message, elements)) => ActionResult {
                        index,
                        action_type,
                        status: ActionStatus::Succeeded,
                        message,
                        elements,
                    },
                    Err(err) if err.is_terminal() => {
                        quota_exhausted = true;
                        ActionResult {
                            index,
                            action_type,
                            status: ActionStatus::Skipped {
                                reason: DAILY_QUOTA_SKIP_REASON.to_string(),
                            },
                            message: None,
                            elements: Vec::new(),
                        }
                    }
                    Err(err) => {
                        warn!(index, %action_type, error = %err, "action failed");
                        ActionResult {
                            index,
                            action_type,
                            status: ActionStatus::Failed {
                                error: err.to_string(),
                            },
                            message: None,
                            elements: Vec::new(),
                        }
                    }
                }
            };

            debug!(index, %action_type, status = result.status.label(), "action finished");
            if let Some(progress) = &self.progress {
                let _ = progress.send(ProgressEvent {
                    completed: completed + 1,
                    total,
                    action_type,
                    status: result.status.clone(),
                });
            }
            results[index] = Some(result);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            results: results.into_iter().flatten().collect(),
            quota: self.governor.snapshot(),
        };
        info!(
            %run_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "run finished"
        );
        report
    }

    /// Run one action and merge its output
    async fn execute_one(
        &self,
        action: &Action,
        canvas: &mut CanvasState,
    ) -> Result<(Option<String>, Vec<ElementId>), ActionError> {
        let action_type = action.action_type();
        let executor = self
            .registry
            .get(action_type)
            .ok_or(ActionError::NoExecutor(action_type))?;

        let output = if action.is_remote() {
            let view: &CanvasState = canvas;
            self.governor
                .execute(action.weight(), || async move {
                    executor
                        .execute(action, view)
                        .await
                        .map_err(RemoteError::from)
                })
                .await?
        } else {
            executor
                .execute(action, canvas)
                .await
                .map_err(ExecutorError::into_action_error)?
        };

        let summary = canvas.merge(&output, &self.engine)?;
        Ok((output.message, summary.touched().cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_quota::QuotaConfig;
    use pretty_assertions::assert_eq;

    fn chart(id: &str) -> Action {
        Action::CreateChart {
            id: id.into(),
            dimensions: vec!["Region".into()],
            measures: vec!["Revenue".into()],
            title: None,
            size: None,
        }
    }

    fn note(id: &str) -> Action {
        Action::AddAnnotation {
            id: id.into(),
            text: "note".into(),
            anchor: None,
        }
    }

    #[test]
    fn locals_are_planned_before_remotes() {
        let scheduler = ActionScheduler::new(
            ExecutorRegistry::new(),
            Arc::new(QuotaGovernor::new(QuotaConfig::unpaced())),
        );
        let actions = vec![chart("a"), note("n1"), chart("b"), note("n2")];
        assert_eq!(scheduler.plan_order(&actions), vec![1, 3, 0, 2]);
        assert!(scheduler.plan_order(&[]).is_empty());
    }

    #[test]
    fn status_serializes_with_tag() {
        let status = ActionStatus::Skipped {
            reason: DAILY_QUOTA_SKIP_REASON.into(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "skipped", "reason": "daily quota exceeded" })
        );
    }

    #[tokio::test]
    async fn unregistered_types_fail_without_touching_the_canvas() {
        let scheduler = ActionScheduler::new(
            ExecutorRegistry::new(),
            Arc::new(QuotaGovernor::new(QuotaConfig::unpaced())),
        );
        let mut canvas = CanvasState::new();
        let report = scheduler.run(vec![chart("a"), note("n")], &mut canvas).await;

        assert_eq!(report.failed(), 2);
        assert!(canvas.is_empty());
        assert_eq!(report.quota.calls_today, 0);
        assert!(report.summary().contains("no executor registered for create_chart"));
    }
}
