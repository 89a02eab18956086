//! Offline stand-in for the remote executor, used by dry runs
//!
//! Drafts the element an action would create and can answer every n-th call
//! with a rate limit.

use crate::action::Action;
use crate::canvas::CanvasState;
use crate::error::ExecutorError;
use crate::executor::{ActionExecutor, ExecutorOutput};
use async_trait::async_trait;
use canvas_layout::LayoutConfig;
use std::sync::atomic::{AtomicU64, Ordering};

/// Offline stand-in for the remote content generator
///
/// Produces the draft element for each creating action and answers every
/// `rate_limit_every`-th call with a rate limit.
#[derive(Debug, Default)]
pub struct SimulatedRemoteExecutor {
    layout: LayoutConfig,
    rate_limit_every: Option<u64>,
    calls: AtomicU64,
}

impl SimulatedRemoteExecutor {
    /// Executor sizing drafts with `layout`
    #[must_use]
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            rate_limit_every: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Rate limit every `n`-th call; zero disables
    #[must_use]
    pub fn with_rate_limit_every(mut self, n: u64) -> Self {
        self.rate_limit_every = (n > 0).then_some(n);
        self
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionExecutor for SimulatedRemoteExecutor {
    async fn execute(
        &self,
        action: &Action,
        canvas: &CanvasState,
    ) -> Result<ExecutorOutput, ExecutorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.rate_limit_every.is_some_and(|n| call % n == 0) {
            return Err(ExecutorError::RateLimited(format!(
                "simulated rate limit on call {call}"
            )));
        }

        if let Action::GenerateInsights { chart, .. } = action {
            if canvas.get(chart).is_none() {
                return Err(ExecutorError::Failed(format!("unknown chart {chart}")));
            }
        }

        let element = action.draft_element(&self.layout)?.ok_or_else(|| {
            ExecutorError::Failed(format!("{} creates no element", action.action_type()))
        })?;
        let message = format!("{} {}", action.action_type(), element.id);
        Ok(ExecutorOutput::elements(vec![element]).with_message(message))
    }
}
