//! Error types for the canvas pipeline

use crate::action::ActionType;
use canvas_grouping::GroupingError;
use canvas_layout::LayoutError;
use canvas_quota::QuotaError;

/// Why a single action did not succeed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// Quota governor refused or the remote call failed
    #[error(transparent)]
    Quota(#[from] QuotaError),

    /// Result could not be placed on the canvas
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Semantic grouping failed
    #[error("grouping failed: {0}")]
    Grouping(#[from] GroupingError),

    /// Local executor failed
    #[error("executor failed: {0}")]
    Executor(String),

    /// No executor registered for the action type
    #[error("no executor registered for {0}")]
    NoExecutor(ActionType),
}

impl ActionError {
    /// Whether no further remote action can succeed this session
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Quota(q) if q.is_terminal())
    }

    /// Whether retrying later might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Quota(q) if q.is_retryable())
    }
}

/// Failure raised by an executor
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutorError {
    /// Remote provider rate limited the call
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Anything else
    #[error("{0}")]
    Failed(String),

    /// Layout computation failed
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Grouping computation failed
    #[error(transparent)]
    Grouping(#[from] GroupingError),
}

impl ExecutorError {
    /// Action-level error for a local executor failure
    #[must_use]
    pub fn into_action_error(self) -> ActionError {
        match self {
            Self::Layout(e) => ActionError::Layout(e),
            Self::Grouping(e) => ActionError::Grouping(e),
            Self::RateLimited(m) | Self::Failed(m) => ActionError::Executor(m),
        }
    }
}

impl From<ExecutorError> for canvas_quota::RemoteError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::RateLimited(m) => Self::RateLimited(m),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Invalid pipeline configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A setting is malformed or out of range
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        /// Setting or environment variable name
        key: String,
        /// Offending value as text
        value: String,
        /// What was expected
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl ToString, reason: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_quota::RemoteError;

    #[test]
    fn terminal_only_for_daily_quota() {
        let err = ActionError::from(QuotaError::DailyQuotaExceeded { cap: 200 });
        assert!(err.is_terminal());
        assert_eq!(err.to_string(), "daily quota exceeded (200 calls)");
        assert!(!ActionError::NoExecutor(ActionType::Arrange).is_terminal());
        assert!(ActionError::from(QuotaError::RateLimited("slow down".into())).is_retryable());
    }

    #[test]
    fn executor_errors_map_to_remote_errors() {
        assert_eq!(
            RemoteError::from(ExecutorError::RateLimited("429".into())),
            RemoteError::RateLimited("429".into())
        );
        assert_eq!(
            RemoteError::from(ExecutorError::Failed("bad".into())),
            RemoteError::Failed("bad".into())
        );
    }
}
