//! Error types for quota governance

use std::time::Duration;

/// Failure reported by a remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Provider signalled a rate limit or exhausted quota
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Governor outcome other than success
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    /// Circuit is open; the remote call was not attempted
    #[error("circuit open, retry after {}s", .retry_after.as_secs_f64().ceil())]
    CircuitOpen {
        /// Remaining cooldown
        retry_after: Duration,
    },

    /// Remote call was rate limited
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Daily cap reached; terminal for the session
    #[error("daily quota exceeded ({cap} calls)")]
    DailyQuotaExceeded {
        /// Configured daily cap
        cap: u32,
    },

    /// Remote call failed for another reason
    #[error("remote call failed: {0}")]
    Remote(String),
}

impl QuotaError {
    /// Whether the same call may succeed later in this session
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. } | Self::RateLimited(_))
    }

    /// Whether no further remote call can succeed this session
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DailyQuotaExceeded { .. })
    }
}
