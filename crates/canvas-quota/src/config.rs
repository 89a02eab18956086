//! Quota configuration

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cost class of an action against the remote quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    /// Purely local, never touches the quota
    Local,
    /// Cheap remote call
    Light,
    /// Moderate remote call
    Medium,
    /// Expensive remote call
    Heavy,
}

impl Weight {
    /// Whether the action needs the remote quota
    #[inline]
    #[must_use]
    pub fn is_remote(self) -> bool {
        self != Self::Local
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Governor limits and pacing
///
/// Durations are stored in milliseconds (seconds for the cooldown) so the
/// serialized form matches the environment overrides one to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Soft cap on successful calls per minute window
    pub rpm_cap: u32,
    /// Hard cap on successful calls per quota day
    pub daily_cap: u32,
    /// Base delay before a light call
    pub light_delay_ms: u64,
    /// Base delay before a medium call
    pub medium_delay_ms: u64,
    /// Base delay before a heavy call
    pub heavy_delay_ms: u64,
    /// Upper bound of the uniform jitter added to remote delays
    pub jitter_max_ms: u64,
    /// Backoff applied after the first rate limit
    pub backoff_initial_ms: u64,
    /// Backoff growth factor per further rate limit
    pub backoff_multiplier: f64,
    /// Backoff ceiling
    pub backoff_ceiling_ms: u64,
    /// Consecutive successes that halve the backoff
    pub decay_after_successes: u32,
    /// Consecutive rate limits that open the circuit
    pub failure_threshold: u32,
    /// Time the circuit stays open
    pub cooldown_secs: u64,
    /// UTC offset in hours at which the provider's quota day starts
    pub day_offset_hours: i32,
    /// Seed for jitter; entropy when absent
    pub jitter_seed: Option<u64>,
}

impl QuotaConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With per-minute cap
    #[inline]
    #[must_use]
    pub fn with_rpm_cap(mut self, cap: u32) -> Self {
        self.rpm_cap = cap;
        self
    }

    /// With daily cap
    #[inline]
    #[must_use]
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.daily_cap = cap;
        self
    }

    /// With light/medium/heavy base delays
    #[inline]
    #[must_use]
    pub fn with_delays(mut self, light_ms: u64, medium_ms: u64, heavy_ms: u64) -> Self {
        self.light_delay_ms = light_ms;
        self.medium_delay_ms = medium_ms;
        self.heavy_delay_ms = heavy_ms;
        self
    }

    /// With jitter bound
    #[inline]
    #[must_use]
    pub fn with_jitter_max_ms(mut self, ms: u64) -> Self {
        self.jitter_max_ms = ms;
        self
    }

    /// With fixed jitter seed
    #[inline]
    #[must_use]
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// With failure threshold
    #[inline]
    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// With circuit cooldown
    #[inline]
    #[must_use]
    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Configuration without any pacing delay, for tests and dry runs
    #[must_use]
    pub fn unpaced() -> Self {
        Self::default().with_delays(0, 0, 0).with_jitter_max_ms(0)
    }

    /// Base delay for `weight`, zero for local work
    #[must_use]
    pub fn base_delay(&self, weight: Weight) -> Duration {
        Duration::from_millis(match weight {
            Weight::Local => 0,
            Weight::Light => self.light_delay_ms,
            Weight::Medium => self.medium_delay_ms,
            Weight::Heavy => self.heavy_delay_ms,
        })
    }

    /// Initial backoff
    #[inline]
    #[must_use]
    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    /// Backoff ceiling
    #[inline]
    #[must_use]
    pub fn backoff_ceiling(&self) -> Duration {
        Duration::from_millis(self.backoff_ceiling_ms)
    }

    /// Circuit cooldown
    #[inline]
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Offset anchoring the quota day; UTC when out of range
    #[must_use]
    pub fn day_offset(&self) -> FixedOffset {
        self.day_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            rpm_cap: 10,
            daily_cap: 200,
            light_delay_ms: 1000,
            medium_delay_ms: 2000,
            heavy_delay_ms: 4000,
            jitter_max_ms: 500,
            backoff_initial_ms: 1000,
            backoff_multiplier: 2.0,
            backoff_ceiling_ms: 30_000,
            decay_after_successes: 5,
            failure_threshold: 3,
            cooldown_secs: 60,
            day_offset_hours: -8,
            jitter_seed: None,
        }
    }
}
