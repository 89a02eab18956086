//! Pipeline configuration
//!
//! Defaults are overridden from `CANVAS_*` environment variables by
//! [`PipelineConfig::from_env`].

use crate::error::ConfigError;
use canvas_grouping::GroupingConfig;
use canvas_layout::LayoutConfig;
use canvas_quota::QuotaConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scheduler ordering options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run data, then insight, then presentation actions
    pub priority_tiers: bool,
}

impl SchedulerConfig {
    /// With priority tiers enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_priority_tiers(mut self, enabled: bool) -> Self {
        self.priority_tiers = enabled;
        self
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Quota governor settings
    pub quota: QuotaConfig,
    /// Layout engine settings
    pub layout: LayoutConfig,
    /// Relationship grouping settings
    pub grouping: GroupingConfig,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
}

impl PipelineConfig {
    /// Defaults overridden from the process environment, then validated
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for an unparsable or out-of-range value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`, then validated
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for an unparsable or out-of-range value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CANVAS_*` overrides found through `lookup`
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for an unparsable value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let quota = &mut self.quota;
        set(&lookup, "CANVAS_RPM_CAP", &mut quota.rpm_cap)?;
        set(&lookup, "CANVAS_DAILY_CAP", &mut quota.daily_cap)?;
        set(&lookup, "CANVAS_LIGHT_DELAY_MS", &mut quota.light_delay_ms)?;
        set(&lookup, "CANVAS_MEDIUM_DELAY_MS", &mut quota.medium_delay_ms)?;
        set(&lookup, "CANVAS_HEAVY_DELAY_MS", &mut quota.heavy_delay_ms)?;
        set(&lookup, "CANVAS_JITTER_MAX_MS", &mut quota.jitter_max_ms)?;
        set(&lookup, "CANVAS_BACKOFF_INITIAL_MS", &mut quota.backoff_initial_ms)?;
        set(&lookup, "CANVAS_BACKOFF_MULTIPLIER", &mut quota.backoff_multiplier)?;
        set(&lookup, "CANVAS_BACKOFF_CEILING_MS", &mut quota.backoff_ceiling_ms)?;
        set(&lookup, "CANVAS_FAILURE_THRESHOLD", &mut quota.failure_threshold)?;
        set(&lookup, "CANVAS_COOLDOWN_SECS", &mut quota.cooldown_secs)?;
        set(&lookup, "CANVAS_CELL_SIZE", &mut self.layout.cell_size)?;
        set(&lookup, "CANVAS_CLUSTER_RADIUS", &mut self.layout.cluster_radius)?;
        set(&lookup, "CANVAS_GAP", &mut self.layout.gap)?;
        set(&lookup, "CANVAS_DASHBOARD_WIDTH", &mut self.layout.dashboard_width)?;
        set(&lookup, "CANVAS_HERO_RATIO", &mut self.layout.hero_ratio)?;

        if let Some(raw) = lookup("CANVAS_PRIORITY_TIERS") {
            self.scheduler.priority_tiers = parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid("CANVAS_PRIORITY_TIERS", &raw, "expected a boolean"))?;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quota = &self.quota;
        positive_count("quota.rpm_cap", quota.rpm_cap)?;
        positive_count("quota.daily_cap", quota.daily_cap)?;
        positive_count("quota.failure_threshold", quota.failure_threshold)?;
        positive_count("quota.decay_after_successes", quota.decay_after_successes)?;
        if !(quota.backoff_multiplier.is_finite() && quota.backoff_multiplier >= 1.0) {
            return Err(ConfigError::invalid(
                "quota.backoff_multiplier",
                quota.backoff_multiplier,
                "must be at least 1",
            ));
        }
        if quota.backoff_ceiling_ms < quota.backoff_initial_ms {
            return Err(ConfigError::invalid(
                "quota.backoff_ceiling_ms",
                quota.backoff_ceiling_ms,
                "must not be below backoff_initial_ms",
            ));
        }

        let layout = &self.layout;
        positive_length("layout.cell_size", layout.cell_size)?;
        positive_length("layout.cluster_radius", layout.cluster_radius)?;
        positive_length("layout.dashboard_width", layout.dashboard_width)?;
        positive_length("layout.hero_height", layout.hero_height)?;
        positive_length("layout.pair_height", layout.pair_height)?;
        if !layout.metric_size.is_valid() {
            return Err(ConfigError::invalid(
                "layout.metric_size",
                format!("{}x{}", layout.metric_size.width, layout.metric_size.height),
                "both sides must be positive",
            ));
        }
        for (key, value) in [("layout.gap", layout.gap), ("layout.section_gap", layout.section_gap)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(key, value, "must not be negative"));
            }
        }
        if layout.gap >= layout.dashboard_width {
            return Err(ConfigError::invalid(
                "layout.gap",
                layout.gap,
                "must be narrower than dashboard_width",
            ));
        }
        if !(layout.hero_ratio > 0.0 && layout.hero_ratio < 1.0) {
            return Err(ConfigError::invalid(
                "layout.hero_ratio",
                layout.hero_ratio,
                "must be strictly between 0 and 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.grouping.min_strength) {
            return Err(ConfigError::invalid(
                "grouping.min_strength",
                self.grouping.min_strength,
                "must be within 0..=1",
            ));
        }
        Ok(())
    }
}

fn set<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, &raw, "not a number"))?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn positive_count(key: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::invalid(key, value, "must be greater than zero"));
    }
    Ok(())
}

fn positive_length(key: &str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::invalid(key, value, "must be positive"));
    }
    Ok(())
}
