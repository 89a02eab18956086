//! Grouping configuration

use serde::{Deserialize, Serialize};

/// Tunables for relationship detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Relationships below this strength do not join groups
    pub min_strength: f64,
    /// Field-name fragments treated as time-related
    pub temporal_keywords: Vec<String>,
    /// Strength assigned to temporal relationships
    pub temporal_strength: f64,
    /// Strength assigned to drill-down relationships
    pub drill_down_strength: f64,
    /// Strength assigned to comparison relationships
    pub comparison_strength: f64,
}

impl GroupingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With minimum grouping strength
    #[inline]
    #[must_use]
    pub fn with_min_strength(mut self, min_strength: f64) -> Self {
        self.min_strength = min_strength;
        self
    }

    /// With temporal keyword list
    #[must_use]
    pub fn with_temporal_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.temporal_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_strength: 0.3,
            temporal_keywords: [
                "date", "time", "year", "quarter", "month", "week", "day", "period",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            temporal_strength: 0.5,
            drill_down_strength: 0.8,
            comparison_strength: 1.0,
        }
    }
}
