//! Keyword-based semantic grouping
//!
//! An approximation of criterion-driven grouping: the criterion phrase picks a
//! keyword table, then every element is scored against each label of that
//! table by the keywords found in its field names and title. Elements with no
//! hits, or criteria no table recognises, land in the "Other" bucket.

use crate::error::GroupingError;
use crate::title::display_title;
use canvas_layout::{CanvasElement, ElementId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label for elements no keyword matched
pub const OTHER_LABEL: &str = "Other";

/// How a semantic grouping is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMethod {
    /// Keyword tables, always available
    #[default]
    Heuristic,
    /// Reserved for an external model; not implemented here
    ModelAssisted,
}

/// Labelled set of elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket label
    pub label: String,
    /// Members in input order
    pub members: Vec<ElementId>,
}

impl Bucket {
    /// Whether the bucket collects unmatched elements
    #[inline]
    #[must_use]
    pub fn is_other(&self) -> bool {
        self.label == OTHER_LABEL
    }
}

/// Result of a semantic grouping pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticGrouping {
    /// Method that produced the buckets
    pub method: GroupingMethod,
    /// Criterion phrase as given
    pub criterion: String,
    /// Non-empty buckets in table order, "Other" last
    pub buckets: Vec<Bucket>,
}

impl SemanticGrouping {
    /// Bucket holding `id`, if any
    #[must_use]
    pub fn bucket_of(&self, id: &ElementId) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.members.contains(id))
    }
}

struct Label {
    name: &'static str,
    keywords: Vec<Regex>,
}

struct KeywordTable {
    triggers: Vec<Regex>,
    labels: Vec<Label>,
}

fn word(keyword: &str) -> Regex {
    // Keywords are escaped constants; the pattern is always valid.
    Regex::new(&format!(r"(?i)\b{}s?\b", regex::escape(keyword)))
        .expect("escaped keyword pattern compiles")
}

fn table(triggers: &[&str], labels: &[(&'static str, &[&str])]) -> KeywordTable {
    KeywordTable {
        triggers: triggers.iter().copied().map(word).collect(),
        labels: labels
            .iter()
            .map(|&(name, keywords)| Label {
                name,
                keywords: keywords.iter().copied().map(word).collect(),
            })
            .collect(),
    }
}

const AWARENESS: &[&str] = &["awareness", "impression", "view", "visit", "traffic", "reach"];
const CONSIDERATION: &[&str] = &[
    "consideration", "click", "engagement", "lead", "signup", "trial", "cart",
];
const CONVERSION: &[&str] = &["conversion", "purchase", "order", "checkout", "sale"];

const NORTH_AMERICA: &[&str] = &["north america", "usa", "united states", "canada", "mexico"];
const EUROPE: &[&str] = &["europe", "emea", "uk", "germany", "france", "spain"];
const ASIA_PACIFIC: &[&str] = &["asia", "apac", "pacific", "china", "japan", "india", "australia"];
const LATIN_AMERICA: &[&str] = &["latin america", "latam", "south america", "brazil", "argentina"];

const REVENUE: &[&str] = &["revenue", "sale", "income", "turnover"];
const COST: &[&str] = &["cost", "expense", "spend", "cogs"];
const PROFITABILITY: &[&str] = &["profit", "margin", "roi", "earning"];

const OVER_TIME: &[&str] = &["date", "time", "year", "quarter", "month", "week", "day", "period"];

static TABLES: Lazy<Vec<KeywordTable>> = Lazy::new(|| {
    vec![
        table(
            &["funnel", "stage", "journey"],
            &[
                ("Awareness", AWARENESS),
                ("Consideration", CONSIDERATION),
                ("Conversion", CONVERSION),
            ],
        ),
        table(
            &["region", "regional", "geography", "geographic", "location", "country"],
            &[
                ("North America", NORTH_AMERICA),
                ("Europe", EUROPE),
                ("Asia Pacific", ASIA_PACIFIC),
                ("Latin America", LATIN_AMERICA),
            ],
        ),
        table(
            &["revenue", "cost", "financial", "finance", "profit"],
            &[
                ("Revenue", REVENUE),
                ("Cost", COST),
                ("Profitability", PROFITABILITY),
            ],
        ),
        table(
            &["time", "trend", "temporal", "over time"],
            &[("Over Time", OVER_TIME)],
        ),
    ]
});

/// Keyword-table grouper
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGrouper;

impl HeuristicGrouper {
    /// Create grouper
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Bucket `elements` by `criterion`
    ///
    /// # Errors
    ///
    /// Returns [`GroupingError::EmptyCriterion`] for a blank criterion.
    pub fn group(
        &self,
        criterion: &str,
        elements: &[CanvasElement],
    ) -> Result<SemanticGrouping, GroupingError> {
        let trimmed = criterion.trim();
        if trimmed.is_empty() {
            return Err(GroupingError::EmptyCriterion);
        }

        let table = TABLES
            .iter()
            .find(|t| t.triggers.iter().any(|re| re.is_match(trimmed)));

        let mut buckets: Vec<Bucket> = table
            .map(|t| {
                t.labels
                    .iter()
                    .map(|l| Bucket {
                        label: l.name.to_string(),
                        members: Vec::new(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut other = Bucket {
            label: OTHER_LABEL.to_string(),
            members: Vec::new(),
        };

        for element in elements {
            match table.and_then(|t| best_label(t, element)) {
                Some(index) => buckets[index].members.push(element.id.clone()),
                None => other.members.push(element.id.clone()),
            }
        }

        if table.is_none() {
            tracing::debug!(criterion = trimmed, "no keyword table for criterion");
        }

        buckets.push(other);
        buckets.retain(|b| !b.members.is_empty());
        Ok(SemanticGrouping {
            method: GroupingMethod::Heuristic,
            criterion: trimmed.to_string(),
            buckets,
        })
    }
}

/// Index of the highest-scoring label; ties keep the earlier label
fn best_label(table: &KeywordTable, element: &CanvasElement) -> Option<usize> {
    let mut text: Vec<String> = element
        .fields
        .as_ref()
        .map(|f| f.all().map(str::to_string).collect())
        .unwrap_or_default();
    text.extend(display_title(element));
    let text = text.join(" | ");

    let mut best: Option<(usize, usize)> = None;
    for (index, label) in table.labels.iter().enumerate() {
        let score = label.keywords.iter().filter(|re| re.is_match(&text)).count();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}
