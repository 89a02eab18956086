//! Structural relationship detection
//!
//! Pairs of chart-like elements are compared by their dimension and measure
//! names (case-insensitive). A pair may carry more than one relationship.

use crate::config::GroupingConfig;
use canvas_layout::{CanvasElement, ChartFields, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of inferred relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// Shared field names
    FieldOverlap,
    /// Both elements carry a time-related field
    Temporal,
    /// Same measures over different categories, or the reverse
    Comparison,
    /// Same measures, one category set refines the other
    DrillDown,
}

/// Inferred relationship between two elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Earlier element in input order
    pub source: ElementId,
    /// Later element in input order
    pub target: ElementId,
    /// Relationship kind
    pub kind: RelationshipKind,
    /// Strength in `0.0..=1.0`
    pub strength: f64,
    /// Field names behind the relationship (lowercased)
    pub shared_fields: Vec<String>,
}

impl Relationship {
    /// Whether the relationship is strong enough to group on
    #[inline]
    #[must_use]
    pub fn is_strong(&self, min_strength: f64) -> bool {
        self.strength >= min_strength
    }

    /// Whether the relationship links `a` and `b` in either direction
    #[must_use]
    pub fn connects(&self, a: &ElementId, b: &ElementId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

/// Lowercased field sets of one element
#[derive(Debug)]
struct FieldSets {
    dimensions: BTreeSet<String>,
    measures: BTreeSet<String>,
}

impl FieldSets {
    fn of(fields: &ChartFields) -> Self {
        let normalize = |items: &[String]| -> BTreeSet<String> {
            items
                .iter()
                .map(|f| f.trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect()
        };
        Self {
            dimensions: normalize(fields.dimensions.as_slice()),
            measures: normalize(fields.measures.as_slice()),
        }
    }

    fn all(&self) -> BTreeSet<String> {
        self.dimensions.union(&self.measures).cloned().collect()
    }
}

/// Whether any field contains one of the temporal keywords
#[must_use]
pub fn is_temporal(fields: &ChartFields, keywords: &[String]) -> bool {
    fields.all().any(|field| {
        let field = field.to_lowercase();
        keywords.iter().any(|k| field.contains(&k.to_lowercase()))
    })
}

/// Detect pairwise relationships among elements that carry fields
#[must_use]
pub fn detect_relationships(
    elements: &[CanvasElement],
    config: &GroupingConfig,
) -> Vec<Relationship> {
    let candidates: Vec<(&CanvasElement, &ChartFields)> = elements
        .iter()
        .filter_map(|e| e.fields.as_ref().filter(|f| !f.is_empty()).map(|f| (e, f)))
        .collect();

    let mut relationships = Vec::new();
    for (i, (a, a_fields)) in candidates.iter().enumerate() {
        for (b, b_fields) in &candidates[i + 1..] {
            relationships.extend(relate(a, a_fields, b, b_fields, config));
        }
    }

    tracing::debug!(
        elements = candidates.len(),
        relationships = relationships.len(),
        "detected relationships"
    );
    relationships
}

fn relate(
    a: &CanvasElement,
    a_fields: &ChartFields,
    b: &CanvasElement,
    b_fields: &ChartFields,
    config: &GroupingConfig,
) -> Vec<Relationship> {
    let sa = FieldSets::of(a_fields);
    let sb = FieldSets::of(b_fields);
    let make = |kind, strength, shared_fields| Relationship {
        source: a.id.clone(),
        target: b.id.clone(),
        kind,
        strength,
        shared_fields,
    };
    let mut found = Vec::new();

    let all_a = sa.all();
    let all_b = sb.all();
    let shared: Vec<String> = all_a.intersection(&all_b).cloned().collect();
    if !shared.is_empty() {
        let union = all_a.union(&all_b).count();
        let strength = shared.len() as f64 / union as f64;
        found.push(make(RelationshipKind::FieldOverlap, strength, shared));
    }

    if is_temporal(a_fields, &config.temporal_keywords)
        && is_temporal(b_fields, &config.temporal_keywords)
    {
        let temporal: Vec<String> = all_a
            .iter()
            .chain(all_b.iter())
            .filter(|f| config.temporal_keywords.iter().any(|k| f.contains(&k.to_lowercase())))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        found.push(make(
            RelationshipKind::Temporal,
            config.temporal_strength,
            temporal,
        ));
    }

    let same_measures = !sa.measures.is_empty() && sa.measures == sb.measures;
    let same_dimensions = !sa.dimensions.is_empty() && sa.dimensions == sb.dimensions;
    let drill_down = same_measures
        && sa.dimensions != sb.dimensions
        && (sa.dimensions.is_subset(&sb.dimensions) || sb.dimensions.is_subset(&sa.dimensions));

    if drill_down {
        found.push(make(
            RelationshipKind::DrillDown,
            config.drill_down_strength,
            sa.measures.iter().cloned().collect(),
        ));
    } else if same_measures && sa.dimensions != sb.dimensions {
        found.push(make(
            RelationshipKind::Comparison,
            config.comparison_strength,
            sa.measures.iter().cloned().collect(),
        ));
    } else if same_dimensions && sa.measures != sb.measures {
        found.push(make(
            RelationshipKind::Comparison,
            config.comparison_strength,
            sa.dimensions.iter().cloned().collect(),
        ));
    }

    found
}
