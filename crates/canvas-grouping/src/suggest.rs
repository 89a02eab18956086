//! Layout strategy suggestion

use crate::relationship::{Relationship, RelationshipKind};
use canvas_layout::{CanvasElement, ElementKind, FlowAxis, LayoutStrategy};
use serde::{Deserialize, Serialize};

/// Suggested strategy with a human-readable reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySuggestion {
    /// Strategy to arrange with
    pub strategy: LayoutStrategy,
    /// Why the strategy was chosen
    pub reason: String,
}

impl StrategySuggestion {
    fn new(strategy: LayoutStrategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            reason: reason.into(),
        }
    }
}

/// Pick a strategy for `elements`; the first matching rule wins
#[must_use]
pub fn suggest_strategy(
    elements: &[CanvasElement],
    relationships: &[Relationship],
    min_strength: f64,
) -> StrategySuggestion {
    let metrics = elements
        .iter()
        .filter(|e| e.kind == ElementKind::Metric)
        .count();
    let charts = elements
        .iter()
        .filter(|e| e.kind == ElementKind::Chart)
        .count();
    let strong = relationships.iter().any(|r| r.is_strong(min_strength));
    let has = |kind: RelationshipKind| relationships.iter().any(|r| r.kind == kind);

    let suggestion = if metrics >= 3 && charts >= 1 {
        StrategySuggestion::new(
            LayoutStrategy::MetricRowPlusBody,
            format!("{metrics} metrics summarise {charts} chart(s)"),
        )
    } else if charts == 2 && has(RelationshipKind::Comparison) {
        StrategySuggestion::new(
            LayoutStrategy::Comparison,
            "two charts compare the same fields",
        )
    } else if charts >= 4 && !strong {
        StrategySuggestion::new(
            LayoutStrategy::Grid { columns: None },
            format!("{charts} unrelated charts"),
        )
    } else if has(RelationshipKind::Temporal) {
        StrategySuggestion::new(
            LayoutStrategy::Flow {
                axis: FlowAxis::Horizontal,
            },
            "charts share a time axis",
        )
    } else if charts >= 2 && strong {
        StrategySuggestion::new(LayoutStrategy::Hero, "related charts around a primary view")
    } else {
        StrategySuggestion::new(LayoutStrategy::Grid { columns: None }, "default arrangement")
    };

    tracing::debug!(
        strategy = %suggestion.strategy,
        reason = %suggestion.reason,
        "suggested layout strategy"
    );
    suggestion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingConfig;
    use crate::relationship::detect_relationships;
    use canvas_layout::{ChartFields, Point, Size};

    fn element(id: &str, kind: ElementKind, dims: &[&str], measures: &[&str]) -> CanvasElement {
        let element =
            CanvasElement::new(id, kind, Point::default(), Size::new(200.0, 100.0).unwrap())
                .unwrap();
        if dims.is_empty() && measures.is_empty() {
            element
        } else {
            element.with_fields(ChartFields::new(dims.iter().copied(), measures.iter().copied()))
        }
    }

    fn suggest(elements: &[CanvasElement]) -> LayoutStrategy {
        let config = GroupingConfig::default();
        let relationships = detect_relationships(elements, &config);
        suggest_strategy(elements, &relationships, config.min_strength).strategy
    }

    #[test]
    fn metrics_with_chart_get_metric_row() {
        let elements = [
            element("m1", ElementKind::Metric, &[], &[]),
            element("m2", ElementKind::Metric, &[], &[]),
            element("m3", ElementKind::Metric, &[], &[]),
            element("c", ElementKind::Chart, &["Region"], &["Revenue"]),
        ];
        assert_eq!(suggest(&elements), LayoutStrategy::MetricRowPlusBody);
    }

    #[test]
    fn two_comparable_charts_get_comparison() {
        let elements = [
            element("a", ElementKind::Chart, &["Region"], &["Revenue"]),
            element("b", ElementKind::Chart, &["Product"], &["Revenue"]),
        ];
        assert_eq!(suggest(&elements), LayoutStrategy::Comparison);
    }

    #[test]
    fn many_unrelated_charts_get_grid() {
        let elements = [
            element("a", ElementKind::Chart, &["Region"], &["Revenue"]),
            element("b", ElementKind::Chart, &["Browser"], &["Sessions"]),
            element("c", ElementKind::Chart, &["Team"], &["Headcount"]),
            element("d", ElementKind::Chart, &["Warehouse"], &["Stock"]),
        ];
        assert_eq!(suggest(&elements), LayoutStrategy::Grid { columns: None });
    }

    #[test]
    fn time_series_get_horizontal_flow() {
        let elements = [
            element("a", ElementKind::Chart, &["Month"], &["Revenue"]),
            element("b", ElementKind::Chart, &["Order Date"], &["Signups"]),
            element("c", ElementKind::Chart, &["Channel"], &["Cost"]),
        ];
        assert_eq!(
            suggest(&elements),
            LayoutStrategy::Flow {
                axis: FlowAxis::Horizontal
            }
        );
    }

    #[test]
    fn related_charts_get_hero() {
        let elements = [
            element("a", ElementKind::Chart, &["Region"], &["Revenue"]),
            element("b", ElementKind::Chart, &["Region"], &["Profit"]),
            element("c", ElementKind::Chart, &["Region"], &["Cost"]),
        ];
        assert_eq!(suggest(&elements), LayoutStrategy::Hero);
    }

    #[test]
    fn nothing_special_falls_back_to_grid() {
        let elements = [element("t", ElementKind::Table, &[], &[])];
        assert_eq!(suggest(&elements), LayoutStrategy::Grid { columns: None });
    }
}
