//! Action model
//!
//! An [`Action`] is one unit of work in a pipeline run. The wire form is a
//! JSON object tagged by `type`:
//!
//! ```json
//! { "type": "create_chart", "id": "c1", "dimensions": ["Region"], "measures": ["Revenue"] }
//! ```

use canvas_grouping::chart_title;
use canvas_layout::{
    CanvasElement, ChartFields, ElementId, ElementKind, LayoutConfig, LayoutError, Point, Size,
};
use canvas_quota::Weight;
use serde::{Deserialize, Serialize};

/// Ordering class used by priority mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Creates data-bearing elements
    Data,
    /// Derives insights from existing elements
    Insight,
    /// Arranges or decorates what is already there
    Presentation,
}

impl Tier {
    /// Tiers in execution order
    pub const ORDER: [Tier; 3] = [Tier::Data, Tier::Insight, Tier::Presentation];
}

/// Discriminant of [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a chart
    CreateChart,
    /// Create a table
    CreateTable,
    /// Create a metric card
    CreateMetric,
    /// Generate insights for a chart
    GenerateInsights,
    /// Add a text annotation
    AddAnnotation,
    /// Re-arrange elements
    Arrange,
    /// Group elements into semantic zones
    GroupSemantic,
}

impl ActionType {
    /// Every action type
    pub const ALL: [ActionType; 7] = [
        ActionType::CreateChart,
        ActionType::CreateTable,
        ActionType::CreateMetric,
        ActionType::GenerateInsights,
        ActionType::AddAnnotation,
        ActionType::Arrange,
        ActionType::GroupSemantic,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateChart => "create_chart",
            Self::CreateTable => "create_table",
            Self::CreateMetric => "create_metric",
            Self::GenerateInsights => "generate_insights",
            Self::AddAnnotation => "add_annotation",
            Self::Arrange => "arrange",
            Self::GroupSemantic => "group_semantic",
        }
    }

    /// Quota weight, fixed per type
    #[must_use]
    pub fn weight(self) -> Weight {
        match self {
            Self::CreateChart | Self::CreateTable => Weight::Light,
            Self::CreateMetric => Weight::Medium,
            Self::GenerateInsights => Weight::Heavy,
            Self::AddAnnotation | Self::Arrange | Self::GroupSemantic => Weight::Local,
        }
    }

    /// Priority tier, fixed per type
    #[must_use]
    pub fn tier(self) -> Tier {
        match self {
            Self::CreateChart | Self::CreateTable | Self::CreateMetric => Tier::Data,
            Self::GenerateInsights => Tier::Insight,
            Self::AddAnnotation | Self::Arrange | Self::GroupSemantic => Tier::Presentation,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work submitted to the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Chart over dimensions and measures
    CreateChart {
        /// New element id
        id: ElementId,
        /// Category fields
        #[serde(default)]
        dimensions: Vec<String>,
        /// Measure fields
        #[serde(default)]
        measures: Vec<String>,
        /// Display title; derived from fields when absent
        #[serde(default)]
        title: Option<String>,
        /// Size hint
        #[serde(default)]
        size: Option<Size>,
    },
    /// Tabular view, optionally of an existing chart
    CreateTable {
        /// New element id
        id: ElementId,
        /// Chart the table is derived from
        #[serde(default)]
        source: Option<ElementId>,
        /// Size hint
        #[serde(default)]
        size: Option<Size>,
    },
    /// Single computed value
    CreateMetric {
        /// New element id
        id: ElementId,
        /// Expression evaluated by the remote side
        expression: String,
        /// Card label
        label: String,
    },
    /// Narrative insights about a chart
    GenerateInsights {
        /// New element id
        id: ElementId,
        /// Chart to analyse
        chart: ElementId,
    },
    /// Free text note
    AddAnnotation {
        /// New element id
        id: ElementId,
        /// Note text
        text: String,
        /// Element the note sits next to
        #[serde(default)]
        anchor: Option<ElementId>,
    },
    /// Re-arrange elements with a named strategy
    Arrange {
        /// Strategy name; suggested from the elements when absent
        #[serde(default)]
        strategy: Option<String>,
        /// Elements to arrange; every element when empty
        #[serde(default)]
        elements: Vec<ElementId>,
    },
    /// Bucket elements by a criterion and draw zones around each bucket
    GroupSemantic {
        /// Criterion phrase, e.g. "by region"
        criterion: String,
        /// Zone padding; configured default when absent
        #[serde(default)]
        padding: Option<f64>,
    },
}

impl Action {
    /// Discriminant
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::CreateChart { .. } => ActionType::CreateChart,
            Self::CreateTable { .. } => ActionType::CreateTable,
            Self::CreateMetric { .. } => ActionType::CreateMetric,
            Self::GenerateInsights { .. } => ActionType::GenerateInsights,
            Self::AddAnnotation { .. } => ActionType::AddAnnotation,
            Self::Arrange { .. } => ActionType::Arrange,
            Self::GroupSemantic { .. } => ActionType::GroupSemantic,
        }
    }

    /// Quota weight
    #[inline]
    #[must_use]
    pub fn weight(&self) -> Weight {
        self.action_type().weight()
    }

    /// Priority tier
    #[inline]
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.action_type().tier()
    }

    /// Whether the action needs the remote quota
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.weight().is_remote()
    }

    /// Id of the element the action creates, if any
    #[must_use]
    pub fn element_id(&self) -> Option<&ElementId> {
        match self {
            Self::CreateChart { id, .. }
            | Self::CreateTable { id, .. }
            | Self::CreateMetric { id, .. }
            | Self::GenerateInsights { id, .. }
            | Self::AddAnnotation { id, .. } => Some(id),
            Self::Arrange { .. } | Self::GroupSemantic { .. } => None,
        }
    }

    /// Element a creating action would produce, at the origin
    ///
    /// Remote executors fill in content; position is settled when the result
    /// is merged into the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidSize`] for a non-positive size hint.
    pub fn draft_element(
        &self,
        config: &LayoutConfig,
    ) -> Result<Option<CanvasElement>, LayoutError> {
        let sized =
            |kind: ElementKind, hint: Option<Size>| hint.unwrap_or_else(|| config.default_size(kind));
        let element = match self {
            Self::CreateChart {
                id,
                dimensions,
                measures,
                title,
                size,
            } => {
                let fields = ChartFields::new(dimensions.iter().cloned(), measures.iter().cloned());
                let title = title.clone().unwrap_or_else(|| chart_title(&fields));
                CanvasElement::new(
                    id.clone(),
                    ElementKind::Chart,
                    Point::default(),
                    sized(ElementKind::Chart, *size),
                )?
                .with_fields(fields)
                .with_title(title)
            }
            Self::CreateTable { id, source, size } => {
                let element = CanvasElement::new(
                    id.clone(),
                    ElementKind::Table,
                    Point::default(),
                    sized(ElementKind::Table, *size),
                )?;
                match source {
                    Some(source) => element.with_title(format!("Table of {source}")),
                    None => element,
                }
            }
            Self::CreateMetric { id, label, .. } => CanvasElement::new(
                id.clone(),
                ElementKind::Metric,
                Point::default(),
                config.default_size(ElementKind::Metric),
            )?
            .with_title(label.clone()),
            Self::GenerateInsights { id, chart } => CanvasElement::new(
                id.clone(),
                ElementKind::Annotation,
                Point::default(),
                config.default_size(ElementKind::Annotation),
            )?
            .with_title(format!("Insights for {chart}")),
            Self::AddAnnotation { id, text, .. } => CanvasElement::new(
                id.clone(),
                ElementKind::Annotation,
                Point::default(),
                config.default_size(ElementKind::Annotation),
            )?
            .with_title(text.clone()),
            Self::Arrange { .. } | Self::GroupSemantic { .. } => return Ok(None),
        };
        Ok(Some(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn weights_and_tiers_follow_type() {
        assert_eq!(ActionType::CreateChart.weight(), Weight::Light);
        assert_eq!(ActionType::CreateTable.weight(), Weight::Light);
        assert_eq!(ActionType::CreateMetric.weight(), Weight::Medium);
        assert_eq!(ActionType::GenerateInsights.weight(), Weight::Heavy);
        for local in [
            ActionType::AddAnnotation,
            ActionType::Arrange,
            ActionType::GroupSemantic,
        ] {
            assert_eq!(local.weight(), Weight::Local);
            assert_eq!(local.tier(), Tier::Presentation);
        }
        assert_eq!(ActionType::GenerateInsights.tier(), Tier::Insight);
    }

    #[test]
    fn wire_form_is_tagged_by_type() {
        let raw = r#"[
            {"type": "create_chart", "id": "c1", "dimensions": ["Region"], "measures": ["Revenue"]},
            {"type": "arrange", "strategy": "hero"},
            {"type": "group_semantic", "criterion": "by region"}
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(raw).unwrap();
        let types: Vec<ActionType> = actions.iter().map(Action::action_type).collect();
        assert_eq!(
            types,
            vec![ActionType::CreateChart, ActionType::Arrange, ActionType::GroupSemantic]
        );
        assert_eq!(
            serde_json::to_value(&actions[1]).unwrap()["type"],
            serde_json::json!("arrange")
        );
        for action_type in ActionType::ALL {
            assert_eq!(
                serde_json::to_value(action_type).unwrap(),
                serde_json::json!(action_type.as_str())
            );
        }
    }

    #[test]
    fn draft_chart_derives_title() {
        let action = Action::CreateChart {
            id: "c1".into(),
            dimensions: vec!["Region".into()],
            measures: vec!["Revenue".into()],
            title: None,
            size: None,
        };
        let element = action.draft_element(&LayoutConfig::default()).unwrap().unwrap();
        assert_eq!(element.title.as_deref(), Some("Revenue by Region"));
        assert_eq!(element.size, Size::new(400.0, 300.0).unwrap());
    }

    #[test]
    fn draft_rejects_bad_size_hint() {
        let action = Action::CreateTable {
            id: "t".into(),
            source: None,
            size: Some(Size {
                width: -1.0,
                height: 10.0,
            }),
        };
        assert!(action.draft_element(&LayoutConfig::default()).is_err());
    }
}
