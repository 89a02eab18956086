//! Canvas elements
//!
//! A [`CanvasElement`] is a placed visual item. Elements are created by action
//! handlers and afterwards only moved or resized by arrangement passes.
//! [`ElementSpec`] describes an element that still needs a position.

use crate::error::LayoutError;
use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Caller-assigned element identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Create new identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of visual element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Chart visualisation
    Chart,
    /// Single-value metric card
    Metric,
    /// Tabular view
    Table,
    /// Free text annotation
    Annotation,
}

impl ElementKind {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Chart => "chart",
            ElementKind::Metric => "metric",
            ElementKind::Table => "table",
            ElementKind::Annotation => "annotation",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category (dimension) and measure names of a chart-like element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartFields {
    /// Category fields
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Measure fields
    #[serde(default)]
    pub measures: Vec<String>,
}

impl ChartFields {
    /// Create field set
    #[must_use]
    pub fn new<D, M>(dimensions: D, measures: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            measures: measures.into_iter().map(Into::into).collect(),
        }
    }

    /// All field names, dimensions first
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .chain(self.measures.iter())
            .map(String::as_str)
    }

    /// No fields at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.measures.is_empty()
    }
}

/// A placed visual item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCanvasElement")]
pub struct CanvasElement {
    /// Immutable identifier
    pub id: ElementId,
    /// Element kind
    pub kind: ElementKind,
    /// Top-left corner
    pub position: Point,
    /// Extent, always > 0
    pub size: Size,
    /// Structural metadata for relationship detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<ChartFields>,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Wire form of [`CanvasElement`], validated on conversion
#[derive(Deserialize)]
struct RawCanvasElement {
    id: ElementId,
    kind: ElementKind,
    position: Point,
    size: Size,
    #[serde(default)]
    fields: Option<ChartFields>,
    #[serde(default)]
    title: Option<String>,
}

impl TryFrom<RawCanvasElement> for CanvasElement {
    type Error = LayoutError;

    fn try_from(raw: RawCanvasElement) -> Result<Self, Self::Error> {
        let mut element = Self::new(raw.id, raw.kind, raw.position, raw.size)?;
        element.fields = raw.fields;
        element.title = raw.title;
        Ok(element)
    }
}

impl CanvasElement {
    /// Create element at a position
    ///
    /// # Errors
    /// `LayoutError::InvalidSize` if `size` is not strictly positive
    pub fn new(
        id: impl Into<ElementId>,
        kind: ElementKind,
        position: Point,
        size: Size,
    ) -> Result<Self, LayoutError> {
        if !size.is_valid() {
            return Err(LayoutError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        Ok(Self {
            id: id.into(),
            kind,
            position,
            size,
            fields: None,
            title: None,
        })
    }

    /// With chart fields
    #[inline]
    #[must_use]
    pub fn with_fields(mut self, fields: ChartFields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Axis-aligned bounding box
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Chart-like elements take part in relationship detection
    #[inline]
    #[must_use]
    pub fn is_chart_like(&self) -> bool {
        matches!(self.kind, ElementKind::Chart | ElementKind::Table)
    }
}

/// An element awaiting placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Identifier the placement will refer to
    pub id: ElementId,
    /// Element kind
    pub kind: ElementKind,
    /// Preferred size; kind default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl ElementSpec {
    /// Create spec with kind-default size
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            size: None,
        }
    }

    /// With size hint
    #[inline]
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }
}

impl From<&CanvasElement> for ElementSpec {
    fn from(element: &CanvasElement) -> Self {
        Self {
            id: element.id.clone(),
            kind: element.kind,
            size: Some(element.size),
        }
    }
}

/// Non-interactive backdrop grouping related elements
///
/// Zones intentionally contain other elements and are excluded from
/// collision checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticZone {
    /// Zone heading
    pub label: String,
    /// Backdrop rectangle
    pub bounds: Rect,
    /// Elements the zone encloses
    pub members: Vec<ElementId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializing_rejects_invalid_size() {
        let raw = r#"{"id":"a","kind":"chart","position":{"x":0,"y":0},"size":{"width":-1,"height":10}}"#;
        let err = serde_json::from_str::<CanvasElement>(raw).unwrap_err();
        assert!(err.to_string().contains("-1"), "{err}");

        let raw = r#"{"id":"a","kind":"chart","position":{"x":0,"y":0},"size":{"width":40,"height":10},"title":"Sales"}"#;
        let element: CanvasElement = serde_json::from_str(raw).unwrap();
        assert_eq!(element.size, Size::new(40.0, 10.0).unwrap());
        assert_eq!(element.title.as_deref(), Some("Sales"));
    }

    #[test]
    fn element_rejects_invalid_size() {
        let size = Size {
            width: 0.0,
            height: 10.0,
        };
        let result = CanvasElement::new("a", ElementKind::Chart, Point::default(), size);
        assert!(matches!(result, Err(LayoutError::InvalidSize { .. })));
    }

    #[test]
    fn element_serde_shape() {
        let element = CanvasElement::new(
            "m1",
            ElementKind::Metric,
            Point::new(-10.0, 5.0),
            Size::new(200.0, 100.0).unwrap(),
        )
        .unwrap();
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["id"], "m1");
        assert_eq!(json["kind"], "metric");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn chart_fields_all_lists_dimensions_first() {
        let fields = ChartFields::new(["Region"], ["Revenue", "Cost"]);
        let all: Vec<_> = fields.all().collect();
        assert_eq!(all, vec!["Region", "Revenue", "Cost"]);
    }
}
