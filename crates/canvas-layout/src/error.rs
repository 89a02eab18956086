//! Error types for canvas layout

use crate::element::ElementId;

/// Layout failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Width or height not finite and strictly positive
    #[error("invalid size {width}x{height}: both sides must be finite and > 0")]
    InvalidSize {
        /// Rejected width
        width: f64,
        /// Rejected height
        height: f64,
    },

    /// Placement would overlap another element
    #[error("placement of {a} collides with {b}")]
    Collision {
        /// Element being placed
        a: ElementId,
        /// Element already occupying the space
        b: ElementId,
    },

    /// Nothing to arrange
    #[error("no elements to arrange")]
    EmptyInput,

    /// Referenced element is not on the canvas
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),
}

impl LayoutError {
    /// Whether the failure came from an occupied region rather than bad input
    #[inline]
    #[must_use]
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_error_display() {
        let err = LayoutError::Collision {
            a: ElementId::from("chart-1"),
            b: ElementId::from("chart-2"),
        };
        assert_eq!(err.to_string(), "placement of chart-1 collides with chart-2");
        assert!(err.is_collision());
        assert!(!LayoutError::EmptyInput.is_collision());
    }
}
