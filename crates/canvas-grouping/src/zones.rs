//! Semantic zone annotation

use crate::heuristic::Bucket;
use canvas_layout::{CanvasElement, ElementId, Rect, SemanticZone};
use std::collections::HashMap;

/// One backdrop zone per labelled bucket
///
/// The "Other" bucket and buckets whose members are all missing from
/// `elements` produce no zone. Bounds are the members' union grown by
/// `padding` on every side.
#[must_use]
pub fn semantic_zones(
    elements: &[CanvasElement],
    buckets: &[Bucket],
    padding: f64,
) -> Vec<SemanticZone> {
    let by_id: HashMap<&ElementId, &CanvasElement> = elements.iter().map(|e| (&e.id, e)).collect();

    buckets
        .iter()
        .filter(|bucket| !bucket.is_other())
        .filter_map(|bucket| {
            let members: Vec<&CanvasElement> = bucket
                .members
                .iter()
                .filter_map(|id| by_id.get(id).copied())
                .collect();
            let rects: Vec<Rect> = members.iter().map(|e| e.bounds()).collect();
            let bounds = Rect::bounding(&rects)?;
            Some(SemanticZone {
                label: bucket.label.clone(),
                bounds: bounds.expand(padding),
                members: members.iter().map(|e| e.id.clone()).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_layout::{ElementKind, Point, Size};
    use pretty_assertions::assert_eq;

    fn placed(id: &str, x: f64, y: f64) -> CanvasElement {
        CanvasElement::new(
            id,
            ElementKind::Chart,
            Point::new(x, y),
            Size::new(100.0, 50.0).unwrap(),
        )
        .unwrap()
    }

    fn bucket(label: &str, members: &[&str]) -> Bucket {
        Bucket {
            label: label.to_string(),
            members: members.iter().map(|&m| ElementId::from(m)).collect(),
        }
    }

    #[test]
    fn zone_wraps_members_with_padding() {
        let elements = [placed("a", 0.0, 0.0), placed("b", 200.0, 100.0)];
        let zones = semantic_zones(&elements, &[bucket("Revenue", &["a", "b"])], 10.0);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].bounds, Rect::new(-10.0, -10.0, 320.0, 170.0));
        assert_eq!(zones[0].members, vec![ElementId::from("a"), ElementId::from("b")]);
    }

    #[test]
    fn other_and_dangling_buckets_are_skipped() {
        let elements = [placed("a", 0.0, 0.0)];
        let buckets = [bucket("Cost", &["ghost"]), bucket("Other", &["a"])];
        assert!(semantic_zones(&elements, &buckets, 10.0).is_empty());
    }
}
