//! Structural grouping
//!
//! Greedy union over strong relationships. Every element ends up in exactly
//! one group; unrelated elements form singleton groups.

use crate::relationship::{Relationship, RelationshipKind};
use canvas_layout::{CanvasElement, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Set of elements judged related
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Members in input order
    pub members: Vec<ElementId>,
    /// Relationship kinds that joined the members
    pub kinds: BTreeSet<RelationshipKind>,
}

impl Group {
    /// Group of one element
    #[inline]
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Whether `id` belongs to the group
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.members.contains(id)
    }
}

/// Disjoint-set forest over element indices
#[derive(Debug)]
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    /// Union keeps the smaller index as root so roots follow input order
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Partition `elements` using relationships of at least `min_strength`
///
/// Groups are ordered by the input position of their first member.
#[must_use]
pub fn suggest_groupings(
    elements: &[CanvasElement],
    relationships: &[Relationship],
    min_strength: f64,
) -> Vec<Group> {
    let index: HashMap<&ElementId, usize> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| (&e.id, i))
        .collect();

    let mut sets = DisjointSet::new(elements.len());
    let mut strong = Vec::new();
    for relationship in relationships.iter().filter(|r| r.is_strong(min_strength)) {
        if let (Some(&a), Some(&b)) = (
            index.get(&relationship.source),
            index.get(&relationship.target),
        ) {
            sets.union(a, b);
            strong.push((a, relationship.kind));
        }
    }

    let mut by_root: Vec<Option<Group>> = vec![None; elements.len()];
    for (i, element) in elements.iter().enumerate() {
        let root = sets.find(i);
        by_root[root]
            .get_or_insert_with(|| Group {
                members: Vec::new(),
                kinds: BTreeSet::new(),
            })
            .members
            .push(element.id.clone());
    }
    for (member, kind) in strong {
        let root = sets.find(member);
        if let Some(group) = by_root[root].as_mut() {
            group.kinds.insert(kind);
        }
    }

    by_root.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingConfig;
    use crate::relationship::detect_relationships;
    use canvas_layout::{ChartFields, ElementKind, Point, Size};
    use pretty_assertions::assert_eq;

    fn chart(id: &str, dims: &[&str], measures: &[&str]) -> CanvasElement {
        CanvasElement::new(
            id,
            ElementKind::Chart,
            Point::default(),
            Size::new(400.0, 300.0).unwrap(),
        )
        .unwrap()
        .with_fields(ChartFields::new(dims.iter().copied(), measures.iter().copied()))
    }

    fn ids(group: &Group) -> Vec<&str> {
        group.members.iter().map(ElementId::as_str).collect()
    }

    #[test]
    fn shared_region_groups_unrelated_stays_alone() {
        let elements = [
            chart("a", &["Region"], &["Revenue"]),
            chart("b", &["Region"], &["Profit"]),
            chart("c", &["Browser"], &["Sessions"]),
        ];
        let config = GroupingConfig::default();
        let relationships = detect_relationships(&elements, &config);
        let groups = suggest_groupings(&elements, &relationships, config.min_strength);

        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec!["a", "b"]);
        assert!(groups[0].kinds.contains(&RelationshipKind::FieldOverlap));
        assert_eq!(ids(&groups[1]), vec!["c"]);
        assert!(groups[1].is_singleton());
    }

    #[test]
    fn grouping_is_transitive() {
        let elements = [
            chart("a", &["Region"], &["Revenue"]),
            chart("x", &["Browser"], &["Sessions"]),
            chart("b", &["Region"], &["Cost"]),
            chart("c", &["Channel"], &["Cost"]),
        ];
        let config = GroupingConfig::default();
        let relationships = detect_relationships(&elements, &config);
        let groups = suggest_groupings(&elements, &relationships, config.min_strength);

        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec!["a", "b", "c"]);
        assert_eq!(ids(&groups[1]), vec!["x"]);
    }

    #[test]
    fn weak_relationships_do_not_join() {
        let elements = [
            chart("a", &["Region", "Year", "Product"], &["Revenue"]),
            chart("b", &["Region", "Channel", "Segment"], &["Cost"]),
        ];
        let config = GroupingConfig::default().with_min_strength(0.5);
        let relationships = detect_relationships(&elements, &config);
        let groups = suggest_groupings(&elements, &relationships, config.min_strength);
        assert_eq!(groups.len(), 2);
    }
}
