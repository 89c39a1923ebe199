use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Role a vertex plays in the graph.
///
/// Entities are identified by their name alone. Predicates are occurrences of
/// a relation label between two endpoints, so two predicates sharing a label
/// are still distinct vertices.
#[derive(Debug, Clone)]
pub enum VertexRole {
    Entity,
    Predicate {
        from: Option<Arc<Vertex>>,
        to: Option<Arc<Vertex>>,
    },
}

/// A node of the knowledge graph: either an entity or a relation occurrence.
#[derive(Debug, Clone)]
pub struct Vertex {
    name: String,
    sequence_id: u64,
    role: VertexRole,
}

impl Vertex {
    /// Create an entity vertex. Prefer [`KnowledgeGraph::entity`] which
    /// allocates the sequence id.
    ///
    /// [`KnowledgeGraph::entity`]: crate::graph::KnowledgeGraph::entity
    pub fn entity<S: Into<String>>(sequence_id: u64, name: S) -> Self {
        Self {
            name: name.into(),
            sequence_id,
            role: VertexRole::Entity,
        }
    }

    /// Create a predicate vertex recording the endpoints it was created between.
    pub fn predicate<S: Into<String>>(
        sequence_id: u64,
        name: S,
        from: Option<Arc<Vertex>>,
        to: Option<Arc<Vertex>>,
    ) -> Self {
        Self {
            name: name.into(),
            sequence_id,
            role: VertexRole::Predicate { from, to },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    pub fn role(&self) -> &VertexRole {
        &self.role
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self.role, VertexRole::Predicate { .. })
    }

    pub fn from_vertex(&self) -> Option<&Arc<Vertex>> {
        match &self.role {
            VertexRole::Predicate { from, .. } => from.as_ref(),
            VertexRole::Entity => None,
        }
    }

    pub fn to_vertex(&self) -> Option<&Arc<Vertex>> {
        match &self.role {
            VertexRole::Predicate { to, .. } => to.as_ref(),
            VertexRole::Entity => None,
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        match (&self.role, &other.role) {
            (VertexRole::Entity, VertexRole::Entity) => self.name == other.name,
            (
                VertexRole::Predicate { from, to },
                VertexRole::Predicate {
                    from: other_from,
                    to: other_to,
                },
            ) => {
                self.sequence_id == other.sequence_id
                    && from == other_from
                    && to == other_to
                    && self.name == other.name
            }
            _ => false,
        }
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.role {
            VertexRole::Entity => {
                0u8.hash(state);
                self.name.hash(state);
            }
            VertexRole::Predicate { from, to } => {
                1u8.hash(state);
                self.sequence_id.hash(state);
                from.hash(state);
                to.hash(state);
                self.name.hash(state);
            }
        }
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        // Name first; the remaining keys only break ties so that ordering
        // agrees with equality.
        self.name.cmp(&other.name).then_with(|| match (&self.role, &other.role) {
            (VertexRole::Entity, VertexRole::Entity) => Ordering::Equal,
            (VertexRole::Entity, VertexRole::Predicate { .. }) => Ordering::Less,
            (VertexRole::Predicate { .. }, VertexRole::Entity) => Ordering::Greater,
            (
                VertexRole::Predicate { from, to },
                VertexRole::Predicate {
                    from: other_from,
                    to: other_to,
                },
            ) => self
                .sequence_id
                .cmp(&other.sequence_id)
                .then_with(|| from.cmp(other_from))
                .then_with(|| to.cmp(other_to)),
        })
    }
}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entities_equal_by_name() {
        let a = Vertex::entity(1, "http://example.org/a");
        let b = Vertex::entity(7, "http://example.org/a");
        assert_eq!(a, b);

        let set: HashSet<Vertex> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_predicates_distinct_per_occurrence() {
        let s = Arc::new(Vertex::entity(0, "s"));
        let o1 = Arc::new(Vertex::entity(1, "o1"));
        let o2 = Arc::new(Vertex::entity(2, "o2"));

        let p1 = Vertex::predicate(3, "knows", Some(s.clone()), Some(o1.clone()));
        let p2 = Vertex::predicate(4, "knows", Some(s.clone()), Some(o2));
        let p1_again = Vertex::predicate(3, "knows", Some(s), Some(o1));

        assert_ne!(p1, p2);
        assert_eq!(p1, p1_again);
    }

    #[test]
    fn test_entity_never_equals_predicate() {
        let e = Vertex::entity(0, "label");
        let p = Vertex::predicate(0, "label", None, None);
        assert_ne!(e, p);
        assert!(!e.is_predicate());
        assert!(p.is_predicate());
    }

    #[test]
    fn test_ordering_by_name() {
        let mut vertices = vec![
            Vertex::entity(0, "c"),
            Vertex::predicate(1, "a", None, None),
            Vertex::entity(2, "b"),
        ];
        vertices.sort();
        let names: Vec<&str> = vertices.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
