use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexSet;

use crate::graph::Vertex;

type Adjacency = HashMap<Arc<Vertex>, IndexSet<Arc<Vertex>>>;

/// Directed multigraph of entities and relation occurrences.
///
/// Every triple `(s, p, o)` is stored as two edges `s -> p -> o`, where `p` is a
/// predicate vertex unique to that triple. Adjacency sets keep insertion
/// order so that seeded walks are reproducible.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    vertices: HashSet<Arc<Vertex>>,
    forward: Adjacency,
    backward: Adjacency,
    next_id: AtomicU64,
    remote: bool,
    edge_count: usize,
}

/// Out- or in-adjacency of a single vertex. Empty for unknown vertices.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    set: Option<&'a IndexSet<Arc<Vertex>>>,
}

impl<'a> Neighbors<'a> {
    pub fn len(&self) -> usize {
        self.set.map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.set.is_some_and(|set| set.contains(vertex))
    }

    /// Neighbor at `index` in insertion order.
    pub fn get(&self, index: usize) -> Option<&'a Arc<Vertex>> {
        self.set.and_then(|set| set.get_index(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Arc<Vertex>> + 'a {
        self.set.into_iter().flat_map(|set| set.iter())
    }

    pub fn to_vec(&self) -> Vec<Arc<Vertex>> {
        self.iter().cloned().collect()
    }
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph whose entities are resolved lazily by a remote collaborator.
    /// Entity membership is not validated before extraction for such graphs.
    pub fn remote_backed() -> Self {
        Self {
            remote: true,
            ..Self::default()
        }
    }

    /// Build a graph from `(subject, predicate, object)` name triples.
    pub fn from_triples<I, S>(triples: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (subject, predicate, object) in triples {
            graph.add_triple(subject, predicate, object);
        }
        graph
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Create an entity vertex with a freshly allocated sequence id.
    pub fn entity<S: Into<String>>(&self, name: S) -> Arc<Vertex> {
        Arc::new(Vertex::entity(self.allocate_id(), name))
    }

    /// Create a predicate vertex between `from` and `to`.
    pub fn predicate<S: Into<String>>(
        &self,
        name: S,
        from: &Arc<Vertex>,
        to: &Arc<Vertex>,
    ) -> Arc<Vertex> {
        Arc::new(Vertex::predicate(
            self.allocate_id(),
            name,
            Some(from.clone()),
            Some(to.clone()),
        ))
    }

    /// Register a vertex. Only predicate vertices are kept in the vertex set;
    /// entities are reachable through the adjacency indexes.
    pub fn add_vertex(&mut self, vertex: Arc<Vertex>) {
        if vertex.is_predicate() {
            self.vertices.insert(vertex);
        }
    }

    /// Add the directed edge `from -> to`.
    pub fn add_edge(&mut self, from: Arc<Vertex>, to: Arc<Vertex>) {
        let inserted = self
            .forward
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.backward.entry(to).or_default().insert(from);
        if inserted {
            self.edge_count += 1;
        }
    }

    /// Remove `to` from the out-neighbors of `from`. The reverse index is left
    /// as is; use [`remove_inverse_edge`](Self::remove_inverse_edge) as well
    /// for a full removal.
    pub fn remove_edge(&mut self, from: &Vertex, to: &Vertex) {
        if let Some(targets) = self.forward.get_mut(from) {
            if targets.shift_remove(to) {
                self.edge_count -= 1;
            }
        }
    }

    /// Remove `from` from the in-neighbors of `to`.
    pub fn remove_inverse_edge(&mut self, from: &Vertex, to: &Vertex) {
        if let Some(sources) = self.backward.get_mut(to) {
            sources.shift_remove(from);
        }
    }

    /// Insert the triple `subject -predicate-> object`, returning the
    /// predicate vertex created for this occurrence.
    pub fn add_triple<S: Into<String>>(&mut self, subject: S, predicate: S, object: S) -> Arc<Vertex> {
        let subject = self.entity(subject);
        let object = self.entity(object);
        let predicate = self.predicate(predicate, &subject, &object);

        self.add_vertex(subject.clone());
        self.add_vertex(predicate.clone());
        self.add_vertex(object.clone());
        self.add_edge(subject, predicate.clone());
        self.add_edge(predicate.clone(), object);
        predicate
    }

    pub fn neighbors(&self, vertex: &Vertex) -> Neighbors<'_> {
        Neighbors {
            set: self.forward.get(vertex),
        }
    }

    pub fn inverse_neighbors(&self, vertex: &Vertex) -> Neighbors<'_> {
        Neighbors {
            set: self.backward.get(vertex),
        }
    }

    /// Whether the vertex is known to the graph, either as a registered
    /// vertex or as an endpoint of any recorded edge.
    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.vertices.contains(vertex)
            || self.forward.contains_key(vertex)
            || self.backward.contains_key(vertex)
    }

    /// Whether an entity with this name is known to the graph.
    pub fn contains_entity(&self, name: &str) -> bool {
        self.contains(&Vertex::entity(0, name))
    }

    /// Registered (predicate) vertices.
    pub fn vertices(&self) -> impl Iterator<Item = &Arc<Vertex>> {
        self.vertices.iter()
    }

    /// Every vertex appearing in the adjacency indexes, entities included.
    pub fn all_vertices(&self) -> impl Iterator<Item = &Arc<Vertex>> {
        self.forward
            .keys()
            .chain(self.backward.keys().filter(|v| !self.forward.contains_key(*v)))
    }

    /// Number of registered (predicate) vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.forward.is_empty()
    }

    /// Number of edges currently present in the forward index.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
