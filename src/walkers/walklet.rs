use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{KnowledgeGraph, Vertex};
use crate::samplers::SamplerKind;
use crate::walkers::traits::Walker;
use crate::walkers::RandomWalker;

/// Walklets: each random walk re-tokenized into `(root,)` plus one
/// `(root, vertex)` pair per later position of the walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkletWalker {
    pub walker: RandomWalker,
}

impl WalkletWalker {
    pub fn new(depth: usize, walks_per_entity: Option<usize>) -> Self {
        Self {
            walker: RandomWalker::new(depth, walks_per_entity),
        }
    }

    pub fn with_sampler<S: Into<SamplerKind>>(mut self, sampler: S) -> Self {
        self.walker = self.walker.with_sampler(sampler);
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.walker = self.walker.with_n_jobs(n_jobs);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.walker = self.walker.with_seed(seed);
        self
    }

    /// Walklets of a single walk.
    pub fn walklets(walk: &[Arc<Vertex>]) -> BTreeSet<Vec<String>> {
        let mut walklets = BTreeSet::new();
        let Some(root) = walk.first() else {
            return walklets;
        };

        let root = root.name().to_string();
        walklets.insert(vec![root.clone()]);
        for vertex in &walk[1..] {
            walklets.insert(vec![root.clone(), vertex.name().to_string()]);
        }
        walklets
    }

    /// Deduplicated walklets over every random walk rooted at `entity`.
    pub fn extract_walklets(&self, graph: &KnowledgeGraph, entity: &str) -> BTreeSet<Vec<String>> {
        self.walker
            .extract_random_walks(graph, entity)
            .iter()
            .flat_map(|walk| Self::walklets(walk))
            .collect()
    }
}

impl From<RandomWalker> for WalkletWalker {
    fn from(walker: RandomWalker) -> Self {
        Self { walker }
    }
}

impl Walker for WalkletWalker {
    fn validate(&self) -> Result<()> {
        self.walker.validate()
    }

    fn prepare(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        self.walker.prepare(graph)
    }

    fn extract_entity(&self, graph: &KnowledgeGraph, entity: &str) -> Vec<Vec<String>> {
        self.extract_walklets(graph, entity).into_iter().collect()
    }

    fn n_jobs(&self) -> usize {
        self.walker.n_jobs
    }

    fn name(&self) -> &'static str {
        "walklet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tuples(items: &[&[&str]]) -> BTreeSet<Vec<String>> {
        items
            .iter()
            .map(|tuple| tuple.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_walklets_of_single_hop() {
        let graph = KnowledgeGraph::new();
        let a = graph.entity("A");
        let b = graph.entity("B");
        let p = graph.predicate("p", &a, &b);

        let walklets = WalkletWalker::walklets(&[a, p, b]);
        assert_eq!(walklets, tuples(&[&["A"], &["A", "p"], &["A", "B"]]));
    }

    #[test]
    fn test_walklets_of_trivial_walk() {
        let graph = KnowledgeGraph::new();
        let a = graph.entity("A");
        assert_eq!(WalkletWalker::walklets(&[a]), tuples(&[&["A"]]));
        assert!(WalkletWalker::walklets(&[]).is_empty());
    }

    #[test]
    fn test_walklets_pair_root_with_every_hop() {
        let graph = KnowledgeGraph::from_triples(vec![("A", "p", "B"), ("B", "q", "C")]);
        let walker = WalkletWalker::new(2, None);

        let walklets = walker.extract_walklets(&graph, "A");
        assert_eq!(
            walklets,
            tuples(&[&["A"], &["A", "p"], &["A", "B"], &["A", "q"], &["A", "C"]])
        );
    }
}
