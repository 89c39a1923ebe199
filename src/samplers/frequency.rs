use std::sync::Arc;

use hashbrown::HashMap;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{KnowledgeGraph, Vertex};
use crate::samplers::traits::{weighted_choice, Sampler};

/// Frequency-weighted next-hop selection.
///
/// Predicate candidates are weighted by how often their label occurs in the
/// graph, entity candidates by their in-degree. With `inverse` set, rare
/// candidates are favoured instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencySampler {
    pub inverse: bool,
    #[serde(skip)]
    predicate_counts: HashMap<String, usize>,
    #[serde(skip)]
    object_counts: HashMap<String, usize>,
}

impl FrequencySampler {
    pub fn new(inverse: bool) -> Self {
        Self {
            inverse,
            ..Self::default()
        }
    }

    fn weight(&self, candidate: &Vertex) -> f64 {
        let counts = if candidate.is_predicate() {
            &self.predicate_counts
        } else {
            &self.object_counts
        };
        counts.get(candidate.name()).copied().unwrap_or(1).max(1) as f64
    }
}

impl Sampler for FrequencySampler {
    fn fit(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        self.predicate_counts.clear();
        self.object_counts.clear();

        for vertex in graph.all_vertices() {
            if vertex.is_predicate() {
                *self
                    .predicate_counts
                    .entry(vertex.name().to_string())
                    .or_default() += 1;
            } else {
                let in_degree = graph.inverse_neighbors(vertex).len();
                *self.object_counts.entry(vertex.name().to_string()).or_default() += in_degree;
            }
        }

        log::debug!(
            "Frequency sampler fitted on {} predicate labels and {} entities",
            self.predicate_counts.len(),
            self.object_counts.len()
        );
        Ok(())
    }

    fn choose(
        &self,
        graph: &KnowledgeGraph,
        current: &Vertex,
        _walk: &[Arc<Vertex>],
        rng: &mut Pcg64,
    ) -> Option<Arc<Vertex>> {
        weighted_choice(graph.neighbors(current), self.inverse, rng, |candidate| {
            self.weight(candidate)
        })
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn create_test_graph() -> KnowledgeGraph {
        // "common" appears three times, "rare" once
        KnowledgeGraph::from_triples(vec![
            ("root", "common", "x"),
            ("y", "common", "x"),
            ("z", "common", "x"),
            ("root", "rare", "w"),
        ])
    }

    fn count_choices(sampler: &FrequencySampler, graph: &KnowledgeGraph) -> usize {
        let root = graph.entity("root");
        let mut rng = Pcg64::seed_from_u64(3);
        (0..1000)
            .filter_map(|_| sampler.choose(graph, &root, &[root.clone()], &mut rng))
            .filter(|v| v.name() == "common")
            .count()
    }

    #[test]
    fn test_frequency_counts() {
        let graph = create_test_graph();
        let mut sampler = FrequencySampler::new(false);
        sampler.fit(&graph).unwrap();

        assert_eq!(sampler.predicate_counts.get("common"), Some(&3));
        assert_eq!(sampler.predicate_counts.get("rare"), Some(&1));
        assert_eq!(sampler.object_counts.get("x"), Some(&3));
        assert_eq!(sampler.object_counts.get("root"), Some(&0));
    }

    #[test]
    fn test_frequency_favours_common_labels() {
        let graph = create_test_graph();
        let mut sampler = FrequencySampler::new(false);
        sampler.fit(&graph).unwrap();

        // Expected share is 3/4
        assert!(count_choices(&sampler, &graph) > 650);
    }

    #[test]
    fn test_inverse_frequency_favours_rare_labels() {
        let graph = create_test_graph();
        let mut sampler = FrequencySampler::new(true);
        sampler.fit(&graph).unwrap();

        // Expected share is (1/3) / (1/3 + 1) = 1/4
        assert!(count_choices(&sampler, &graph) < 350);
    }

    #[test]
    fn test_frequency_no_candidates() {
        let graph = create_test_graph();
        let mut sampler = FrequencySampler::default();
        sampler.fit(&graph).unwrap();

        let x = graph.entity("x");
        assert!(sampler.choose(&graph, &x, &[x.clone()], &mut Pcg64::seed_from_u64(1)).is_none());
    }
}
