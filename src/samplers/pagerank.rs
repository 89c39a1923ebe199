use std::sync::Arc;

use hashbrown::HashMap;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{KnowledgeGraph, Vertex};
use crate::samplers::traits::{weighted_choice, Sampler};

/// Next-hop selection weighted by the PageRank of the entity a hop leads to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRankSampler {
    pub damping_factor: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub inverse: bool,
    #[serde(skip)]
    ranks: HashMap<String, f64>,
}

impl Default for PageRankSampler {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            inverse: false,
            ranks: HashMap::new(),
        }
    }
}

impl PageRankSampler {
    pub fn new(damping_factor: f64, inverse: bool) -> Self {
        Self {
            damping_factor,
            inverse,
            ..Self::default()
        }
    }

    pub fn rank(&self, entity: &str) -> Option<f64> {
        self.ranks.get(entity).copied()
    }

    /// Power iteration over the entity graph, where `s -> p -> o` counts as
    /// one edge `s -> o`.
    fn compute_pagerank(&self, graph: &KnowledgeGraph) -> HashMap<String, f64> {
        let mut out_edges: HashMap<String, Vec<String>> = HashMap::new();
        for vertex in graph.all_vertices().filter(|v| !v.is_predicate()) {
            let targets = graph
                .neighbors(vertex)
                .iter()
                .flat_map(|predicate| graph.neighbors(predicate).iter())
                .filter(|object| !object.is_predicate())
                .map(|object| object.name().to_string())
                .collect();
            out_edges.insert(vertex.name().to_string(), targets);
        }

        let node_count = out_edges.len();
        if node_count == 0 {
            return HashMap::new();
        }

        let initial_score = 1.0 / node_count as f64;
        let mut current_scores: HashMap<String, f64> =
            out_edges.keys().map(|node| (node.clone(), initial_score)).collect();
        let mut next_scores: HashMap<String, f64> =
            out_edges.keys().map(|node| (node.clone(), 0.0)).collect();

        for iteration in 0..self.max_iterations {
            let base = (1.0 - self.damping_factor) / node_count as f64;
            for score in next_scores.values_mut() {
                *score = base;
            }

            let mut dangling_mass = 0.0;
            for (node, targets) in &out_edges {
                let current_score = current_scores.get(node).copied().unwrap_or(0.0);
                if targets.is_empty() {
                    dangling_mass += current_score;
                    continue;
                }
                let contribution = current_score * self.damping_factor / targets.len() as f64;
                for target in targets {
                    if let Some(score) = next_scores.get_mut(target) {
                        *score += contribution;
                    }
                }
            }

            // Dangling nodes spread their score evenly
            let dangling_contribution = dangling_mass * self.damping_factor / node_count as f64;
            for score in next_scores.values_mut() {
                *score += dangling_contribution;
            }

            let diff: f64 = out_edges
                .keys()
                .map(|node| {
                    let old_score = current_scores.get(node).copied().unwrap_or(0.0);
                    let new_score = next_scores.get(node).copied().unwrap_or(0.0);
                    (new_score - old_score).abs()
                })
                .sum();

            std::mem::swap(&mut current_scores, &mut next_scores);

            if diff < self.tolerance {
                log::debug!("PageRank converged after {} iterations", iteration + 1);
                break;
            }
        }

        current_scores
    }

    fn weight(&self, graph: &KnowledgeGraph, candidate: &Vertex) -> f64 {
        let target = if candidate.is_predicate() {
            candidate
                .to_vertex()
                .map(|to| to.name().to_string())
                .or_else(|| graph.neighbors(candidate).get(0).map(|to| to.name().to_string()))
        } else {
            Some(candidate.name().to_string())
        };
        target.and_then(|name| self.rank(&name)).unwrap_or(0.0)
    }
}

impl Sampler for PageRankSampler {
    fn fit(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(GraphError::invalid_parameter(
                "damping_factor must be between 0 and 1",
            ));
        }
        self.ranks = self.compute_pagerank(graph);
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
            self.weight(graph, candidate)
        })
    }

    fn name(&self) -> &'static str {
        "pagerank"
    }
}
