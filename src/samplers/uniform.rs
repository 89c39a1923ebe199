use std::sync::Arc;

use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::graph::{KnowledgeGraph, Vertex};
use crate::samplers::traits::{uniform_choice, Sampler};

/// Picks uniformly among the out-neighbors, ignoring walk history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn choose(
        &self,
        graph: &KnowledgeGraph,
        current: &Vertex,
        _walk: &[Arc<Vertex>],
        rng: &mut Pcg64,
    ) -> Option<Arc<Vertex>> {
        uniform_choice(graph.neighbors(current), rng)
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}
