use std::sync::Arc;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{KnowledgeGraph, Neighbors, Vertex};
use crate::samplers::{FrequencySampler, PageRankSampler, UniformSampler};

/// Policy picking the next hop of a walk.
pub trait Sampler: Send + Sync {
    /// Compute whatever graph statistics the policy needs. Called by the
    /// walker once per extraction, before any walk is sampled.
    fn fit(&mut self, _graph: &KnowledgeGraph) -> Result<()> {
        Ok(())
    }

    /// Pick one of `current`'s out-neighbors, or `None` when it has none.
    fn choose(
        &self,
        graph: &KnowledgeGraph,
        current: &Vertex,
        walk: &[Arc<Vertex>],
        rng: &mut Pcg64,
    ) -> Option<Arc<Vertex>>;

    fn name(&self) -> &'static str;
}

/// Serializable choice of sampling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    Uniform(UniformSampler),
    Frequency(FrequencySampler),
    PageRank(PageRankSampler),
}

impl Default for SamplerKind {
    fn default() -> Self {
        SamplerKind::Uniform(UniformSampler)
    }
}

impl From<UniformSampler> for SamplerKind {
    fn from(sampler: UniformSampler) -> Self {
        SamplerKind::Uniform(sampler)
    }
}

impl From<FrequencySampler> for SamplerKind {
    fn from(sampler: FrequencySampler) -> Self {
        SamplerKind::Frequency(sampler)
    }
}

impl From<PageRankSampler> for SamplerKind {
    fn from(sampler: PageRankSampler) -> Self {
        SamplerKind::PageRank(sampler)
    }
}

impl Sampler for SamplerKind {
    fn fit(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        match self {
            SamplerKind::Uniform(sampler) => sampler.fit(graph),
            SamplerKind::Frequency(sampler) => sampler.fit(graph),
            SamplerKind::PageRank(sampler) => sampler.fit(graph),
        }
    }

    fn choose(
        &self,
        graph: &KnowledgeGraph,
        current: &Vertex,
        walk: &[Arc<Vertex>],
        rng: &mut Pcg64,
    ) -> Option<Arc<Vertex>> {
        match self {
            SamplerKind::Uniform(sampler) => sampler.choose(graph, current, walk, rng),
            SamplerKind::Frequency(sampler) => sampler.choose(graph, current, walk, rng),
            SamplerKind::PageRank(sampler) => sampler.choose(graph, current, walk, rng),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SamplerKind::Uniform(sampler) => sampler.name(),
            SamplerKind::Frequency(sampler) => sampler.name(),
            SamplerKind::PageRank(sampler) => sampler.name(),
        }
    }
}

pub(crate) fn uniform_choice(candidates: Neighbors<'_>, rng: &mut Pcg64) -> Option<Arc<Vertex>> {
    if candidates.is_empty() {
        return None;
    }
    candidates.get(rng.gen_range(0..candidates.len())).cloned()
}

/// Draw a candidate with probability proportional to `weight`, or to
/// `1 / weight` when `inverse` is set. Falls back to a uniform draw when no
/// candidate carries a positive weight.
pub(crate) fn weighted_choice<F>(
    candidates: Neighbors<'_>,
    inverse: bool,
    rng: &mut Pcg64,
    weight: F,
) -> Option<Arc<Vertex>>
where
    F: Fn(&Vertex) -> f64,
{
    if candidates.len() <= 1 {
        return candidates.get(0).cloned();
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|candidate| {
            let w = weight(candidate);
            if !w.is_finite() || w <= 0.0 {
                0.0
            } else if inverse {
                1.0 / w
            } else {
                w
            }
        })
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(distribution) => candidates.get(distribution.sample(rng)).cloned(),
        Err(_) => uniform_choice(candidates, rng),
    }
}
