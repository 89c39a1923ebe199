use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{KnowledgeGraph, Vertex};
use crate::samplers::{Sampler, SamplerKind};
use crate::walkers::traits::{Walk, Walker};

/// Sampling attempts allowed per requested walk before giving up on
/// reaching `walks_per_entity` distinct walks.
const SAMPLING_ATTEMPT_FACTOR: usize = 10;

/// Random walks rooted at each entity.
///
/// With `walks_per_entity` unset every maximal path up to `depth` hops is
/// enumerated depth-first; otherwise walks are sampled until that many
/// distinct ones exist. One hop is `entity -> predicate -> entity`, so a walk
/// holds at most `2 * depth + 1` vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomWalker {
    pub depth: usize,
    pub walks_per_entity: Option<usize>,
    pub sampler: SamplerKind,
    pub n_jobs: usize,
    pub seed: Option<u64>,
}

impl Default for RandomWalker {
    fn default() -> Self {
        Self {
            depth: 2,
            walks_per_entity: None,
            sampler: SamplerKind::default(),
            n_jobs: 1,
            seed: None,
        }
    }
}

impl RandomWalker {
    pub fn new(depth: usize, walks_per_entity: Option<usize>) -> Self {
        Self {
            depth,
            walks_per_entity,
            ..Self::default()
        }
    }

    pub fn with_sampler<S: Into<SamplerKind>>(mut self, sampler: S) -> Self {
        self.sampler = sampler.into();
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// RNG for one root entity. With a seed pinned the stream depends only on
    /// the seed and the entity name, not on scheduling.
    fn entity_rng(&self, entity: &str) -> Pcg64 {
        match self.seed {
            Some(seed) => Pcg64::seed_from_u64(seed ^ seahash::hash(entity.as_bytes())),
            None => Pcg64::from_entropy(),
        }
    }

    /// Deduplicated raw walks rooted at `entity`, sorted by vertex names.
    pub fn extract_random_walks(&self, graph: &KnowledgeGraph, entity: &str) -> Vec<Walk> {
        let root = graph.entity(entity);
        if graph.neighbors(&root).is_empty() {
            return vec![vec![root]];
        }

        match self.walks_per_entity {
            None => dedup_walks(self.exhaustive_walks(graph, root)),
            Some(max_walks) => {
                let mut rng = self.entity_rng(entity);
                self.sampled_walks(graph, root, max_walks, &mut rng)
            }
        }
    }

    fn exhaustive_walks(&self, graph: &KnowledgeGraph, root: Arc<Vertex>) -> Vec<Walk> {
        let max_len = 2 * self.depth + 1;
        let mut walks = Vec::new();
        let mut stack = vec![vec![root]];

        while let Some(mut walk) = stack.pop() {
            let neighbors = match walk.last() {
                Some(current) => graph.neighbors(current),
                None => continue,
            };

            if walk.len() >= max_len || neighbors.is_empty() {
                trim_dangling(&mut walk);
                walks.push(walk);
                continue;
            }

            for next in neighbors.iter() {
                let mut extended = walk.clone();
                extended.push(next.clone());
                stack.push(extended);
            }
        }

        walks
    }

    fn sampled_walks(
        &self,
        graph: &KnowledgeGraph,
        root: Arc<Vertex>,
        max_walks: usize,
        rng: &mut Pcg64,
    ) -> Vec<Walk> {
        let max_attempts = max_walks.saturating_mul(SAMPLING_ATTEMPT_FACTOR);
        let mut distinct: BTreeMap<Vec<String>, Walk> = BTreeMap::new();
        let mut attempts = 0;

        while distinct.len() < max_walks && attempts < max_attempts {
            attempts += 1;
            let walk = self.sample_walk(graph, root.clone(), rng);
            distinct.entry(walk_names(&walk)).or_insert(walk);
        }

        if distinct.len() < max_walks {
            log::debug!(
                "Found {} of {} requested walks for {} after {} attempts",
                distinct.len(),
                max_walks,
                root.name(),
                attempts
            );
        }
        distinct.into_values().collect()
    }

    fn sample_walk(&self, graph: &KnowledgeGraph, root: Arc<Vertex>, rng: &mut Pcg64) -> Walk {
        let mut walk = vec![root];

        for _ in 0..2 * self.depth {
            let next = match walk.last() {
                Some(current) => self.sampler.choose(graph, current, &walk, rng),
                None => None,
            };
            match next {
                Some(vertex) => walk.push(vertex),
                None => break,
            }
        }

        trim_dangling(&mut walk);
        walk
    }
}

impl Walker for RandomWalker {
    fn validate(&self) -> Result<()> {
        if self.walks_per_entity == Some(0) {
            return Err(GraphError::invalid_parameter(
                "walks_per_entity must be greater than 0",
            ));
        }
        if self.n_jobs == 0 {
            return Err(GraphError::invalid_parameter("n_jobs must be greater than 0"));
        }
        Ok(())
    }

    fn prepare(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        self.sampler.fit(graph)
    }

    fn extract_entity(&self, graph: &KnowledgeGraph, entity: &str) -> Vec<Vec<String>> {
        self.extract_random_walks(graph, entity)
            .iter()
            .map(|walk| walk_names(walk))
            .collect()
    }

    fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Vertex names of a walk, the key walks are deduplicated on.
pub fn walk_names(walk: &[Arc<Vertex>]) -> Vec<String> {
    walk.iter().map(|vertex| vertex.name().to_string()).collect()
}

fn dedup_walks(walks: Vec<Walk>) -> Vec<Walk> {
    let mut distinct: BTreeMap<Vec<String>, Walk> = BTreeMap::new();
    for walk in walks {
        distinct.entry(walk_names(&walk)).or_insert(walk);
    }
    distinct.into_values().collect()
}

/// Walks end on an entity; drop an edge label left without its object.
fn trim_dangling(walk: &mut Walk) {
    if walk.len() > 1 && walk.last().is_some_and(|vertex| vertex.is_predicate()) {
        walk.pop();
    }
}
