use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::graph::{KnowledgeGraph, Vertex};
use crate::walkers::{RandomWalker, WalkletWalker};

/// A path from a root entity, alternating entity and predicate vertices.
pub type Walk = Vec<Arc<Vertex>>;

/// Walk extraction strategy.
pub trait Walker: Send + Sync {
    /// Check the configuration without touching any graph.
    fn validate(&self) -> Result<()>;

    /// Fit any graph-dependent state (e.g. sampler statistics).
    fn prepare(&mut self, graph: &KnowledgeGraph) -> Result<()>;

    /// Canonical token sequences rooted at `entity`.
    fn extract_entity(&self, graph: &KnowledgeGraph, entity: &str) -> Vec<Vec<String>>;

    /// Worker threads used by [`extract`](Self::extract).
    fn n_jobs(&self) -> usize;

    fn name(&self) -> &'static str;

    /// Extract walks for every entity. Entities are processed in parallel on
    /// `n_jobs` threads; the corpus keeps the submission order.
    fn extract(&mut self, graph: &KnowledgeGraph, entities: &[String]) -> Result<Corpus> {
        self.validate()?;
        self.prepare(graph)?;

        let walker = &*self;
        let per_entity = map_entities(walker.n_jobs(), entities, |entity| {
            walker.extract_entity(graph, entity)
        })?;

        let mut corpus = Corpus::new();
        for (entity, walks) in entities.iter().zip(per_entity) {
            corpus.insert(entity.clone(), walks);
        }
        log::debug!(
            "{} walker extracted {} walks for {} entities",
            self.name(),
            corpus.len(),
            entities.len()
        );
        Ok(corpus)
    }
}

/// Run `f` over every entity, on a dedicated pool of `n_jobs` threads when
/// `n_jobs > 1`. Results are returned in input order.
pub(crate) fn map_entities<T, F>(n_jobs: usize, entities: &[String], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&str) -> T + Send + Sync,
{
    if n_jobs <= 1 || entities.len() <= 1 {
        return Ok(entities.iter().map(|entity| f(entity.as_str())).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(n_jobs).build()?;
    Ok(pool.install(|| entities.par_iter().map(|entity| f(entity.as_str())).collect()))
}

/// Serializable choice of walking strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkerKind {
    Random(RandomWalker),
    Walklet(WalkletWalker),
}

impl Default for WalkerKind {
    fn default() -> Self {
        WalkerKind::Random(RandomWalker::default())
    }
}

impl From<RandomWalker> for WalkerKind {
    fn from(walker: RandomWalker) -> Self {
        WalkerKind::Random(walker)
    }
}

impl From<WalkletWalker> for WalkerKind {
    fn from(walker: WalkletWalker) -> Self {
        WalkerKind::Walklet(walker)
    }
}

impl Walker for WalkerKind {
    fn validate(&self) -> Result<()> {
        match self {
            WalkerKind::Random(walker) => walker.validate(),
            WalkerKind::Walklet(walker) => walker.validate(),
        }
    }

    fn prepare(&mut self, graph: &KnowledgeGraph) -> Result<()> {
        match self {
            WalkerKind::Random(walker) => walker.prepare(graph),
            WalkerKind::Walklet(walker) => walker.prepare(graph),
        }
    }

    fn extract_entity(&self, graph: &KnowledgeGraph, entity: &str) -> Vec<Vec<String>> {
        match self {
            WalkerKind::Random(walker) => walker.extract_entity(graph, entity),
            WalkerKind::Walklet(walker) => walker.extract_entity(graph, entity),
        }
    }

    fn n_jobs(&self) -> usize {
        match self {
            WalkerKind::Random(walker) => walker.n_jobs(),
            WalkerKind::Walklet(walker) => walker.n_jobs(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            WalkerKind::Random(walker) => walker.name(),
            WalkerKind::Walklet(walker) => walker.name(),
        }
    }
}
