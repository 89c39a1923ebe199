pub mod graph;
pub mod samplers;
pub mod walkers;
pub mod embedders;
pub mod corpus;
pub mod transformer;
pub mod error;

pub use graph::{KnowledgeGraph, Neighbors, Vertex, VertexRole};
pub use samplers::{Sampler, SamplerKind, UniformSampler, FrequencySampler, PageRankSampler};
pub use walkers::{Walk, Walker, WalkerKind, RandomWalker, WalkletWalker};
pub use embedders::{Embedder, Word2Vec, Word2VecConfig};
pub use corpus::Corpus;
pub use transformer::{Rdf2VecTransformer, TransformerConfig};
pub use error::{GraphError, Result};

pub mod prelude {
    pub use crate::graph::{KnowledgeGraph, Neighbors, Vertex, VertexRole};
    pub use crate::samplers::{Sampler, SamplerKind, UniformSampler, FrequencySampler, PageRankSampler};
    pub use crate::walkers::{Walk, Walker, WalkerKind, RandomWalker, WalkletWalker};
    pub use crate::embedders::{Embedder, Word2Vec, Word2VecConfig};
    pub use crate::corpus::Corpus;
    pub use crate::transformer::{Rdf2VecTransformer, TransformerConfig};
    pub use crate::error::{GraphError, Result};
}
