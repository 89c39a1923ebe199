pub mod traits;
pub mod uniform;
pub mod frequency;
pub mod pagerank;

pub use traits::{Sampler, SamplerKind};
pub use uniform::UniformSampler;
pub use frequency::FrequencySampler;
pub use pagerank::PageRankSampler;
