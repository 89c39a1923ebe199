pub mod word2vec;

pub use word2vec::{Word2Vec, Word2VecConfig};

use crate::error::Result;

/// Sequence-embedding model trained on a walk corpus.
pub trait Embedder: Send {
    /// Identifier recorded in persisted transformers.
    const NAME: &'static str;

    /// Train on the corpus, replacing any previous state.
    fn fit(&mut self, corpus: &[Vec<String>]) -> Result<()>;

    /// Vectors for `entities`, in the same order.
    fn transform(&self, entities: &[String]) -> Result<Vec<Vec<f64>>>;
}
