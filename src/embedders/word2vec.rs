use indexmap::IndexMap;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::embedders::Embedder;
use crate::error::{GraphError, Result};

const MAX_EXP: f64 = 6.0;
const MIN_LEARNING_RATE_RATIO: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Word2VecConfig {
    pub vector_size: usize,
    pub window: usize,
    pub epochs: usize,
    pub negative: usize,
    pub learning_rate: f64,
    pub min_count: usize,
    pub seed: u64,
}

impl Default for Word2VecConfig {
    fn default() -> Self {
        Self {
            vector_size: 100,
            window: 5,
            epochs: 10,
            negative: 5,
            learning_rate: 0.025,
            min_count: 1,
            seed: 42,
        }
    }
}

/// Skip-gram with negative sampling.
///
/// Training is single threaded and fully determined by the configured seed,
/// so a fixed corpus always yields the same vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Word2Vec {
    config: Word2VecConfig,
    vocab: IndexMap<String, usize>,
    counts: Vec<usize>,
    input: Vec<Vec<f64>>,
    output: Vec<Vec<f64>>,
}

impl Word2Vec {
    pub fn new(config: Word2VecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Word2VecConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocab.is_empty()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    pub fn vector(&self, token: &str) -> Option<&[f64]> {
        self.vocab.get(token).map(|&index| self.input[index].as_slice())
    }

    /// Cosine similarity between two tokens' vectors.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let emb1 = self.vector(a)?;
        let emb2 = self.vector(b)?;

        let dot_product: f64 = emb1.iter().zip(emb2.iter()).map(|(x, y)| x * y).sum();
        let norm1: f64 = emb1.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm2: f64 = emb2.iter().map(|x| x * x).sum::<f64>().sqrt();

        if norm1 > 0.0 && norm2 > 0.0 {
            Some(dot_product / (norm1 * norm2))
        } else {
            None
        }
    }

    /// The `k` tokens closest to `token` by cosine similarity.
    pub fn most_similar(&self, token: &str, k: usize) -> Vec<(String, f64)> {
        let mut similarities: Vec<(String, f64)> = self
            .vocab
            .keys()
            .filter(|other| other.as_str() != token)
            .filter_map(|other| {
                self.similarity(token, other)
                    .map(|sim| (other.clone(), sim))
            })
            .collect();

        similarities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        similarities.truncate(k);
        similarities
    }

    fn build_vocab(&mut self, corpus: &[Vec<String>]) {
        let mut frequencies: IndexMap<&str, usize> = IndexMap::new();
        for sentence in corpus {
            for token in sentence {
                *frequencies.entry(token.as_str()).or_default() += 1;
            }
        }

        self.vocab.clear();
        self.counts.clear();
        for (token, count) in frequencies {
            if count >= self.config.min_count {
                self.vocab.insert(token.to_string(), self.counts.len());
                self.counts.push(count);
            }
        }
    }

    fn train_pair(
        &mut self,
        center: usize,
        context: usize,
        noise: &WeightedIndex<f64>,
        learning_rate: f64,
        rng: &mut Pcg64,
    ) {
        let dimension = self.config.vector_size;
        let mut gradient = vec![0.0; dimension];

        let mut targets = Vec::with_capacity(self.config.negative + 1);
        targets.push((context, 1.0));
        for _ in 0..self.config.negative {
            let negative = noise.sample(rng);
            if negative != context {
                targets.push((negative, 0.0));
            }
        }

        let center_vector = &self.input[center];
        for (target, label) in targets {
            let target_vector = &mut self.output[target];
            let dot: f64 = center_vector
                .iter()
                .zip(target_vector.iter())
                .map(|(a, b)| a * b)
                .sum();
            let g = (label - sigmoid(dot)) * learning_rate;
            for ((grad, target), center) in gradient
                .iter_mut()
                .zip(target_vector.iter_mut())
                .zip(center_vector.iter())
            {
                *grad += g * *target;
                *target += g * center;
            }
        }

        for (value, delta) in self.input[center].iter_mut().zip(gradient) {
            *value += delta;
        }
    }
}

impl Embedder for Word2Vec {
    const NAME: &'static str = "word2vec";

    fn fit(&mut self, corpus: &[Vec<String>]) -> Result<()> {
        if self.config.vector_size == 0 {
            return Err(GraphError::invalid_parameter("vector_size must be greater than 0"));
        }

        self.build_vocab(corpus);
        if self.vocab.is_empty() {
            return Err(GraphError::invalid_parameter(
                "corpus produced an empty vocabulary",
            ));
        }

        let dimension = self.config.vector_size;
        let mut rng = Pcg64::seed_from_u64(self.config.seed);
        self.input = (0..self.vocab.len())
            .map(|_| {
                (0..dimension)
                    .map(|_| (rng.gen::<f64>() - 0.5) / dimension as f64)
                    .collect()
            })
            .collect();
        self.output = vec![vec![0.0; dimension]; self.vocab.len()];

        let noise = WeightedIndex::new(self.counts.iter().map(|&c| (c as f64).powf(0.75)))
            .map_err(|e| GraphError::invalid_parameter(format!("noise distribution: {e}")))?;

        let sentences: Vec<Vec<usize>> = corpus
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .filter_map(|token| self.vocab.get(token.as_str()).copied())
                    .collect()
            })
            .collect();

        let tokens_per_epoch: usize = sentences.iter().map(Vec::len).sum();
        let total_tokens = (tokens_per_epoch * self.config.epochs).max(1);
        let mut processed = 0usize;

        for _ in 0..self.config.epochs {
            for sentence in &sentences {
                for (i, &center) in sentence.iter().enumerate() {
                    let progress = processed as f64 / total_tokens as f64;
                    let learning_rate = self.config.learning_rate
                        * (1.0 - progress).max(MIN_LEARNING_RATE_RATIO);
                    processed += 1;

                    let start = i.saturating_sub(self.config.window);
                    let end = (i + self.config.window + 1).min(sentence.len());
                    for j in start..end {
                        if j != i {
                            self.train_pair(center, sentence[j], &noise, learning_rate, &mut rng);
                        }
                    }
                }
            }
        }

        log::debug!(
            "Trained word2vec on {} sentences, vocabulary of {} tokens",
            sentences.len(),
            self.vocab.len()
        );
        Ok(())
    }

    fn transform(&self, entities: &[String]) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(GraphError::NotFitted);
        }
        entities
            .iter()
            .map(|entity| {
                self.vector(entity)
                    .map(<[f64]>::to_vec)
                    .ok_or_else(|| GraphError::entity_not_embedded(entity.as_str()))
            })
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}
