use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::embedders::{Embedder, Word2Vec, Word2VecConfig};
use crate::error::{GraphError, Result};
use crate::graph::KnowledgeGraph;
use crate::walkers::{Walker, WalkerKind};

const MAGIC: &[u8; 8] = b"KG2VEC\0\0";
const FORMAT_VERSION: u32 = 1;

/// Walkers and embedder settings for a [`Rdf2VecTransformer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    pub walkers: Vec<WalkerKind>,
    pub embedder: Word2VecConfig,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            walkers: vec![WalkerKind::default()],
            embedder: Word2VecConfig::default(),
        }
    }
}

impl TransformerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Turns entities of a knowledge graph into embeddings: extracts walks with
/// every configured walker, then trains the embedder on the resulting corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rdf2VecTransformer<E = Word2Vec> {
    embedder: E,
    walkers: Vec<WalkerKind>,
    walks: Corpus,
}

impl Default for Rdf2VecTransformer<Word2Vec> {
    fn default() -> Self {
        Self::from_config(TransformerConfig::default())
    }
}

impl Rdf2VecTransformer<Word2Vec> {
    pub fn from_config(config: TransformerConfig) -> Self {
        Self::new(Word2Vec::new(config.embedder), config.walkers)
    }
}

impl<E: Embedder> Rdf2VecTransformer<E> {
    pub fn new(embedder: E, walkers: Vec<WalkerKind>) -> Self {
        Self {
            embedder,
            walkers,
            walks: Corpus::new(),
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn walkers(&self) -> &[WalkerKind] {
        &self.walkers
    }

    /// Every walk extracted so far, across all `fit` calls.
    pub fn walks(&self) -> &Corpus {
        &self.walks
    }

    fn validate_entities(graph: &KnowledgeGraph, entities: &[String]) -> Result<()> {
        if entities.is_empty() {
            return Err(GraphError::invalid_parameter("at least one entity is required"));
        }
        if graph.is_remote() {
            return Ok(());
        }

        let missing: Vec<String> = entities
            .iter()
            .filter(|entity| !graph.contains_entity(entity))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphError::InvalidEntities(missing))
        }
    }

    /// Extract walks for `entities` and train the embedder on all walks
    /// accumulated so far. Nothing is extracted if any entity is unknown to a
    /// local graph, and the stored walks only change when training succeeds.
    pub fn fit(&mut self, graph: &KnowledgeGraph, entities: &[String]) -> Result<&mut Self> {
        Self::validate_entities(graph, entities)?;
        for walker in &self.walkers {
            walker.validate()?;
        }
        if !self.walks.is_empty() {
            log::warn!(
                "Refitting on top of {} previously extracted walks",
                self.walks.len()
            );
        }

        let start = Instant::now();
        let mut extracted = Corpus::new();
        for walker in &mut self.walkers {
            extracted.extend(walker.extract(graph, entities)?);
        }
        log::info!(
            "Extracted {} walks for {} entities ({:.4}s)",
            extracted.len(),
            entities.len(),
            start.elapsed().as_secs_f64()
        );

        let mut walks = self.walks.clone();
        walks.extend(extracted);
        self.embedder.fit(&walks.to_sentences())?;
        self.walks = walks;
        Ok(self)
    }

    /// Embeddings of `entities`, which must have been part of a previous `fit`.
    pub fn transform(&self, entities: &[String]) -> Result<Vec<Vec<f64>>> {
        self.embedder.transform(entities)
    }

    pub fn fit_transform(
        &mut self,
        graph: &KnowledgeGraph,
        entities: &[String],
    ) -> Result<Vec<Vec<f64>>> {
        self.fit(graph, entities)?;
        self.transform(entities)
    }
}

impl<E: Embedder + Serialize + DeserializeOwned> Rdf2VecTransformer<E> {
    /// Encode the whole transformer: header, embedder name, bincode payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, E::NAME)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Decode a transformer produced by [`to_bytes`](Self::to_bytes). Blobs
    /// for another format version or embedder are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;
        Self::read_from(&mut cursor)
    }

    fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 8];
        reader
            .read_exact(&mut magic)
            .map_err(|_| GraphError::load("blob is too short"))?;
        if &magic != MAGIC {
            return Err(GraphError::load("not a transformer blob"));
        }

        let mut version = [0u8; 4];
        reader
            .read_exact(&mut version)
            .map_err(|_| GraphError::load("blob is too short"))?;
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(GraphError::load(format!(
                "unsupported format version {version}"
            )));
        }

        let embedder: String = bincode::deserialize_from(&mut reader)
            .map_err(|e| GraphError::load(format!("invalid embedder name: {e}")))?;
        if embedder != E::NAME {
            return Err(GraphError::load(format!(
                "blob holds a {embedder} transformer, expected {}",
                E::NAME
            )));
        }

        let transformer: Self = bincode::deserialize_from(&mut reader)
            .map_err(|e| GraphError::load(format!("invalid payload: {e}")))?;

        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing)? != 0 {
            return Err(GraphError::load("trailing bytes after payload"));
        }
        Ok(transformer)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(fs::File::create(path)?);
        self.write_to(writer)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(fs::File::open(path)?);
        Self::read_from(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walkers::{RandomWalker, WalkletWalker};
    use pretty_assertions::assert_eq;

    fn create_test_graph() -> KnowledgeGraph {
        KnowledgeGraph::from_triples(vec![
            ("A", "knows", "B"),
            ("A", "likes", "C"),
            ("B", "knows", "C"),
            ("C", "livesIn", "D"),
            ("D", "partOf", "E"),
        ])
    }

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_transformer() -> Rdf2VecTransformer {
        Rdf2VecTransformer::from_config(TransformerConfig {
            walkers: vec![
                RandomWalker::new(2, None).into(),
                WalkletWalker::new(2, Some(4)).with_seed(17).into(),
            ],
            embedder: Word2VecConfig {
                vector_size: 16,
                epochs: 5,
                ..Word2VecConfig::default()
            },
        })
    }

    #[test]
    fn test_fit_transform() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();
        let entities = entities(&["A", "B", "C"]);

        let embeddings = transformer.fit_transform(&graph, &entities).unwrap();
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings.iter().all(|v| v.len() == 16));

        // Both walkers contributed walks for every entity
        assert_eq!(transformer.walks().entity_count(), 3);
        assert!(transformer.walks().walks_for("A").unwrap().len() > 2);
    }

    #[test]
    fn test_fit_rejects_unknown_entities() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();

        let err = transformer
            .fit(&graph, &entities(&["A", "nowhere"]))
            .unwrap_err();
        match err {
            GraphError::InvalidEntities(missing) => assert_eq!(missing, vec!["nowhere".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(transformer.walks().is_empty());
        assert!(matches!(
            transformer.transform(&entities(&["A"])),
            Err(GraphError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_rejects_empty_entities() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();
        assert!(transformer.fit(&graph, &[]).is_err());
    }

    #[test]
    fn test_remote_graph_skips_entity_validation() {
        let graph = KnowledgeGraph::remote_backed();
        let mut transformer = create_transformer();

        transformer.fit(&graph, &entities(&["remote-only"])).unwrap();
        assert_eq!(
            transformer.walks().walks_for("remote-only").unwrap()[0],
            vec!["remote-only".to_string()]
        );
    }

    #[test]
    fn test_invalid_walker_aborts_before_extraction() {
        let graph = create_test_graph();
        let mut transformer = Rdf2VecTransformer::from_config(TransformerConfig {
            walkers: vec![
                RandomWalker::new(2, None).into(),
                RandomWalker::new(2, Some(0)).into(),
            ],
            ..TransformerConfig::default()
        });

        assert!(transformer.fit(&graph, &entities(&["A"])).is_err());
        assert!(transformer.walks().is_empty());
    }

    #[test]
    fn test_failed_training_keeps_previous_walks() {
        let graph = KnowledgeGraph::from_triples(vec![("A", "p", "B")]);
        let mut transformer = Rdf2VecTransformer::from_config(TransformerConfig {
            embedder: Word2VecConfig {
                vector_size: 0,
                ..Word2VecConfig::default()
            },
            ..TransformerConfig::default()
        });

        assert!(matches!(
            transformer.fit(&graph, &entities(&["A"])),
            Err(GraphError::InvalidParameter(_))
        ));
        assert!(transformer.walks().is_empty());

        assert!(transformer.fit(&graph, &entities(&["A"])).is_err());
        assert!(transformer.walks().is_empty());
    }

    #[test]
    fn test_transform_requires_fitted_entity() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();
        transformer.fit(&graph, &entities(&["A"])).unwrap();

        assert!(matches!(
            transformer.transform(&entities(&["unrelated"])),
            Err(GraphError::EntityNotEmbedded(_))
        ));
    }

    #[test]
    fn test_persistence_round_trip() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();
        let entities = entities(&["A", "B", "C", "D"]);
        transformer.fit(&graph, &entities).unwrap();

        let bytes = transformer.to_bytes().unwrap();
        let restored: Rdf2VecTransformer = Rdf2VecTransformer::from_bytes(&bytes).unwrap();

        assert_eq!(
            transformer.transform(&entities).unwrap(),
            restored.transform(&entities).unwrap()
        );
        assert_eq!(transformer.walks(), restored.walks());
        assert_eq!(restored.walkers().len(), 2);
    }

    #[test]
    fn test_save_and_load_file() {
        let graph = create_test_graph();
        let mut transformer = create_transformer();
        let entities = entities(&["A", "E"]);
        transformer.fit(&graph, &entities).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transformer.bin");
        transformer.save(&path).unwrap();

        let restored = Rdf2VecTransformer::<Word2Vec>::load(&path).unwrap();
        assert_eq!(
            transformer.transform(&entities).unwrap(),
            restored.transform(&entities).unwrap()
        );
    }

    #[test]
    fn test_load_rejects_foreign_blobs() {
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(b"not a transformer at all"),
            Err(GraphError::Load(_))
        ));
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(b"KG2"),
            Err(GraphError::Load(_))
        ));

        let graph = create_test_graph();
        let mut transformer = create_transformer();
        transformer.fit(&graph, &entities(&["A"])).unwrap();
        let bytes = transformer.to_bytes().unwrap();

        let mut wrong_version = bytes.clone();
        wrong_version[8] = 99;
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(&wrong_version),
            Err(GraphError::Load(_))
        ));

        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(truncated),
            Err(GraphError::Load(_))
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(&trailing),
            Err(GraphError::Load(_))
        ));
    }

    #[test]
    fn test_load_rejects_other_embedder() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Constant {
            fitted: bool,
        }

        impl Embedder for Constant {
            const NAME: &'static str = "constant";

            fn fit(&mut self, _corpus: &[Vec<String>]) -> Result<()> {
                self.fitted = true;
                Ok(())
            }

            fn transform(&self, entities: &[String]) -> Result<Vec<Vec<f64>>> {
                Ok(vec![vec![1.0]; entities.len()])
            }
        }

        let graph = create_test_graph();
        let mut transformer = Rdf2VecTransformer::new(Constant::default(), vec![WalkerKind::default()]);
        transformer.fit(&graph, &entities(&["A"])).unwrap();
        assert!(transformer.embedder().fitted);

        let bytes = transformer.to_bytes().unwrap();
        assert!(Rdf2VecTransformer::<Constant>::from_bytes(&bytes).is_ok());
        assert!(matches!(
            Rdf2VecTransformer::<Word2Vec>::from_bytes(&bytes),
            Err(GraphError::Load(_))
        ));
    }

    #[test]
    fn test_config_from_json() {
        let config = TransformerConfig::from_json_str(
            r#"{
                "walkers": [
                    {"random": {"depth": 3, "walks_per_entity": 10, "sampler": {"uniform": null}, "n_jobs": 2, "seed": 7}},
                    {"walklet": {"walker": {"depth": 1, "walks_per_entity": null, "sampler": {"page_rank": {"damping_factor": 0.9, "max_iterations": 50, "tolerance": 0.0001, "inverse": true}}, "n_jobs": 1, "seed": null}}}
                ],
                "embedder": {"vector_size": 32}
            }"#,
        )
        .unwrap();

        assert_eq!(config.walkers.len(), 2);
        assert_eq!(config.embedder.vector_size, 32);
        assert_eq!(config.embedder.window, 5);
        match &config.walkers[0] {
            WalkerKind::Random(walker) => {
                assert_eq!(walker.depth, 3);
                assert_eq!(walker.walks_per_entity, Some(10));
                assert_eq!(walker.seed, Some(7));
            }
            other => panic!("unexpected walker: {other:?}"),
        }
        assert_eq!(config.walkers[1].name(), "walklet");
    }

    #[test]
    fn test_config_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"walkers": [{"walklet": {"walker": {"depth": 2, "walks_per_entity": 5, "sampler": {"uniform": null}, "n_jobs": 1, "seed": 3}}}], "embedder": {"vector_size": 12, "epochs": 2}}"#,
        )
        .unwrap();

        let config = TransformerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.walkers.len(), 1);
        assert_eq!(config.walkers[0].name(), "walklet");
        assert_eq!(config.embedder.vector_size, 12);
        assert_eq!(config.embedder.epochs, 2);

        assert!(matches!(
            TransformerConfig::from_json_file(dir.path().join("missing.json")),
            Err(GraphError::Io(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = TransformerConfig::from_json_str("{}").unwrap();
        assert_eq!(config.walkers.len(), 1);
        assert_eq!(config.walkers[0].name(), "random");
    }
}
