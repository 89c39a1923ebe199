use std::sync::Arc;

use arrow::array::{StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Canonical walks grouped by root entity, in the order entities were
/// submitted. Each walk is a sequence of vertex names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    walks: IndexMap<String, Vec<Vec<String>>>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append walks for `entity`, after any walks already recorded for it.
    pub fn insert<S: Into<String>>(&mut self, entity: S, walks: Vec<Vec<String>>) {
        self.walks.entry(entity.into()).or_default().extend(walks);
    }

    pub fn extend(&mut self, other: Corpus) {
        for (entity, walks) in other.walks {
            self.insert(entity, walks);
        }
    }

    pub fn walks_for(&self, entity: &str) -> Option<&[Vec<String>]> {
        self.walks.get(entity).map(Vec::as_slice)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.walks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec<String>])> {
        self.walks
            .iter()
            .map(|(entity, walks)| (entity.as_str(), walks.as_slice()))
    }

    /// Every walk, flattened in entity order.
    pub fn sentences(&self) -> impl Iterator<Item = &Vec<String>> {
        self.walks.values().flatten()
    }

    pub fn to_sentences(&self) -> Vec<Vec<String>> {
        self.sentences().cloned().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.walks.len()
    }

    /// Total number of walks.
    pub fn len(&self) -> usize {
        self.walks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.walks.clear();
    }

    /// Long-format Arrow view of the corpus: one row per token.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("entity", DataType::Utf8, false),
            Field::new("walk_id", DataType::UInt32, false),
            Field::new("step", DataType::UInt32, false),
            Field::new("token", DataType::Utf8, false),
        ]));

        let mut entities = Vec::new();
        let mut walk_ids = Vec::new();
        let mut steps = Vec::new();
        let mut tokens = Vec::new();

        let mut walk_id = 0u32;
        for (entity, walks) in &self.walks {
            for walk in walks {
                for (step, token) in walk.iter().enumerate() {
                    entities.push(entity.as_str());
                    walk_ids.push(walk_id);
                    steps.push(step as u32);
                    tokens.push(token.as_str());
                }
                walk_id += 1;
            }
        }

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(entities)),
                Arc::new(UInt32Array::from(walk_ids)),
                Arc::new(UInt32Array::from(steps)),
                Arc::new(StringArray::from(tokens)),
            ],
        )
        .map_err(GraphError::from)
    }
}
