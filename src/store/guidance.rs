use super::errors::StoreError;
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Language-instruction embeddings, grouped by operator category.
///
/// Each category (e.g. `"sequential"`, `"reverse"`) maps phrasing ids to one
/// embedding per phrasing. Phrasings inside a category are interchangeable, so
/// ingestion draws one of them at random.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageGuidance {
    categories: HashMap<String, BTreeMap<String, Vec<f32>>>,
}

impl LanguageGuidance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert(
        &mut self,
        category: impl Into<String>,
        phrasing: impl Into<String>,
        embedding: Vec<f32>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(phrasing.into(), embedding);
    }

    pub fn phrasings(&self, category: &str) -> Option<&BTreeMap<String, Vec<f32>>> {
        self.categories.get(category)
    }

    /// Uniformly pick one embedding registered under `category`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng: &mut R,
    ) -> Result<Array1<f32>, StoreError> {
        self.choose(category, rng).map(|(_, embedding)| embedding)
    }

    /// Like [`LanguageGuidance::sample`], also returning the phrasing id drawn.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng: &mut R,
    ) -> Result<(&str, Array1<f32>), StoreError> {
        let phrasings = self
            .categories
            .get(category)
            .ok_or_else(|| StoreError::UnknownOperator(category.to_string()))?;
        if phrasings.is_empty() {
            return Err(StoreError::EmptyOperator(category.to_string()));
        }
        let pick = rng.gen_range(0..phrasings.len());
        let (phrasing, embedding) = phrasings
            .iter()
            .nth(pick)
            .ok_or_else(|| StoreError::EmptyOperator(category.to_string()))?;
        Ok((phrasing.as_str(), Array1::from_vec(embedding.clone())))
    }
}
