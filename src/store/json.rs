use super::errors::StoreError;
use super::traits::{RawRecord, TrajectoryStore};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One JSON object per trajectory, stored as `<root>/<id>` or `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonTrajectoryStore {
    root: PathBuf,
}

impl JsonTrajectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &str) -> Option<PathBuf> {
        let direct = self.root.join(id);
        if direct.is_file() {
            return Some(direct);
        }
        let with_ext = self.root.join(format!("{id}.json"));
        with_ext.is_file().then_some(with_ext)
    }
}

impl TrajectoryStore for JsonTrajectoryStore {
    fn load(&self, id: &str) -> Result<RawRecord, StoreError> {
        let path = self
            .resolve(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| StoreError::Json { path, source })?;
        match value {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject(id.to_string())),
        }
    }
}

/// In-process store; records are cloned out on every load.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrajectoryStore {
    records: HashMap<String, RawRecord>,
}

impl MemoryTrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, record: RawRecord) {
        self.records.insert(id.into(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TrajectoryStore for MemoryTrajectoryStore {
    fn load(&self, id: &str) -> Result<RawRecord, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
