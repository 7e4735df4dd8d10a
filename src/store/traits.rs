use super::errors::StoreError;

/// One raw trajectory record, keyed by field name.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Read-only access to stored trajectories.
pub trait TrajectoryStore: Send + Sync {
    fn load(&self, id: &str) -> Result<RawRecord, StoreError>;
}
