use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the `rtgs` column of an ingested episode is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtgMode {
    /// Zero-filled placeholder.
    #[default]
    Disabled,
    /// Undiscounted suffix sum of the recorded rewards.
    RewardToGo,
}

/// What ingestion does when one trajectory in a batch is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestFailurePolicy {
    /// Abort the whole call and leave the buffer untouched.
    #[default]
    FailBatch,
    /// Log the bad trajectory and keep going.
    SkipAndContinue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Length of every sampled subtrajectory.
    pub subseq_len: usize,
    /// Seed for the generator used during ingestion (language phrasing draws).
    pub seed: u64,
    pub rtg_mode: RtgMode,
    pub ingest_failure: IngestFailurePolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            subseq_len: 20,
            seed: 0,
            rtg_mode: RtgMode::Disabled,
            ingest_failure: IngestFailurePolicy::FailBatch,
        }
    }
}

/// Rule used by the rollout loop to decide when the current skill is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillAdvancement {
    /// Advance after any step with strictly positive reward.
    #[default]
    Oracle,
    /// Poll the termination detector every `termination_pred_interval` steps.
    Learned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    pub advancement: SkillAdvancement,
    pub termination_pred_interval: usize,
    /// Optional step budget. `None` runs until the environment reports done.
    pub max_steps: Option<usize>,
    /// Initial capacity of the per-step history, in timesteps.
    pub history_capacity: usize,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            advancement: SkillAdvancement::Oracle,
            termination_pred_interval: 10,
            max_steps: None,
            history_capacity: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub max_updates: u64,
    pub batch_size: usize,
    /// Number of concurrent minibatch samplers feeding the learner.
    pub num_samplers: usize,
    /// Minibatches buffered between samplers and learner.
    pub queue_depth: usize,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_updates: 1000,
            batch_size: 64,
            num_samplers: 2,
            queue_depth: 8,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillweaveConfig {
    pub buffer: BufferConfig,
    pub rollout: RolloutConfig,
    pub train: TrainConfig,
}

impl SkillweaveConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer.subseq_len == 0 {
            return Err(ConfigError::Invalid("buffer.subseq_len must be > 0".into()));
        }
        if self.rollout.termination_pred_interval == 0 {
            return Err(ConfigError::Invalid(
                "rollout.termination_pred_interval must be > 0".into(),
            ));
        }
        if self.train.batch_size == 0 || self.train.num_samplers == 0 {
            return Err(ConfigError::Invalid(
                "train.batch_size and train.num_samplers must be > 0".into(),
            ));
        }
        if self.train.queue_depth == 0 {
            return Err(ConfigError::Invalid("train.queue_depth must be > 0".into()));
        }
        Ok(())
    }
}
