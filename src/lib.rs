//! Skill-segmented trajectory buffer, skill-sequenced rollouts and the
//! training/evaluation plumbing around them.

pub mod buffer;
pub mod config;
pub mod env;
pub mod evaluation;
pub mod learner;
pub mod models;
pub mod rollout;
pub mod store;
pub mod train;

pub use buffer::{Episode, SkillBatch, SkillBuffer};
pub use config::SkillweaveConfig;
pub use rollout::{RolloutResult, SkillRollout};
pub use train::{TrainError, TrainingStats, train};
