use super::errors::LearnerError;
use crate::buffer::SkillBatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one gradient step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub loss: f32,
    /// Model version after the update.
    pub version: u64,
}

#[async_trait]
pub trait Learner: Send + Sync {
    async fn apply_gradient(&mut self, batch: &SkillBatch) -> Result<UpdateInfo, LearnerError>;

    /// Called once after the last update; persist weights here.
    async fn finish(&mut self) -> Result<(), LearnerError> {
        Ok(())
    }
}
