use super::errors::ModelError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Completion scores at or above this value count as "skill done".
pub const TERMINATION_THRESHOLD: f32 = 0.5;

/// Sequence model that rewrites a source skill sequence under a language operator.
pub trait SkillTranslator: Send + Sync {
    /// `source_skills` is `[n_skills, skill_dim]`; the result is the target
    /// sequence in the same layout.
    fn predict(
        &self,
        source_skills: ArrayView2<'_, f32>,
        language_operator: ArrayView1<'_, f32>,
    ) -> Result<Array2<f32>, ModelError>;
}

/// Skill-conditioned low-level controller.
///
/// Inputs are the full history accumulated by the rollout so far: `observations`
/// and `skills` have one row per visited timestep, `actions` one row per action
/// already taken (so one fewer than `observations`).
pub trait LowPolicy: Send + Sync {
    fn skill_dim(&self) -> usize;

    fn predict(
        &self,
        observations: ArrayView2<'_, f32>,
        actions: ArrayView2<'_, f32>,
        skills: ArrayView2<'_, f32>,
        timesteps: ArrayView1<'_, usize>,
    ) -> Result<Array1<f32>, ModelError>;
}

/// Classifier deciding whether the executing skill has completed.
pub trait TerminationDetector: Send + Sync {
    /// Raw completion score for the current skill.
    fn predict(
        &self,
        observation: ArrayView1<'_, f32>,
        first_observation: ArrayView1<'_, f32>,
        skill: ArrayView1<'_, f32>,
    ) -> Result<f32, ModelError>;

    fn predict_binary(
        &self,
        observation: ArrayView1<'_, f32>,
        first_observation: ArrayView1<'_, f32>,
        skill: ArrayView1<'_, f32>,
    ) -> Result<bool, ModelError> {
        Ok(self.predict(observation, first_observation, skill)? >= TERMINATION_THRESHOLD)
    }
}
