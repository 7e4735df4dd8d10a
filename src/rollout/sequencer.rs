use super::errors::RolloutError;
use crate::config::SkillAdvancement;
use crate::models::{ModelError, TerminationDetector};
use ndarray::{Array1, Array2, ArrayView1};

/// Tracks which target skill is executing and decides when to move on.
///
/// The index only ever moves forward and saturates at the last target skill,
/// which is then reused for the rest of the episode.
#[derive(Debug, Clone)]
pub struct SkillSequencer {
    target_skills: Array2<f32>,
    skill_index: usize,
    first_observation: Array1<f32>,
    advancement: SkillAdvancement,
    termination_pred_interval: usize,
    advances: usize,
}

impl SkillSequencer {
    pub fn new(
        target_skills: Array2<f32>,
        first_observation: Array1<f32>,
        advancement: SkillAdvancement,
        termination_pred_interval: usize,
    ) -> Result<Self, RolloutError> {
        if target_skills.nrows() == 0 {
            return Err(RolloutError::NoTargetSkills);
        }
        if termination_pred_interval == 0 {
            return Err(RolloutError::ZeroInterval);
        }
        Ok(Self {
            target_skills,
            skill_index: 0,
            first_observation,
            advancement,
            termination_pred_interval,
            advances: 0,
        })
    }

    pub fn skill_index(&self) -> usize {
        self.skill_index
    }

    pub fn n_skills(&self) -> usize {
        self.target_skills.nrows()
    }

    /// How many times the index actually moved.
    pub fn advances(&self) -> usize {
        self.advances
    }

    pub fn is_saturated(&self) -> bool {
        self.skill_index + 1 == self.n_skills()
    }

    pub fn current_skill(&self) -> ArrayView1<'_, f32> {
        self.target_skills.row(self.skill_index)
    }

    /// Observation recorded when the current skill began.
    pub fn first_observation(&self) -> ArrayView1<'_, f32> {
        self.first_observation.view()
    }

    /// Whether the learned detector is consulted at `timestep`.
    ///
    /// Fires when `(timestep - 1) mod interval == 0`, with the remainder taken
    /// as non-negative, so timestep 0 only fires for an interval of 1.
    pub fn polls_at(&self, timestep: usize) -> bool {
        let interval = self.termination_pred_interval as i64;
        (timestep as i64 - 1).rem_euclid(interval) == 0
    }

    /// Moves to the next skill unless already on the last one.
    ///
    /// `observation` becomes the first observation of the new skill. Returns
    /// whether the index changed.
    pub fn advance(&mut self, observation: ArrayView1<'_, f32>) -> bool {
        if self.is_saturated() {
            return false;
        }
        self.skill_index += 1;
        self.advances += 1;
        self.first_observation = observation.to_owned();
        true
    }

    /// Applies the configured advancement rule for the step about to be taken.
    ///
    /// `last_reward` is the reward of the previous environment step, `None`
    /// before the first step.
    pub fn update<D: TerminationDetector + ?Sized>(
        &mut self,
        timestep: usize,
        last_reward: Option<f32>,
        observation: ArrayView1<'_, f32>,
        termination: &D,
    ) -> Result<bool, ModelError> {
        let skill_done = match self.advancement {
            SkillAdvancement::Oracle => last_reward.is_some_and(|r| r > 0.0),
            SkillAdvancement::Learned => {
                self.polls_at(timestep)
                    && termination.predict_binary(
                        observation,
                        self.first_observation.view(),
                        self.current_skill(),
                    )?
            }
        };
        Ok(skill_done && self.advance(observation))
    }
}
