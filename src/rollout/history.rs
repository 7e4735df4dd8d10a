use super::errors::RolloutError;
use crate::env::Step;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::Serialize;
use uuid::Uuid;

/// Per-step record of one rollout, stored row-major in flat buffers.
///
/// Row `t` of `observations`, `skills`, `timesteps` and `skill_indices` is
/// the state seen before action `t`; `actions`, `rewards`, `dones` and
/// `infos` have one entry per completed environment step, so they are always
/// one row shorter.
#[derive(Debug, Clone)]
pub struct RolloutHistory {
    obs_dim: usize,
    act_dim: usize,
    skill_dim: usize,
    observations: Vec<f32>,
    actions: Vec<f32>,
    skills: Vec<f32>,
    timesteps: Vec<usize>,
    skill_indices: Vec<usize>,
    rewards: Vec<f32>,
    dones: Vec<bool>,
    infos: Vec<serde_json::Value>,
}

impl RolloutHistory {
    /// Reserves room for `capacity` steps up front.
    pub fn with_capacity(capacity: usize, obs_dim: usize, act_dim: usize, skill_dim: usize) -> Self {
        let rows = capacity + 1;
        Self {
            obs_dim,
            act_dim,
            skill_dim,
            observations: Vec::with_capacity(rows * obs_dim),
            actions: Vec::with_capacity(capacity * act_dim),
            skills: Vec::with_capacity(rows * skill_dim),
            timesteps: Vec::with_capacity(rows),
            skill_indices: Vec::with_capacity(rows),
            rewards: Vec::with_capacity(capacity),
            dones: Vec::with_capacity(capacity),
            infos: Vec::with_capacity(capacity),
        }
    }

    /// Number of recorded observations.
    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    /// Number of completed environment steps.
    pub fn steps(&self) -> usize {
        self.rewards.len()
    }

    pub fn last_reward(&self) -> Option<f32> {
        self.rewards.last().copied()
    }

    pub fn observations(&self) -> Result<ArrayView2<'_, f32>, RolloutError> {
        Ok(ArrayView2::from_shape((self.len(), self.obs_dim), &self.observations[..])?)
    }

    pub fn actions(&self) -> Result<ArrayView2<'_, f32>, RolloutError> {
        Ok(ArrayView2::from_shape((self.steps(), self.act_dim), &self.actions[..])?)
    }

    pub fn skills(&self) -> Result<ArrayView2<'_, f32>, RolloutError> {
        Ok(ArrayView2::from_shape((self.len(), self.skill_dim), &self.skills[..])?)
    }

    pub fn timesteps(&self) -> ArrayView1<'_, usize> {
        ArrayView1::from(&self.timesteps[..])
    }

    pub fn skill_indices(&self) -> &[usize] {
        &self.skill_indices
    }

    /// Records the reset observation at timestep 0.
    pub fn start(
        &mut self,
        observation: ArrayView1<'_, f32>,
        skill: ArrayView1<'_, f32>,
        skill_index: usize,
    ) -> Result<(), RolloutError> {
        self.push_state(observation, skill, skill_index, 0)
    }

    /// Records one environment step: the action taken, its outcome, and the
    /// skill selected for the new observation.
    pub fn record_step(
        &mut self,
        action: ArrayView1<'_, f32>,
        step: &Step,
        skill: ArrayView1<'_, f32>,
        skill_index: usize,
    ) -> Result<(), RolloutError> {
        check_width("action", self.act_dim, action.len())?;
        let timestep = self.len();
        self.push_state(step.obs.view(), skill, skill_index, timestep)?;
        self.actions.extend(action.iter().copied());
        self.rewards.push(step.rew);
        self.dones.push(step.done);
        self.infos.push(step.info.clone());
        Ok(())
    }

    fn push_state(
        &mut self,
        observation: ArrayView1<'_, f32>,
        skill: ArrayView1<'_, f32>,
        skill_index: usize,
        timestep: usize,
    ) -> Result<(), RolloutError> {
        check_width("observation", self.obs_dim, observation.len())?;
        check_width("skill", self.skill_dim, skill.len())?;
        self.observations.extend(observation.iter().copied());
        self.skills.extend(skill.iter().copied());
        self.timesteps.push(timestep);
        self.skill_indices.push(skill_index);
        Ok(())
    }

    pub fn into_result(
        self,
        skill_advances: usize,
        truncated: bool,
    ) -> Result<RolloutResult, RolloutError> {
        let rows = self.len();
        let steps = self.steps();
        let total_return = self.rewards.iter().sum();
        Ok(RolloutResult {
            id: Uuid::new_v4(),
            observations: Array2::from_shape_vec((rows, self.obs_dim), self.observations)?,
            actions: Array2::from_shape_vec((steps, self.act_dim), self.actions)?,
            skills: Array2::from_shape_vec((rows, self.skill_dim), self.skills)?,
            timesteps: self.timesteps,
            skill_indices: self.skill_indices,
            rewards: self.rewards,
            dones: self.dones,
            infos: self.infos,
            total_return,
            steps,
            skill_advances,
            truncated,
        })
    }
}

fn check_width(what: &'static str, expected: usize, got: usize) -> Result<(), RolloutError> {
    if expected == got {
        Ok(())
    } else {
        Err(RolloutError::Width {
            what,
            expected,
            got,
        })
    }
}

/// Everything recorded during one evaluation episode.
#[derive(Debug, Clone, Serialize)]
pub struct RolloutResult {
    pub id: Uuid,
    pub observations: Array2<f32>,
    pub actions: Array2<f32>,
    pub skills: Array2<f32>,
    pub timesteps: Vec<usize>,
    /// Target-skill index active at each recorded observation.
    pub skill_indices: Vec<usize>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    pub infos: Vec<serde_json::Value>,
    pub total_return: f32,
    pub steps: usize,
    pub skill_advances: usize,
    /// The step budget ran out before the environment finished.
    pub truncated: bool,
}
