//! Scripted collaborators for rollout and evaluation tests.

use crate::env::{Env, EnvError, Space, Step};
use crate::models::{LowPolicy, ModelError, SkillTranslator, TerminationDetector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::sync::Mutex;

/// Emits observation `[t, 0]` at step `t` and the scripted reward for that step.
pub(crate) struct ScriptedEnv {
    rewards: Box<dyn Fn(usize) -> f32 + Send>,
    horizon: Option<usize>,
    strict_actions: bool,
    t: usize,
}

impl ScriptedEnv {
    pub(crate) fn new(horizon: Option<usize>, rewards: impl Fn(usize) -> f32 + Send + 'static) -> Self {
        Self {
            rewards: Box::new(rewards),
            horizon,
            strict_actions: true,
            t: 0,
        }
    }

    /// Steps with actions of any width.
    pub(crate) fn accept_any_action(mut self) -> Self {
        self.strict_actions = false;
        self
    }

    /// Steps taken since the last reset.
    pub(crate) fn steps(&self) -> usize {
        self.t
    }

    /// Positive reward on every odd-numbered step.
    pub(crate) fn alternating(horizon: usize) -> Self {
        Self::new(Some(horizon), |t| if t % 2 == 1 { 1.0 } else { 0.0 })
    }
}

impl Env for ScriptedEnv {
    fn observation_space(&self) -> Space {
        Space::flat(2)
    }

    fn action_space(&self) -> Space {
        Space::flat(1)
    }

    fn reset(&mut self) -> Result<Array1<f32>, EnvError> {
        self.t = 0;
        Ok(Array1::zeros(2))
    }

    fn step(&mut self, act: ArrayView1<'_, f32>) -> Result<Step, EnvError> {
        if self.strict_actions && act.len() != 1 {
            return Err(EnvError::ActionShape {
                expected: 1,
                got: act.len(),
            });
        }
        if self.horizon.is_some_and(|h| self.t >= h) {
            return Err(EnvError::AlreadyDone);
        }
        self.t += 1;
        Ok(Step {
            obs: ndarray::array![self.t as f32, 0.0],
            rew: (self.rewards)(self.t),
            done: self.horizon.is_some_and(|h| self.t >= h),
            info: serde_json::json!({ "t": self.t }),
        })
    }
}

/// Outputs a zero action and remembers the history length it was shown.
pub(crate) struct RecordingPolicy {
    pub(crate) skill_dim: usize,
    action_dim: usize,
    seen: Mutex<Vec<(usize, usize, usize)>>,
}

impl RecordingPolicy {
    pub(crate) fn new(skill_dim: usize) -> Self {
        Self {
            skill_dim,
            action_dim: 1,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_action_dim(mut self, action_dim: usize) -> Self {
        self.action_dim = action_dim;
        self
    }

    /// `(observations, actions, skills)` row counts per call.
    pub(crate) fn seen(&self) -> Vec<(usize, usize, usize)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl LowPolicy for RecordingPolicy {
    fn skill_dim(&self) -> usize {
        self.skill_dim
    }

    fn predict(
        &self,
        observations: ArrayView2<'_, f32>,
        actions: ArrayView2<'_, f32>,
        skills: ArrayView2<'_, f32>,
        timesteps: ArrayView1<'_, usize>,
    ) -> Result<Array1<f32>, ModelError> {
        assert_eq!(timesteps.len(), observations.nrows());
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((observations.nrows(), actions.nrows(), skills.nrows()));
        }
        Ok(Array1::zeros(self.action_dim))
    }
}

/// Returns a fixed prediction and logs every first-observation it receives.
pub(crate) struct ScriptedTermination {
    done: bool,
    first_observations: Mutex<Vec<Vec<f32>>>,
}

impl ScriptedTermination {
    pub(crate) fn always(done: bool) -> Self {
        Self {
            done,
            first_observations: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.first_observations().len()
    }

    pub(crate) fn first_observations(&self) -> Vec<Vec<f32>> {
        self.first_observations
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl TerminationDetector for ScriptedTermination {
    fn predict(
        &self,
        _observation: ArrayView1<'_, f32>,
        first_observation: ArrayView1<'_, f32>,
        _skill: ArrayView1<'_, f32>,
    ) -> Result<f32, ModelError> {
        if let Ok(mut seen) = self.first_observations.lock() {
            seen.push(first_observation.to_vec());
        }
        Ok(if self.done { 1.0 } else { 0.0 })
    }
}

/// Ignores the operator and returns the source sequence, optionally reversed.
pub(crate) struct EchoTranslator {
    pub(crate) reverse: bool,
}

impl SkillTranslator for EchoTranslator {
    fn predict(
        &self,
        source_skills: ArrayView2<'_, f32>,
        _language_operator: ArrayView1<'_, f32>,
    ) -> Result<Array2<f32>, ModelError> {
        let mut target = source_skills.to_owned();
        if self.reverse {
            target.invert_axis(ndarray::Axis(0));
        }
        Ok(target)
    }
}
