use super::errors::RolloutError;
use super::history::{RolloutHistory, RolloutResult};
use super::sequencer::SkillSequencer;
use crate::config::RolloutConfig;
use crate::env::Env;
use crate::models::{LowPolicy, ModelError, SkillTranslator, TerminationDetector};
use ndarray::{Array2, ArrayView1, ArrayView2};
use tracing::{debug, info};

/// Drives one environment through a target skill sequence.
///
/// Holds the frozen models and the rollout settings; each call to
/// [`SkillRollout::run`] is an independent episode.
pub struct SkillRollout<'a, P: ?Sized, D: ?Sized> {
    policy: &'a P,
    termination: &'a D,
    config: &'a RolloutConfig,
}

impl<'a, P, D> SkillRollout<'a, P, D>
where
    P: LowPolicy + ?Sized,
    D: TerminationDetector + ?Sized,
{
    pub fn new(policy: &'a P, termination: &'a D, config: &'a RolloutConfig) -> Self {
        Self {
            policy,
            termination,
            config,
        }
    }

    /// Translates `source_skills` under `language_operator`, then executes the result.
    pub fn run_translated<E, T>(
        &self,
        env: &mut E,
        translator: &T,
        source_skills: ArrayView2<'_, f32>,
        language_operator: ArrayView1<'_, f32>,
    ) -> Result<RolloutResult, RolloutError>
    where
        E: Env + ?Sized,
        T: SkillTranslator + ?Sized,
    {
        let target_skills = translator.predict(source_skills, language_operator)?;
        debug!(
            n_source = source_skills.nrows(),
            n_target = target_skills.nrows(),
            "translated skill sequence"
        );
        self.run(env, target_skills)
    }

    /// Runs until the environment reports completion or the step budget is spent.
    pub fn run<E: Env + ?Sized>(
        &self,
        env: &mut E,
        target_skills: Array2<f32>,
    ) -> Result<RolloutResult, RolloutError> {
        let skill_dim = self.policy.skill_dim();
        if target_skills.nrows() == 0 {
            return Err(RolloutError::NoTargetSkills);
        }
        if target_skills.ncols() != skill_dim {
            return Err(RolloutError::Width {
                what: "target skill",
                expected: skill_dim,
                got: target_skills.ncols(),
            });
        }

        let obs_dim = env.observation_space().last_dim();
        let act_dim = env.action_space().last_dim();
        let capacity = self
            .config
            .max_steps
            .unwrap_or(self.config.history_capacity);

        let first_obs = env.reset()?;
        let mut sequencer = SkillSequencer::new(
            target_skills,
            first_obs.clone(),
            self.config.advancement,
            self.config.termination_pred_interval,
        )?;
        let mut history = RolloutHistory::with_capacity(capacity, obs_dim, act_dim, skill_dim);
        history.start(first_obs.view(), sequencer.current_skill(), 0)?;

        let mut obs = first_obs;
        let mut truncated = false;
        loop {
            if self.config.max_steps.is_some_and(|max| history.steps() >= max) {
                truncated = true;
                break;
            }

            let timestep = history.steps();
            if sequencer.update(
                timestep,
                history.last_reward(),
                obs.view(),
                self.termination,
            )? {
                debug!(
                    timestep,
                    skill_index = sequencer.skill_index(),
                    "advanced to next skill"
                );
            }

            // the new skill enters the history with the next observation
            let action = self.policy.predict(
                history.observations()?,
                history.actions()?,
                history.skills()?,
                history.timesteps(),
            )?;
            if action.len() != act_dim {
                return Err(ModelError::OutputShape {
                    model: "low policy",
                    expected: act_dim,
                    got: action.len(),
                }
                .into());
            }
            let step = env.step(action.view())?;
            history.record_step(
                action.view(),
                &step,
                sequencer.current_skill(),
                sequencer.skill_index(),
            )?;
            if step.done {
                break;
            }
            obs = step.obs;
        }

        let result = history.into_result(sequencer.advances(), truncated)?;
        info!(
            id = %result.id,
            steps = result.steps,
            total_return = result.total_return,
            skill_advances = result.skill_advances,
            truncated = result.truncated,
            "rollout finished"
        );
        Ok(result)
    }
}
