use super::errors::EvalError;
use super::plan::EvaluationPlan;
use crate::config::RolloutConfig;
use crate::env::Env;
use crate::models::{LowPolicy, TerminationDetector};
use crate::rollout::{RolloutResult, SkillRollout};
use ndarray::Axis;
use tracing::info;

/// Executes `plan`, one rollout per environment.
///
/// Only the skill-conditioned plan runs here; baseline policies live outside
/// this crate, so their plans fail with [`EvalError::NotImplemented`].
pub fn evaluate<E, P, D>(
    plan: &EvaluationPlan,
    envs: &mut [E],
    policy: &P,
    termination: &D,
    rollout: &RolloutConfig,
) -> Result<Vec<RolloutResult>, EvalError>
where
    E: Env,
    P: LowPolicy + ?Sized,
    D: TerminationDetector + ?Sized,
{
    let EvaluationPlan::Comde {
        target_skills,
        advancement,
        termination_pred_interval,
    } = plan
    else {
        return Err(EvalError::NotImplemented(plan.kind().mode().to_string()));
    };

    let expected = target_skills.len_of(Axis(0));
    if expected == 0 {
        return Err(EvalError::NoEnvironments);
    }
    if envs.len() != expected {
        return Err(EvalError::EnvCount {
            expected,
            got: envs.len(),
        });
    }

    let config = RolloutConfig {
        advancement: *advancement,
        termination_pred_interval: *termination_pred_interval,
        ..rollout.clone()
    };
    let runner = SkillRollout::new(policy, termination, &config);

    let results = envs
        .iter_mut()
        .zip(target_skills.outer_iter())
        .map(|(env, targets)| runner.run(env, targets.to_owned()))
        .collect::<Result<Vec<_>, _>>()?;

    let mean_return = results.iter().map(|r| r.total_return).sum::<f32>() / results.len() as f32;
    info!(n_envs = results.len(), mean_return, "evaluation finished");
    Ok(results)
}
