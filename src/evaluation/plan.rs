use super::baseline::BaselineKind;
use super::errors::EvalError;
use crate::config::{RolloutConfig, SkillAdvancement};
use crate::store::LanguageGuidance;
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// Reported instead of a phrasing by modes that ignore sequential requirements.
pub const NOT_USED: &str = "not_used";

/// Per-environment task description shared by every evaluation mode.
///
/// All three skill tensors are `[n_envs, n_skills, dim]` with the same
/// leading axes.
#[derive(Debug, Clone)]
pub struct EvaluationInputs {
    pub semantic_skills_sequence: Array3<f32>,
    pub non_functionalities: Array3<f32>,
    pub param_for_skill: Array3<f32>,
    /// Per-environment return targets, read only by the prompt-DT baseline.
    pub rtgs: Option<Array1<f32>>,
}

impl EvaluationInputs {
    pub fn n_envs(&self) -> usize {
        self.semantic_skills_sequence.len_of(Axis(0))
    }

    pub fn n_skills(&self) -> usize {
        self.semantic_skills_sequence.len_of(Axis(1))
    }

    fn validate(&self) -> Result<(), EvalError> {
        if self.n_envs() == 0 {
            return Err(EvalError::NoEnvironments);
        }
        let (n_envs, n_skills) = (self.n_envs(), self.n_skills());
        for (what, tensor) in [
            ("non_functionalities", &self.non_functionalities),
            ("param_for_skill", &self.param_for_skill),
        ] {
            let (envs, skills, _) = tensor.dim();
            if (envs, skills) != (n_envs, n_skills) {
                return Err(EvalError::Shape {
                    what,
                    expected: vec![n_envs, n_skills],
                    got: vec![envs, skills],
                });
            }
        }
        if n_skills == 0 {
            return Err(EvalError::Shape {
                what: "semantic_skills_sequence",
                expected: vec![n_envs, 1],
                got: vec![n_envs, 0],
            });
        }
        Ok(())
    }
}

/// Where demonstration baselines draw their sequential requirement from.
#[derive(Debug, Clone, Copy)]
pub struct SequentialRequirements<'a> {
    pub mapping: &'a LanguageGuidance,
    pub category: &'a str,
}

/// Arguments shared by the demonstration-conditioned baselines.
#[derive(Debug, Clone)]
pub struct SequentialArgs {
    /// One identical requirement embedding per environment, `[n_envs, dim]`.
    pub sequential_requirement: Array2<f32>,
    /// Non-functionality of each environment's first skill, `[n_envs, dim]`.
    pub non_functionality: Array2<f32>,
    pub param_for_skill: Array3<f32>,
}

/// Fully assembled arguments for one evaluation mode.
#[derive(Debug, Clone)]
pub enum EvaluationPlan {
    FlatBc {
        semantic_skills_sequence: Array3<f32>,
        param_for_skill: Array3<f32>,
    },
    DemoGen(SequentialArgs),
    Bcz(SequentialArgs),
    PromptDt {
        args: SequentialArgs,
        rtgs: Array1<f32>,
    },
    Comde {
        /// Semantic skill, non-functionality and parameters concatenated per skill.
        target_skills: Array3<f32>,
        advancement: SkillAdvancement,
        termination_pred_interval: usize,
    },
}

impl EvaluationPlan {
    pub fn kind(&self) -> BaselineKind {
        match self {
            Self::FlatBc { .. } => BaselineKind::FlatBc,
            Self::DemoGen(_) => BaselineKind::DemoGen,
            Self::Bcz(_) => BaselineKind::Bcz,
            Self::PromptDt { .. } => BaselineKind::PromptDt,
            Self::Comde { .. } => BaselineKind::Comde,
        }
    }
}

/// Side information reported alongside evaluation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationInfo {
    pub mode: &'static str,
    pub sequential_requirement: String,
}

impl EvaluationInfo {
    fn unused(kind: BaselineKind) -> Self {
        Self {
            mode: kind.mode(),
            sequential_requirement: NOT_USED.to_string(),
        }
    }
}

/// Builds the argument set `kind` needs from the shared inputs.
///
/// The requirement phrasing is drawn with `rng`; the per-environment replicas
/// are then shuffled by a generator seeded from `custom_seed`.
pub fn assemble<R: Rng + ?Sized>(
    kind: BaselineKind,
    inputs: &EvaluationInputs,
    requirements: Option<SequentialRequirements<'_>>,
    rollout: &RolloutConfig,
    custom_seed: u64,
    rng: &mut R,
) -> Result<(EvaluationPlan, EvaluationInfo), EvalError> {
    inputs.validate()?;

    let (plan, info) = match kind {
        BaselineKind::FlatBc => (
            EvaluationPlan::FlatBc {
                semantic_skills_sequence: inputs.semantic_skills_sequence.clone(),
                param_for_skill: inputs.param_for_skill.clone(),
            },
            EvaluationInfo::unused(kind),
        ),
        BaselineKind::DemoGen | BaselineKind::Bcz | BaselineKind::PromptDt => {
            let requirements = requirements.ok_or(EvalError::MissingRequirements(kind.mode()))?;
            let (phrasing, args) = sequential_args(inputs, requirements, custom_seed, rng)?;
            let plan = match kind {
                BaselineKind::DemoGen => EvaluationPlan::DemoGen(args),
                BaselineKind::Bcz => EvaluationPlan::Bcz(args),
                _ => {
                    let rtgs = inputs.rtgs.clone().ok_or(EvalError::MissingRtgs)?;
                    if rtgs.len() != inputs.n_envs() {
                        return Err(EvalError::Shape {
                            what: "rtgs",
                            expected: vec![inputs.n_envs()],
                            got: vec![rtgs.len()],
                        });
                    }
                    EvaluationPlan::PromptDt { args, rtgs }
                }
            };
            let info = EvaluationInfo {
                mode: kind.mode(),
                sequential_requirement: phrasing,
            };
            (plan, info)
        }
        BaselineKind::Comde => {
            let target_skills = ndarray::concatenate(
                Axis(2),
                &[
                    inputs.semantic_skills_sequence.view(),
                    inputs.non_functionalities.view(),
                    inputs.param_for_skill.view(),
                ],
            )?;
            (
                EvaluationPlan::Comde {
                    target_skills,
                    advancement: rollout.advancement,
                    termination_pred_interval: rollout.termination_pred_interval,
                },
                EvaluationInfo::unused(kind),
            )
        }
    };

    info!(
        mode = info.mode,
        n_envs = inputs.n_envs(),
        sequential_requirement = %info.sequential_requirement,
        "assembled evaluation plan"
    );
    Ok((plan, info))
}

fn sequential_args<R: Rng + ?Sized>(
    inputs: &EvaluationInputs,
    requirements: SequentialRequirements<'_>,
    custom_seed: u64,
    rng: &mut R,
) -> Result<(String, SequentialArgs), EvalError> {
    let (phrasing, embedding) = requirements.mapping.choose(requirements.category, rng)?;

    let mut replicas: Vec<ArrayView1<'_, f32>> = vec![embedding.view(); inputs.n_envs()];
    let mut shuffle_rng = ChaCha8Rng::seed_from_u64(custom_seed);
    replicas.shuffle(&mut shuffle_rng);

    let args = SequentialArgs {
        sequential_requirement: ndarray::stack(Axis(0), &replicas)?,
        non_functionality: inputs.non_functionalities.index_axis(Axis(1), 0).to_owned(),
        param_for_skill: inputs.param_for_skill.clone(),
    };
    Ok((phrasing.to_string(), args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    const N_ENVS: usize = 3;
    const N_SKILLS: usize = 4;

    fn inputs() -> EvaluationInputs {
        EvaluationInputs {
            semantic_skills_sequence: Array3::from_shape_fn((N_ENVS, N_SKILLS, 2), |(e, s, _)| {
                (e * 10 + s) as f32
            }),
            non_functionalities: Array3::from_shape_fn((N_ENVS, N_SKILLS, 1), |(e, s, _)| {
                (100 + e * 10 + s) as f32
            }),
            param_for_skill: Array3::from_elem((N_ENVS, N_SKILLS, 3), 0.5),
            rtgs: None,
        }
    }

    fn requirements() -> LanguageGuidance {
        let mut g = LanguageGuidance::new();
        g.insert("sequential", "first this then that", vec![1.0, 1.0]);
        g.insert("sequential", "in the given order", vec![2.0, 2.0]);
        g
    }

    fn plan(
        kind: BaselineKind,
        inputs: &EvaluationInputs,
    ) -> Result<(EvaluationPlan, EvaluationInfo), EvalError> {
        let mapping = requirements();
        let reqs = SequentialRequirements {
            mapping: &mapping,
            category: "sequential",
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assemble(kind, inputs, Some(reqs), &RolloutConfig::default(), 7, &mut rng)
    }

    #[test]
    fn comde_concatenates_skill_parts() {
        let (plan, info) = plan(BaselineKind::Comde, &inputs()).unwrap();
        assert_eq!(info.sequential_requirement, NOT_USED);
        let EvaluationPlan::Comde {
            target_skills,
            advancement,
            termination_pred_interval,
        } = plan
        else {
            panic!("expected comde plan");
        };
        assert_eq!(target_skills.dim(), (N_ENVS, N_SKILLS, 6));
        assert_eq!(
            target_skills.slice(ndarray::s![1, 2, ..]).to_vec(),
            vec![12.0, 12.0, 112.0, 0.5, 0.5, 0.5]
        );
        assert_eq!(advancement, SkillAdvancement::Oracle);
        assert_eq!(termination_pred_interval, 10);
    }

    #[test]
    fn demonstration_baselines_replicate_one_requirement() {
        for kind in [BaselineKind::DemoGen, BaselineKind::Bcz] {
            let (plan, info) = plan(kind, &inputs()).unwrap();
            assert_eq!(plan.kind(), kind);
            let (EvaluationPlan::DemoGen(args) | EvaluationPlan::Bcz(args)) = plan else {
                panic!("expected sequential args");
            };
            let expected = requirements().phrasings("sequential").unwrap()
                [info.sequential_requirement.as_str()]
            .clone();
            assert_eq!(args.sequential_requirement.nrows(), N_ENVS);
            for row in args.sequential_requirement.rows() {
                assert_eq!(row.to_vec(), expected);
            }
            assert_eq!(
                args.non_functionality.column(0).to_vec(),
                vec![100.0, 110.0, 120.0]
            );
        }
    }

    #[test]
    fn prompt_dt_needs_rtgs_per_environment() {
        assert!(matches!(
            plan(BaselineKind::PromptDt, &inputs()),
            Err(EvalError::MissingRtgs)
        ));

        let mut with_rtgs = inputs();
        with_rtgs.rtgs = Some(ndarray::array![1.0, 2.0]);
        assert!(matches!(
            plan(BaselineKind::PromptDt, &with_rtgs),
            Err(EvalError::Shape { what: "rtgs", .. })
        ));

        with_rtgs.rtgs = Some(ndarray::array![1.0, 2.0, 3.0]);
        let (plan, _) = plan(BaselineKind::PromptDt, &with_rtgs).unwrap();
        let EvaluationPlan::PromptDt { rtgs, .. } = plan else {
            panic!("expected promptdt plan");
        };
        assert_eq!(rtgs.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn flat_bc_ignores_requirements() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (plan, info) = assemble(
            BaselineKind::FlatBc,
            &inputs(),
            None,
            &RolloutConfig::default(),
            0,
            &mut rng,
        )
        .unwrap();
        assert_eq!(plan.kind(), BaselineKind::FlatBc);
        assert_eq!(info.mode, "flatbc");
        assert_eq!(info.sequential_requirement, NOT_USED);
    }

    #[test]
    fn missing_mapping_or_category_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = assemble(
            BaselineKind::Bcz,
            &inputs(),
            None,
            &RolloutConfig::default(),
            0,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::MissingRequirements("bcz")));

        let mapping = requirements();
        let reqs = SequentialRequirements {
            mapping: &mapping,
            category: "parallel",
        };
        let err = assemble(
            BaselineKind::DemoGen,
            &inputs(),
            Some(reqs),
            &RolloutConfig::default(),
            0,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::Store(StoreError::UnknownOperator(_))));
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let mut bad = inputs();
        bad.param_for_skill = Array3::zeros((N_ENVS, N_SKILLS + 1, 3));
        assert!(matches!(
            plan(BaselineKind::Comde, &bad),
            Err(EvalError::Shape { what: "param_for_skill", .. })
        ));

        let mut empty = inputs();
        empty.semantic_skills_sequence = Array3::zeros((0, N_SKILLS, 2));
        assert!(matches!(
            plan(BaselineKind::Comde, &empty),
            Err(EvalError::NoEnvironments)
        ));
    }
}
