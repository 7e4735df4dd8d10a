use crate::rollout::RolloutError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("not implemented baseline: {0}")]
    NotImplemented(String),

    #[error("{0} evaluation needs a sequential-requirement mapping")]
    MissingRequirements(&'static str),

    #[error("promptdt evaluation needs per-environment rtgs")]
    MissingRtgs,

    #[error("{what} has shape {got:?}, expected {expected:?}")]
    Shape {
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("no environments to evaluate")]
    NoEnvironments,

    #[error("plan covers {expected} environments, got {got}")]
    EnvCount { expected: usize, got: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rollout(#[from] RolloutError),

    #[error("array shape error: {0}")]
    Array(#[from] ndarray::ShapeError),
}
