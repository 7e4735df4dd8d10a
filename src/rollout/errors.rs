use crate::env::EnvError;
use crate::models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolloutError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("skill translator produced no target skills")]
    NoTargetSkills,

    #[error("termination_pred_interval must be positive")]
    ZeroInterval,

    #[error("{what} has width {got}, expected {expected}")]
    Width {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("history shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
