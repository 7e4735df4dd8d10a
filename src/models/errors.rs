use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model error: {0}")]
    ModelError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("{model} produced output of width {got}, expected {expected}")]
    OutputShape {
        model: &'static str,
        expected: usize,
        got: usize,
    },
}
