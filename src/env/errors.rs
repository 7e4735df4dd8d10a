use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Environment error: {0}")]
    EnvError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Action has {got} components, action space expects {expected}")]
    ActionShape { expected: usize, got: usize },

    #[error("Environment stepped after episode completion")]
    AlreadyDone,
}
