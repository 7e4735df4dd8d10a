use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Under-qualified trajectory `{id}`: missing required fields {missing:?}")]
    MissingFields { id: String, missing: Vec<String> },

    #[error("trajectory `{id}`: malformed record: {source}")]
    Malformed {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("trajectory `{id}`: `{field}` has {got} entries, expected {expected}")]
    LengthMismatch {
        id: String,
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("trajectory `{id}`: rows of `{field}` have inconsistent widths")]
    RaggedField { id: String, field: &'static str },

    #[error("trajectory `{id}` has no timesteps")]
    EmptyTrajectory { id: String },

    #[error("trajectory `{id}`: skill width {got} does not match buffer skill width {expected}")]
    SkillDim {
        id: String,
        expected: usize,
        got: usize,
    },

    #[error("trajectory `{id}`: `{field}` width {got} does not match buffer width {expected}")]
    FieldDim {
        id: String,
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("trajectory `{id}`: {source}")]
    Store {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error(
        "Subsequence length {subseq_len} exceeds length {episode_len} of episode {episode}"
    )]
    SubsequenceTooLong {
        subseq_len: usize,
        episode_len: usize,
        episode: usize,
    },

    #[error("{0} is not supported by the skill buffer")]
    Unsupported(&'static str),

    #[error("buffer holds no episodes")]
    Empty,

    #[error("batch size must be positive")]
    ZeroBatch,

    #[error("failed to stack minibatch: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
