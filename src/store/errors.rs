use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("trajectory `{0}` not found")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record `{0}` is not a JSON object")]
    NotAnObject(String),

    #[error("unknown operator category `{0}`")]
    UnknownOperator(String),

    #[error("operator category `{0}` has no registered phrasings")]
    EmptyOperator(String),
}
