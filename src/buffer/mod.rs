mod episode;
mod errors;
mod ingest;
mod sample;
pub mod segmentation;
mod skill_buffer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use episode::Episode;
pub use errors::BufferError;
pub use ingest::{MUST_LOAD_FIELDS, missing_fields, preprocess_record};
pub use sample::SkillBatch;
pub use skill_buffer::{FieldDims, IngestReport, SkillBuffer, SkippedTrajectory};
