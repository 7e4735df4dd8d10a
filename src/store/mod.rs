mod errors;
mod guidance;
mod json;
mod traits;

pub use errors::StoreError;
pub use guidance::LanguageGuidance;
pub use json::{JsonTrajectoryStore, MemoryTrajectoryStore};
pub use traits::{RawRecord, TrajectoryStore};
