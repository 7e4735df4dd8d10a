mod errors;
mod traits;

pub use errors::ModelError;
pub use traits::{LowPolicy, SkillTranslator, TERMINATION_THRESHOLD, TerminationDetector};
