mod errors;
mod traits;

pub use errors::LearnerError;
pub use traits::{Learner, UpdateInfo};
