mod errors;
mod history;
mod runner;
mod sequencer;

#[cfg(test)]
pub(crate) mod fakes;

pub use errors::RolloutError;
pub use history::{RolloutHistory, RolloutResult};
pub use runner::SkillRollout;
pub use sequencer::SkillSequencer;
