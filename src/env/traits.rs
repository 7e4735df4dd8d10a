use super::errors::EnvError;
use super::types::{Space, Step};
use ndarray::{Array1, ArrayView1};

/// A single simulated environment driven one step at a time.
///
/// Both calls block until the simulator answers; the rollout loop never
/// issues a `step` before the previous one returned.
pub trait Env: Send {
    fn observation_space(&self) -> Space;
    fn action_space(&self) -> Space;

    fn reset(&mut self) -> Result<Array1<f32>, EnvError>;
    fn step(&mut self, act: ArrayView1<'_, f32>) -> Result<Step, EnvError>;

    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}
