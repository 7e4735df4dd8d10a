use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Shape metadata for an observation or action space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub shape: Vec<usize>,
}

impl Space {
    pub fn new(shape: Vec<usize>) -> Self {
        Self { shape }
    }

    pub fn flat(dim: usize) -> Self {
        Self { shape: vec![dim] }
    }

    /// Size of the trailing axis; vectors fed to models have this width.
    pub fn last_dim(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub obs: Array1<f32>,
    pub rew: f32,
    pub done: bool,
    pub info: serde_json::Value,
}
