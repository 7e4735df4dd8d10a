use super::segmentation;
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use uuid::Uuid;

/// One ingested trajectory plus its skill decomposition.
///
/// Per-timestep fields all have `len()` rows. `source_skills` and
/// `target_skills` are zero-padded to the buffer-wide skill count; the real
/// counts live in `n_source_skills` / `n_target_skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: Uuid,
    /// Identifier the trajectory was loaded under.
    pub source_id: String,

    pub observations: Array2<f32>,
    pub next_observations: Array2<f32>,
    pub actions: Array2<f32>,
    pub first_observations: Array2<f32>,
    pub rewards: Array1<f32>,
    pub dones: Array1<bool>,
    pub rtgs: Array1<f32>,
    pub infos: Vec<serde_json::Value>,

    pub skills_idxs: Array1<i32>,
    pub skills_done: Array1<u8>,
    pub skills_order: Vec<i32>,

    pub source_skills: Array2<f32>,
    pub target_skills: Array2<f32>,
    pub n_source_skills: usize,
    pub n_target_skills: usize,
    pub language_operator: Array1<f32>,
}

impl Episode {
    pub fn len(&self) -> usize {
        self.observations.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn observation_dim(&self) -> usize {
        self.observations.ncols()
    }

    pub fn action_dim(&self) -> usize {
        self.actions.ncols()
    }

    /// Width of the skill vectors, `None` when the episode carries no skills.
    pub fn skill_dim(&self) -> Option<usize> {
        if self.n_source_skills > 0 {
            Some(self.source_skills.ncols())
        } else if self.n_target_skills > 0 {
            Some(self.target_skills.ncols())
        } else {
            None
        }
    }

    /// Real (unpadded) skill count, source or target, whichever is larger.
    pub fn max_skill_count(&self) -> usize {
        self.n_source_skills.max(self.n_target_skills)
    }

    pub fn skill_segments(&self) -> Vec<Range<usize>> {
        segmentation::skill_segments(self.skills_idxs.as_slice().unwrap_or(&[]))
    }

    /// Every per-timestep field has the same number of rows.
    pub fn is_aligned(&self) -> bool {
        let len = self.len();
        self.next_observations.nrows() == len
            && self.actions.nrows() == len
            && self.first_observations.dim() == self.observations.dim()
            && self.rewards.len() == len
            && self.dones.len() == len
            && self.rtgs.len() == len
            && self.infos.len() == len
            && self.skills_idxs.len() == len
            && self.skills_done.len() == len
    }

    /// Re-pads both skill sequences to `max_skills` rows of width `skill_dim`.
    ///
    /// Rows beyond the real counts are zero. Calling it again with a different
    /// target re-derives the padding from the real counts.
    pub(crate) fn set_skill_padding(&mut self, max_skills: usize, skill_dim: usize) {
        self.source_skills = pad_rows(&self.source_skills, self.n_source_skills, max_skills, skill_dim);
        self.target_skills = pad_rows(&self.target_skills, self.n_target_skills, max_skills, skill_dim);
    }
}

fn pad_rows(skills: &Array2<f32>, n_real: usize, max_rows: usize, width: usize) -> Array2<f32> {
    let mut padded = Array2::zeros((max_rows, width));
    let n = n_real.min(max_rows);
    if n > 0 {
        padded
            .slice_mut(s![..n, ..])
            .assign(&skills.slice(s![..n, ..]));
    }
    padded
}
