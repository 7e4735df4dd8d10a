//! Per-timestep skill-boundary signals derived from raw trajectory arrays.
//!
//! A skill segment is a maximal run of timesteps sharing one skill id; a
//! boundary sits at every `i > 0` where `skills_idxs[i - 1] != skills_idxs[i]`.

use ndarray::{Array2, ArrayView2, s};
use std::ops::Range;

/// Half-width of the window marked done around every true skill completion.
pub const SKILL_DONE_DILATION: usize = 4;

/// Observation shifted by one step. The last row has no successor and stays zero.
pub fn next_observations(observations: ArrayView2<'_, f32>) -> Array2<f32> {
    let mut next = Array2::zeros(observations.raw_dim());
    let len = observations.nrows();
    if len > 1 {
        next.slice_mut(s![..len - 1, ..])
            .assign(&observations.slice(s![1.., ..]));
    }
    next
}

/// For every timestep, the observation at the start of its skill segment.
///
/// Rows past the end of `skills_idxs` have no segment and stay zero.
pub fn first_observations(skills_idxs: &[i32], observations: ArrayView2<'_, f32>) -> Array2<f32> {
    let mut first = Array2::zeros(observations.raw_dim());
    let mut segment_start = 0;
    let mut previous = None;
    for (i, (idx, mut row)) in skills_idxs.iter().zip(first.outer_iter_mut()).enumerate() {
        if previous.is_some_and(|p| p != idx) {
            segment_start = i;
        }
        previous = Some(idx);
        row.assign(&observations.row(segment_start));
    }
    first
}

/// Marks `[k - radius, k + radius]` (clipped to the episode) around every `k`
/// where `skills_done[k] == 1`. Entries outside every window are copied as-is.
pub fn augment_skills_done(skills_done: &[u8], radius: usize) -> Vec<u8> {
    let mut augmented = skills_done.to_vec();
    let Some(last) = skills_done.len().checked_sub(1) else {
        return augmented;
    };
    for (k, _) in skills_done.iter().enumerate().filter(|&(_, &d)| d == 1) {
        let lo = k.saturating_sub(radius);
        let hi = (k + radius).min(last);
        augmented[lo..=hi].fill(1);
    }
    augmented
}

/// Timestep ranges of every skill segment, in order.
pub fn skill_segments(skills_idxs: &[i32]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for i in 1..skills_idxs.len() {
        if skills_idxs[i - 1] != skills_idxs[i] {
            segments.push(start..i);
            start = i;
        }
    }
    if !skills_idxs.is_empty() {
        segments.push(start..skills_idxs.len());
    }
    segments
}

/// Undiscounted sum of rewards from each timestep to the end of the episode.
pub fn reward_to_go(rewards: &[f32]) -> Vec<f32> {
    let mut rtgs = vec![0.0; rewards.len()];
    let mut acc = 0.0;
    for (i, r) in rewards.iter().enumerate().rev() {
        acc += r;
        rtgs[i] = acc;
    }
    rtgs
}
