use super::episode::Episode;
use super::errors::BufferError;
use super::skill_buffer::SkillBuffer;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis, s};
use rand::Rng;

/// A minibatch of fixed-length subtrajectories.
///
/// Per-timestep fields are `[batch, subseq_len, ...]`; episode-level fields
/// are `[batch, ...]` and come from the whole episode, not the window.
#[derive(Debug, Clone)]
pub struct SkillBatch {
    /// Buffer index of the episode behind each row.
    pub episode_indices: Vec<usize>,
    /// First timestep of each window inside its episode.
    pub start_indices: Vec<usize>,

    pub observations: Array3<f32>,
    pub next_observations: Array3<f32>,
    pub actions: Array3<f32>,
    pub first_observations: Array3<f32>,
    pub rewards: Array2<f32>,
    pub dones: Array2<bool>,
    pub rtgs: Array2<f32>,
    pub infos: Vec<Vec<serde_json::Value>>,
    pub skills_idxs: Array2<i32>,
    pub skills_done: Array2<u8>,

    pub source_skills: Array3<f32>,
    pub target_skills: Array3<f32>,
    pub n_source_skills: Array1<usize>,
    pub n_target_skills: Array1<usize>,
    pub language_operators: Array2<f32>,
}

impl SkillBatch {
    pub fn batch_size(&self) -> usize {
        self.episode_indices.len()
    }

    pub fn subseq_len(&self) -> usize {
        self.observations.len_of(Axis(1))
    }
}

impl SkillBuffer {
    /// Draws `batch_size` windows of `subseq_len` steps, episodes chosen with
    /// replacement.
    ///
    /// Every drawn episode is checked before anything is sliced, so a window
    /// that cannot fit fails the whole call.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<SkillBatch, BufferError> {
        if batch_size == 0 {
            return Err(BufferError::ZeroBatch);
        }
        let episodes = self.episodes();
        if episodes.is_empty() {
            return Err(BufferError::Empty);
        }
        let subseq_len = self.subseq_len();

        let episode_indices: Vec<usize> = (0..batch_size)
            .map(|_| rng.gen_range(0..episodes.len()))
            .collect();

        let max_starts = episode_indices
            .iter()
            .map(|&idx| {
                let episode_len = episodes[idx].len();
                episode_len
                    .checked_sub(subseq_len)
                    .ok_or(BufferError::SubsequenceTooLong {
                        subseq_len,
                        episode_len,
                        episode: idx,
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let start_indices: Vec<usize> = max_starts
            .iter()
            .map(|&max_start| rng.gen_range(0..=max_start))
            .collect();

        let chosen: Vec<(&Episode, usize)> = episode_indices
            .iter()
            .zip(&start_indices)
            .map(|(&idx, &start)| (&episodes[idx], start))
            .collect();

        let observations = stack_matrices(&chosen, subseq_len, |ep| &ep.observations)?;
        let next_observations = stack_matrices(&chosen, subseq_len, |ep| &ep.next_observations)?;
        let actions = stack_matrices(&chosen, subseq_len, |ep| &ep.actions)?;
        let first_observations =
            stack_matrices(&chosen, subseq_len, |ep| &ep.first_observations)?;

        let rewards = stack_windows(&chosen, subseq_len, |ep| &ep.rewards)?;
        let dones = stack_windows(&chosen, subseq_len, |ep| &ep.dones)?;
        let rtgs = stack_windows(&chosen, subseq_len, |ep| &ep.rtgs)?;
        let skills_idxs = stack_windows(&chosen, subseq_len, |ep| &ep.skills_idxs)?;
        let skills_done = stack_windows(&chosen, subseq_len, |ep| &ep.skills_done)?;
        let infos = chosen
            .iter()
            .map(|&(ep, start)| ep.infos[start..start + subseq_len].to_vec())
            .collect();

        let source: Vec<ArrayView2<'_, f32>> =
            chosen.iter().map(|(ep, _)| ep.source_skills.view()).collect();
        let target: Vec<ArrayView2<'_, f32>> =
            chosen.iter().map(|(ep, _)| ep.target_skills.view()).collect();
        let operators: Vec<ArrayView1<'_, f32>> = chosen
            .iter()
            .map(|(ep, _)| ep.language_operator.view())
            .collect();

        Ok(SkillBatch {
            observations,
            next_observations,
            actions,
            first_observations,
            rewards,
            dones,
            rtgs,
            infos,
            skills_idxs,
            skills_done,
            source_skills: ndarray::stack(Axis(0), &source)?,
            target_skills: ndarray::stack(Axis(0), &target)?,
            n_source_skills: chosen.iter().map(|(ep, _)| ep.n_source_skills).collect(),
            n_target_skills: chosen.iter().map(|(ep, _)| ep.n_target_skills).collect(),
            language_operators: ndarray::stack(Axis(0), &operators)?,
            episode_indices,
            start_indices,
        })
    }
}

fn stack_matrices(
    chosen: &[(&Episode, usize)],
    subseq_len: usize,
    field: fn(&Episode) -> &Array2<f32>,
) -> Result<Array3<f32>, BufferError> {
    let views: Vec<ArrayView2<'_, f32>> = chosen
        .iter()
        .map(|&(ep, start)| field(ep).slice(s![start..start + subseq_len, ..]))
        .collect();
    Ok(ndarray::stack(Axis(0), &views)?)
}

fn stack_windows<T: Clone>(
    chosen: &[(&Episode, usize)],
    subseq_len: usize,
    field: fn(&Episode) -> &Array1<T>,
) -> Result<Array2<T>, BufferError> {
    let views: Vec<ArrayView1<'_, T>> = chosen
        .iter()
        .map(|&(ep, start)| field(ep).slice(s![start..start + subseq_len]))
        .collect();
    Ok(ndarray::stack(Axis(0), &views)?)
}
