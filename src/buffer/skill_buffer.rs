use super::episode::Episode;
use super::errors::BufferError;
use super::ingest::preprocess_record;
use crate::config::{BufferConfig, IngestFailurePolicy};
use crate::store::{LanguageGuidance, TrajectoryStore};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Episodic replay buffer over skill-segmented trajectories.
///
/// Ingestion takes `&mut self` and finishes with a population-wide padding
/// pass, so sampling (`&self`) only ever sees fully padded episodes.
#[derive(Debug, Clone)]
pub struct SkillBuffer {
    config: BufferConfig,
    episodes: Vec<Episode>,
    episode_lengths: Vec<usize>,
    min_episode_length: usize,
    max_episode_length: usize,
    max_possible_skills: usize,
    skill_dim: Option<usize>,
    field_dims: Option<FieldDims>,
}

/// Per-timestep and operator widths shared by every episode in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDims {
    pub observation: usize,
    pub action: usize,
    pub language_operator: usize,
}

impl FieldDims {
    fn of(episode: &Episode) -> Self {
        Self {
            observation: episode.observation_dim(),
            action: episode.action_dim(),
            language_operator: episode.language_operator.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedTrajectory {
    pub id: String,
    pub reason: String,
}

/// Outcome of one ingestion call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedTrajectory>,
    pub min_episode_length: usize,
    pub max_episode_length: usize,
    pub max_possible_skills: usize,
}

impl SkillBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config,
            episodes: Vec::new(),
            episode_lengths: Vec::new(),
            min_episode_length: 0,
            max_episode_length: 0,
            max_possible_skills: 0,
            skill_dim: None,
            field_dims: None,
        }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn subseq_len(&self) -> usize {
        self.config.subseq_len
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn episode_lengths(&self) -> &[usize] {
        &self.episode_lengths
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn min_episode_length(&self) -> usize {
        self.min_episode_length
    }

    pub fn max_episode_length(&self) -> usize {
        self.max_episode_length
    }

    pub fn max_possible_skills(&self) -> usize {
        self.max_possible_skills
    }

    pub fn skill_dim(&self) -> Option<usize> {
        self.skill_dim
    }

    /// Widths fixed by the first ingested episode, `None` while empty.
    pub fn field_dims(&self) -> Option<FieldDims> {
        self.field_dims
    }

    /// Generator for ingestion, seeded from `BufferConfig::seed`.
    pub fn ingest_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.seed)
    }

    /// Loads `ids` from `store`, appends them and re-pads the whole population.
    ///
    /// Under [`IngestFailurePolicy::FailBatch`] the first bad trajectory aborts
    /// the call and the buffer is left exactly as it was. Calling this on a
    /// populated buffer is a reload: length bounds and skill padding are
    /// recomputed over old and new episodes together.
    pub fn add_episodes<S, I, R>(
        &mut self,
        store: &S,
        ids: I,
        guidance: &LanguageGuidance,
        rng: &mut R,
    ) -> Result<IngestReport, BufferError>
    where
        S: TrajectoryStore + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
        R: Rng + ?Sized,
    {
        let rtg_mode = self.config.rtg_mode;
        let mut skill_dim = self.skill_dim;
        let mut field_dims = self.field_dims;
        let mut staged: Vec<Episode> = Vec::new();
        let mut skipped = Vec::new();

        for id in ids {
            let id = id.as_ref();
            let loaded = store
                .load(id)
                .map_err(|source| BufferError::Store {
                    id: id.to_string(),
                    source,
                })
                .and_then(|raw| preprocess_record(id, raw, guidance, rtg_mode, &mut *rng))
                .and_then(|episode| check_skill_dim(episode, skill_dim))
                .and_then(|episode| check_field_dims(episode, field_dims));

            match loaded {
                Ok(episode) => {
                    if skill_dim.is_none() {
                        skill_dim = episode.skill_dim();
                    }
                    if field_dims.is_none() {
                        field_dims = Some(FieldDims::of(&episode));
                    }
                    tracing::debug!(trajectory = id, len = episode.len(), "trajectory staged");
                    staged.push(episode);
                }
                Err(err) => match self.config.ingest_failure {
                    IngestFailurePolicy::FailBatch => {
                        tracing::error!(trajectory = id, error = %err, "ingestion aborted");
                        return Err(err);
                    }
                    IngestFailurePolicy::SkipAndContinue => {
                        tracing::warn!(trajectory = id, error = %err, "skipping trajectory");
                        skipped.push(SkippedTrajectory {
                            id: id.to_string(),
                            reason: err.to_string(),
                        });
                    }
                },
            }
        }

        let loaded: Vec<String> = staged.iter().map(|ep| ep.source_id.clone()).collect();
        for episode in staged {
            self.episode_lengths.push(episode.len());
            self.episodes.push(episode);
        }
        self.skill_dim = skill_dim;
        self.field_dims = field_dims;
        self.finalize();

        tracing::info!(
            loaded = loaded.len(),
            skipped = skipped.len(),
            episodes = self.episodes.len(),
            min_len = self.min_episode_length,
            max_len = self.max_episode_length,
            max_skills = self.max_possible_skills,
            "episodes ingested"
        );

        Ok(IngestReport {
            loaded,
            skipped,
            min_episode_length: self.min_episode_length,
            max_episode_length: self.max_episode_length,
            max_possible_skills: self.max_possible_skills,
        })
    }

    /// Dict-chunk ingestion is not available for skill-segmented data.
    pub fn add_dict_chunk(&mut self, _chunk: &serde_json::Value) -> Result<(), BufferError> {
        Err(BufferError::Unsupported("dict-chunk ingestion"))
    }

    fn finalize(&mut self) {
        self.min_episode_length = self.episode_lengths.iter().copied().min().unwrap_or(0);
        self.max_episode_length = self.episode_lengths.iter().copied().max().unwrap_or(0);
        self.max_possible_skills = self
            .episodes
            .iter()
            .map(Episode::max_skill_count)
            .max()
            .unwrap_or(0);

        let max_skills = self.max_possible_skills;
        let skill_dim = self.skill_dim.unwrap_or(0);
        for episode in &mut self.episodes {
            episode.set_skill_padding(max_skills, skill_dim);
        }
    }
}

fn check_skill_dim(episode: Episode, expected: Option<usize>) -> Result<Episode, BufferError> {
    match (expected, episode.skill_dim()) {
        (Some(expected), Some(got)) if expected != got => Err(BufferError::SkillDim {
            id: episode.source_id.clone(),
            expected,
            got,
        }),
        _ => Ok(episode),
    }
}

fn check_field_dims(episode: Episode, expected: Option<FieldDims>) -> Result<Episode, BufferError> {
    let Some(expected) = expected else {
        return Ok(episode);
    };
    let got = FieldDims::of(&episode);
    let mismatch = [
        ("observations", expected.observation, got.observation),
        ("actions", expected.action, got.action),
        ("language_operator", expected.language_operator, got.language_operator),
    ]
    .into_iter()
    .find(|&(_, want, have)| want != have);
    match mismatch {
        Some((field, expected, got)) => Err(BufferError::FieldDim {
            id: episode.source_id.clone(),
            field,
            expected,
            got,
        }),
        None => Ok(episode),
    }
}
