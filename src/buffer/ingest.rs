use super::episode::Episode;
use super::errors::BufferError;
use super::segmentation::{self, SKILL_DONE_DILATION};
use crate::config::RtgMode;
use crate::store::{LanguageGuidance, RawRecord};
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Fields every stored trajectory has to carry.
pub const MUST_LOAD_FIELDS: [&str; 7] = [
    "observations",
    "actions",
    "skills_idxs",
    "skills_order",
    "skills_done",
    "source_skills",
    "target_skills",
];

#[derive(Debug, Deserialize)]
struct TrajectoryRecord {
    observations: Vec<Vec<f32>>,
    actions: Vec<Vec<f32>>,
    skills_idxs: Vec<i32>,
    skills_order: Vec<i32>,
    skills_done: Vec<u8>,
    /// Skill vectors grouped per demonstration, flattened in key order.
    source_skills: BTreeMap<String, Vec<Vec<f32>>>,
    target_skills: Vec<Vec<f32>>,
    operator: String,
    #[serde(default)]
    infos: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    rewards: Option<Vec<f32>>,
}

/// Names of required fields absent from `record`, sorted.
pub fn missing_fields(record: &RawRecord) -> Vec<String> {
    let mut missing: Vec<String> = MUST_LOAD_FIELDS
        .iter()
        .filter(|field| !record.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    missing.sort();
    missing
}

/// Turns one raw record into an unpadded [`Episode`].
///
/// Derives next observations, first observations of each skill segment and
/// the dilated completion signal, and draws the language operator embedding
/// from `guidance` using `rng`.
pub fn preprocess_record<R: Rng + ?Sized>(
    id: &str,
    raw: RawRecord,
    guidance: &LanguageGuidance,
    rtg_mode: RtgMode,
    rng: &mut R,
) -> Result<Episode, BufferError> {
    let missing = missing_fields(&raw);
    if !missing.is_empty() {
        return Err(BufferError::MissingFields {
            id: id.to_string(),
            missing,
        });
    }

    let record: TrajectoryRecord = serde_json::from_value(serde_json::Value::Object(raw))
        .map_err(|source| BufferError::Malformed {
            id: id.to_string(),
            source,
        })?;

    let len = record.observations.len();
    if len == 0 {
        return Err(BufferError::EmptyTrajectory { id: id.to_string() });
    }

    let observations = to_matrix(id, "observations", record.observations)?;
    let actions = to_matrix(id, "actions", record.actions)?;
    check_len(id, "actions", len, actions.nrows())?;
    check_len(id, "skills_idxs", len, record.skills_idxs.len())?;
    check_len(id, "skills_done", len, record.skills_done.len())?;

    let infos = match record.infos {
        Some(infos) => {
            check_len(id, "infos", len, infos.len())?;
            infos
        }
        None => vec![serde_json::Value::Array(Vec::new()); len],
    };
    let rewards = match record.rewards {
        Some(rewards) => {
            check_len(id, "rewards", len, rewards.len())?;
            rewards
        }
        None => vec![0.0; len],
    };
    let rtgs = match rtg_mode {
        RtgMode::Disabled => vec![0.0; len],
        RtgMode::RewardToGo => segmentation::reward_to_go(&rewards),
    };

    let source_rows: Vec<Vec<f32>> = record.source_skills.into_values().flatten().collect();
    let source_skills = to_matrix(id, "source_skills", source_rows)?;
    let target_skills = to_matrix(id, "target_skills", record.target_skills)?;
    if source_skills.nrows() > 0
        && target_skills.nrows() > 0
        && source_skills.ncols() != target_skills.ncols()
    {
        return Err(BufferError::SkillDim {
            id: id.to_string(),
            expected: source_skills.ncols(),
            got: target_skills.ncols(),
        });
    }

    let language_operator =
        guidance
            .sample(&record.operator, rng)
            .map_err(|source| BufferError::Store {
                id: id.to_string(),
                source,
            })?;

    let next_observations = segmentation::next_observations(observations.view());
    let first_observations =
        segmentation::first_observations(&record.skills_idxs, observations.view());
    let skills_done = segmentation::augment_skills_done(&record.skills_done, SKILL_DONE_DILATION);

    Ok(Episode {
        id: Uuid::new_v4(),
        source_id: id.to_string(),
        observations,
        next_observations,
        actions,
        first_observations,
        rewards: Array1::from_vec(rewards),
        dones: Array1::from_elem(len, false),
        rtgs: Array1::from_vec(rtgs),
        infos,
        skills_idxs: Array1::from_vec(record.skills_idxs),
        skills_done: Array1::from_vec(skills_done),
        skills_order: record.skills_order,
        n_source_skills: source_skills.nrows(),
        n_target_skills: target_skills.nrows(),
        source_skills,
        target_skills,
        language_operator,
    })
}

fn check_len(id: &str, field: &'static str, expected: usize, got: usize) -> Result<(), BufferError> {
    if expected == got {
        Ok(())
    } else {
        Err(BufferError::LengthMismatch {
            id: id.to_string(),
            field,
            expected,
            got,
        })
    }
}

fn to_matrix(id: &str, field: &'static str, rows: Vec<Vec<f32>>) -> Result<Array2<f32>, BufferError> {
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != width) {
        return Err(BufferError::RaggedField {
            id: id.to_string(),
            field,
        });
    }
    let n = rows.len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((n, width), flat)?)
}
