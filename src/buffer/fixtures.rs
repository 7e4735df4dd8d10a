//! Synthetic trajectory records shared by the buffer tests.

use crate::store::{LanguageGuidance, MemoryTrajectoryStore, RawRecord};
use serde_json::json;

pub(crate) const OBS_DIM: usize = 2;
pub(crate) const SKILL_DIM: usize = 2;

/// A `len`-step trajectory split into `n_skills` equal segments.
///
/// Observation `t` is `[t, t + 0.5]`; skill `s` is the vector `[s + 1, 0]`.
/// Source skills are split over two demonstrations, target skills are the
/// source sequence reversed, and the operator is `"reverse"`.
pub(crate) fn record(len: usize, n_skills: usize) -> RawRecord {
    let observations: Vec<Vec<f32>> = (0..len).map(|t| vec![t as f32, t as f32 + 0.5]).collect();
    let actions: Vec<Vec<f32>> = (0..len).map(|t| vec![t as f32 * 0.1]).collect();
    let skills_idxs: Vec<i32> = (0..len)
        .map(|t| (t * n_skills.max(1) / len.max(1)) as i32)
        .collect();
    let skills_done: Vec<u8> = (0..len)
        .map(|t| u8::from(t + 1 == len || skills_idxs[t] != skills_idxs[t + 1]))
        .collect();
    let skills: Vec<Vec<f32>> = (0..n_skills).map(|s| vec![s as f32 + 1.0, 0.0]).collect();
    let split = n_skills.div_ceil(2);
    let mut target = skills.clone();
    target.reverse();

    let value = json!({
        "observations": observations,
        "actions": actions,
        "skills_idxs": skills_idxs,
        "skills_order": (0..n_skills as i32).collect::<Vec<_>>(),
        "skills_done": skills_done,
        "source_skills": {
            "demo_0": skills[..split].to_vec(),
            "demo_1": skills[split..].to_vec(),
        },
        "target_skills": target,
        "operator": "reverse",
    });
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("json! object literal"),
    }
}

pub(crate) fn guidance() -> LanguageGuidance {
    let mut guidance = LanguageGuidance::new();
    guidance.insert("reverse", "do these in reverse order", vec![1.0, 0.0]);
    guidance.insert("reverse", "in the opposite order", vec![0.0, 1.0]);
    guidance
}

/// Store holding one record per `(id, len, n_skills)` entry.
pub(crate) fn store(layouts: &[(&str, usize, usize)]) -> MemoryTrajectoryStore {
    let mut store = MemoryTrajectoryStore::new();
    for &(id, len, n_skills) in layouts {
        store.insert(id, record(len, n_skills));
    }
    store
}
