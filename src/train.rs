use crate::buffer::{BufferError, SkillBatch, SkillBuffer};
use crate::config::TrainConfig;
use crate::learner::{Learner, LearnerError};
use futures::future::join_all;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TrainError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Learner(#[from] LearnerError),

    #[error("sampler task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("invalid training config: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingStats {
    pub updates: u64,
    /// Batches produced by the samplers, including ones never consumed.
    pub batches_sampled: u64,
    pub training_time: Duration,
    pub final_version: u64,
    pub mean_loss: f32,
}

/// Runs `cfg.max_updates` gradient steps on minibatches drawn from `buffer`.
///
/// `cfg.num_samplers` blocking tasks sample concurrently, each with its own
/// generator seeded from `cfg.seed` plus its worker index, and feed a channel
/// bounded by `cfg.queue_depth`. The buffer must be fully ingested; it is only
/// read here.
pub async fn train<L>(
    buffer: Arc<SkillBuffer>,
    learner: &mut L,
    cfg: &TrainConfig,
) -> Result<TrainingStats, TrainError>
where
    L: Learner + ?Sized,
{
    if cfg.num_samplers == 0 || cfg.queue_depth == 0 {
        return Err(TrainError::Config(
            "num_samplers and queue_depth must be positive".into(),
        ));
    }
    if buffer.is_empty() {
        return Err(BufferError::Empty.into());
    }

    let start = Instant::now();
    info!(
        episodes = buffer.len(),
        max_updates = cfg.max_updates,
        batch_size = cfg.batch_size,
        num_samplers = cfg.num_samplers,
        "starting training"
    );

    let (tx, mut rx) = mpsc::channel::<Result<SkillBatch, BufferError>>(cfg.queue_depth);
    let workers: Vec<_> = (0..cfg.num_samplers)
        .map(|worker| {
            let buffer = Arc::clone(&buffer);
            let tx = tx.clone();
            let batch_size = cfg.batch_size;
            let seed = cfg.seed.wrapping_add(worker as u64);
            tokio::task::spawn_blocking(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut produced = 0u64;
                loop {
                    let batch = buffer.sample(batch_size, &mut rng);
                    let failed = batch.is_err();
                    if tx.blocking_send(batch).is_err() || failed {
                        break;
                    }
                    produced += 1;
                }
                produced
            })
        })
        .collect();
    drop(tx);

    let mut updates = 0u64;
    let mut final_version = 0u64;
    let mut loss_sum = 0.0f32;
    let consumed = async {
        while updates < cfg.max_updates {
            let Some(batch) = rx.recv().await else {
                break;
            };
            let update = learner.apply_gradient(&batch?).await?;
            updates += 1;
            final_version = update.version;
            loss_sum += update.loss;
            debug!(update = updates, loss = update.loss, version = update.version, "applied gradient");
        }
        Ok::<(), TrainError>(())
    }
    .await;

    // samplers stop once their next send fails
    drop(rx);
    let mut batches_sampled = 0u64;
    for produced in join_all(workers).await {
        batches_sampled += produced?;
    }
    consumed?;
    learner.finish().await?;

    let stats = TrainingStats {
        updates,
        batches_sampled,
        training_time: start.elapsed(),
        final_version,
        mean_loss: if updates == 0 {
            0.0
        } else {
            loss_sum / updates as f32
        },
    };
    info!(
        updates = stats.updates,
        batches_sampled = stats.batches_sampled,
        mean_loss = stats.mean_loss,
        elapsed_ms = stats.training_time.as_millis() as u64,
        "training finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::fixtures;
    use crate::config::BufferConfig;
    use crate::learner::UpdateInfo;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingLearner {
        batch_sizes: Vec<usize>,
        finished: bool,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl Learner for RecordingLearner {
        async fn apply_gradient(&mut self, batch: &SkillBatch) -> Result<UpdateInfo, LearnerError> {
            if self.fail_at == Some(self.batch_sizes.len()) {
                return Err(LearnerError::BadBatch("scripted failure".into()));
            }
            self.batch_sizes.push(batch.batch_size());
            Ok(UpdateInfo {
                loss: 1.0,
                version: self.batch_sizes.len() as u64,
            })
        }

        async fn finish(&mut self) -> Result<(), LearnerError> {
            self.finished = true;
            Ok(())
        }
    }

    fn buffer(subseq_len: usize) -> Arc<SkillBuffer> {
        let layouts = [("a", 20, 3), ("b", 30, 5)];
        let store = fixtures::store(&layouts);
        let mut buffer = SkillBuffer::new(BufferConfig {
            subseq_len,
            ..BufferConfig::default()
        });
        let mut rng = buffer.ingest_rng();
        buffer
            .add_episodes(&store, &["a", "b"], &fixtures::guidance(), &mut rng)
            .unwrap();
        Arc::new(buffer)
    }

    fn cfg(max_updates: u64) -> TrainConfig {
        TrainConfig {
            max_updates,
            batch_size: 4,
            num_samplers: 3,
            queue_depth: 2,
            seed: 1,
        }
    }

    #[tokio::test]
    async fn runs_the_requested_number_of_updates() {
        let mut learner = RecordingLearner::default();
        let stats = train(buffer(5), &mut learner, &cfg(12)).await.unwrap();

        assert_eq!(stats.updates, 12);
        assert_eq!(stats.final_version, 12);
        assert_eq!(stats.mean_loss, 1.0);
        assert!(stats.batches_sampled >= 12);
        assert!(learner.batch_sizes.iter().all(|&b| b == 4));
        assert!(learner.finished);
    }

    #[tokio::test]
    async fn sampling_errors_stop_training() {
        let mut learner = RecordingLearner::default();
        let err = train(buffer(35), &mut learner, &cfg(5)).await.unwrap_err();
        assert!(matches!(
            err,
            TrainError::Buffer(BufferError::SubsequenceTooLong { .. })
        ));
        assert!(!learner.finished);
    }

    #[tokio::test]
    async fn learner_errors_propagate() {
        let mut learner = RecordingLearner {
            fail_at: Some(2),
            ..RecordingLearner::default()
        };
        let err = train(buffer(5), &mut learner, &cfg(5)).await.unwrap_err();
        assert!(matches!(err, TrainError::Learner(LearnerError::BadBatch(_))));
        assert_eq!(learner.batch_sizes.len(), 2);
    }

    #[tokio::test]
    async fn rejects_unusable_configs() {
        let mut learner = RecordingLearner::default();
        let zero_samplers = TrainConfig {
            num_samplers: 0,
            ..cfg(1)
        };
        assert!(matches!(
            train(buffer(5), &mut learner, &zero_samplers).await,
            Err(TrainError::Config(_))
        ));

        let empty = Arc::new(SkillBuffer::new(BufferConfig::default()));
        assert!(matches!(
            train(empty, &mut learner, &cfg(1)).await,
            Err(TrainError::Buffer(BufferError::Empty))
        ));
    }
}
