//! Bounded polling of audio generation jobs.

use std::time::{Duration, Instant};

use tracing::debug;

use youtunes_models::Prediction;

use crate::error::{PipelineError, PipelineResult};
use crate::metrics::{record_poll_attempts, record_poll_timeout};
use crate::traits::AudioGenerator;

/// Limits for waiting on one job.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Status checks allowed, the creation response included
    pub max_attempts: u32,
    pub deadline: Duration,
}

/// Poll until the job reaches a terminal status.
///
/// Returns the terminal snapshot, successful or not. The creation snapshot
/// counts as the first check, so a job that is already terminal is returned
/// without polling.
pub async fn wait_for_prediction(
    audio: &dyn AudioGenerator,
    initial: Prediction,
    policy: &PollPolicy,
) -> PipelineResult<Prediction> {
    let start = Instant::now();
    let mut current = initial;
    let mut attempts: u32 = 1;

    while !current.status.is_terminal() {
        if attempts >= policy.max_attempts || start.elapsed() + policy.interval > policy.deadline {
            record_poll_timeout();
            return Err(PipelineError::GenerationTimeout {
                attempts,
                elapsed_secs: start.elapsed().as_secs(),
            });
        }

        tokio::time::sleep(policy.interval).await;
        current = audio.poll(&current).await?;
        attempts += 1;

        debug!(
            prediction_id = %current.id,
            status = %current.status,
            attempts,
            "Prediction status"
        );
    }

    record_poll_attempts(attempts);
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use youtunes_models::{Candidate, PredictionStatus};

    struct Scripted {
        statuses: Mutex<Vec<PredictionStatus>>,
        polls: AtomicU32,
    }

    impl Scripted {
        fn new(statuses: &[PredictionStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().rev().copied().collect()),
                polls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AudioGenerator for Scripted {
        async fn start(&self, _candidate: &Candidate) -> PipelineResult<Prediction> {
            unreachable!("not used by the poller")
        }

        async fn poll(&self, prediction: &Prediction) -> PipelineResult<Prediction> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(PredictionStatus::Processing);
            Ok(snapshot(&prediction.id, status))
        }

        async fn download(&self, _url: &str) -> PipelineResult<Vec<u8>> {
            unreachable!("not used by the poller")
        }
    }

    fn snapshot(id: &str, status: PredictionStatus) -> Prediction {
        Prediction {
            id: id.to_string(),
            status,
            urls: Default::default(),
            output: None,
            error: None,
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts,
            deadline: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_terminal_creation_is_not_polled() {
        let audio = Scripted::new(&[]);
        let done = wait_for_prediction(&audio, snapshot("p", PredictionStatus::Succeeded), &fast_policy(10))
            .await
            .unwrap();
        assert_eq!(done.status, PredictionStatus::Succeeded);
        assert_eq!(audio.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_polls_until_terminal() {
        let audio = Scripted::new(&[PredictionStatus::Processing, PredictionStatus::Succeeded]);
        let done = wait_for_prediction(&audio, snapshot("p", PredictionStatus::Processing), &fast_policy(10))
            .await
            .unwrap();
        assert_eq!(done.status, PredictionStatus::Succeeded);
        assert_eq!(audio.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_status_is_returned_not_raised() {
        let audio = Scripted::new(&[PredictionStatus::Canceled]);
        let done = wait_for_prediction(&audio, snapshot("p", PredictionStatus::Starting), &fast_policy(10))
            .await
            .unwrap();
        assert!(!done.status.is_success());
    }

    #[tokio::test]
    async fn test_attempt_budget_times_out() {
        let audio = Scripted::new(&[]);
        let err = wait_for_prediction(&audio, snapshot("p", PredictionStatus::Starting), &fast_policy(3))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::GenerationTimeout { attempts: 3, .. }));
        assert_eq!(audio.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deadline_times_out() {
        let audio = Scripted::new(&[]);
        let policy = PollPolicy {
            interval: Duration::from_millis(20),
            max_attempts: 1_000,
            deadline: Duration::from_millis(50),
        };
        let err = wait_for_prediction(&audio, snapshot("p", PredictionStatus::Processing), &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::GenerationTimeout { .. }));
        assert!(audio.polls.load(Ordering::SeqCst) < 5);
    }
}
