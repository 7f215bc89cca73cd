//! Replay policy for PostgREST reads.
//!
//! Only the reads listed in [`Read`] can be replayed. Inserts never come
//! through here: a timed-out insert may already have landed, and replaying
//! it would trip the unique `videos.video_id` constraint.

use std::time::Duration;

use tracing::warn;

use crate::error::DbResult;
use crate::metrics::record_retry;

/// Reads the store is allowed to replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// Dedup lookup on `videos.video_id`
    VideoExists,
    /// Feed page of recent tracks with their video
    RecentTracks,
    /// Creation time of the newest track
    LatestTrack,
    /// Exact row count of a table
    Count,
}

impl Read {
    /// Metric and log label.
    pub fn label(self) -> &'static str {
        match self {
            Read::VideoExists => "video_exists",
            Read::RecentTracks => "recent_tracks",
            Read::LatestTrack => "latest_track",
            Read::Count => "count",
        }
    }
}

/// How many times, and how patiently, a read is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRetry {
    /// Total tries, the first included. Zero behaves like one.
    pub attempts: u32,
    /// Wait after the first failure; doubles after each further failure.
    pub backoff: Duration,
    /// Ceiling for any single wait, a server `Retry-After` included.
    pub max_backoff: Duration,
}

impl Default for ReadRetry {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl ReadRetry {
    /// Single try, no replay.
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Wait after the `failures`-th failed try.
    fn wait(&self, failures: u32, retry_after_ms: Option<u64>) -> Duration {
        let wait = match retry_after_ms {
            Some(ms) => Duration::from_millis(ms),
            None => {
                let factor = 1u32.checked_shl(failures.saturating_sub(1)).unwrap_or(u32::MAX);
                self.backoff.saturating_mul(factor)
            }
        };
        wait.min(self.max_backoff)
    }

    /// Run `op`, replaying it while it fails with a retryable error and
    /// tries remain.
    pub(crate) async fn run<T, F, Fut>(&self, read: Read, op: F) -> DbResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = DbResult<T>>,
    {
        let attempts = self.attempts.max(1);
        let mut failures = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && failures + 1 < attempts => {
                    failures += 1;
                    let wait = self.wait(failures, e.retry_after_ms());
                    warn!(
                        read = read.label(),
                        failures,
                        wait_ms = wait.as_millis() as u64,
                        "Store read failed, replaying: {}",
                        e
                    );
                    record_retry(read.label());
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
