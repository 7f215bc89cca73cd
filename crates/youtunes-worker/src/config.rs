//! Pipeline configuration.

use std::time::Duration;

/// Pipeline configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates taken from the top of the chart per run
    pub batch_size: usize,
    /// Wait between prediction status checks
    pub poll_interval: Duration,
    /// Status checks allowed per prediction, creation included
    pub max_poll_attempts: u32,
    /// Wall-clock budget for one prediction
    pub poll_deadline: Duration,
    /// Announcement appended to the run summary
    pub next_run: String,
    /// Site link appended to the run summary
    pub site_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 150,
            poll_deadline: Duration::from_secs(600),
            next_run: "Tomorrow at 2 AM UTC".to_string(),
            site_url: "https://youtunes.lol".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            batch_size: std::env::var("PIPELINE_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.batch_size),
            poll_interval: Duration::from_secs(
                std::env::var("PIPELINE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            max_poll_attempts: std::env::var("PIPELINE_MAX_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.max_poll_attempts),
            poll_deadline: Duration::from_secs(
                std::env::var("PIPELINE_POLL_DEADLINE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            next_run: std::env::var("PIPELINE_NEXT_RUN").unwrap_or(defaults.next_run),
            site_url: std::env::var("PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
        }
    }
}
