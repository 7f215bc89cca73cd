//! Structured run logging.
//!
//! Mirrors every progress event into the tracing log with the run's
//! contextual fields.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

use crate::events::{RunEvent, Severity};

/// Run-scoped logger carrying the run ID.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLogger {
    /// Create a logger with a fresh run ID.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger for a known run ID.
    pub fn from_string(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
        }
    }

    /// Log a progress event at the level its severity calls for.
    pub fn log_event(&self, event: &RunEvent) {
        let message = event.message();
        let kind = event.kind();
        match event.severity() {
            Severity::Info => info!(run_id = %self.run_id, event = kind, "{}", message),
            Severity::Warning => warn!(run_id = %self.run_id, event = kind, "{}", message),
            Severity::Error => error!(run_id = %self.run_id, event = kind, "{}", message),
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, "Run warning: {}", message);
    }

    pub fn log_completion(&self, processed: u32, total: u32, attempted: u32) {
        info!(
            run_id = %self.run_id,
            processed,
            total,
            attempted,
            "Run completed"
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Tracing span for the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id)
    }
}
