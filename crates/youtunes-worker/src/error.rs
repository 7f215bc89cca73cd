//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Trending fetch failed; fatal to the run.
    #[error("Failed to fetch trending videos: {0}")]
    UpstreamFetch(String),

    /// Dedup lookup failed; fatal to the item.
    #[error("Store query failed: {0}")]
    StoreQuery(String),

    /// Video or track insert failed; fatal to the item.
    #[error("Store write failed: {0}")]
    StoreWrite(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Music generation timed out after {attempts} status checks ({elapsed_secs}s)")]
    GenerationTimeout { attempts: u32, elapsed_secs: u64 },

    /// Durable upload failed; the transient URL is used instead.
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("A run is already in progress")]
    RunInProgress,
}

impl PipelineError {
    pub fn upstream_fetch(msg: impl Into<String>) -> Self {
        Self::UpstreamFetch(msg.into())
    }

    pub fn store_query(msg: impl Into<String>) -> Self {
        Self::StoreQuery(msg.into())
    }

    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// True if the error only costs the item its audio.
    pub fn is_audio_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Generation(_) | PipelineError::GenerationTimeout { .. }
        )
    }
}
