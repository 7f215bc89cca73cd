//! Seams between the orchestrator and the services it drives.
//!
//! Production implementations live in [`crate::adapters`]; tests swap in
//! in-memory fakes.

use async_trait::async_trait;

use youtunes_models::{Candidate, NewTrack, Prediction, Track, TrackMetadata, Video};

use crate::error::PipelineResult;
use crate::events::RunEvent;

/// Ranked trending candidates.
#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn fetch_trending(&self) -> PipelineResult<Vec<Candidate>>;
}

/// Relational store for videos and tracks.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Side-effect-free dedup lookup.
    async fn video_exists(&self, video_id: &str) -> PipelineResult<bool>;

    async fn insert_video(&self, candidate: &Candidate) -> PipelineResult<Video>;

    async fn insert_track(&self, track: &NewTrack) -> PipelineResult<Track>;
}

/// Text model producing track metadata.
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn generate_metadata(&self, candidate: &Candidate) -> PipelineResult<TrackMetadata>;
}

/// Asynchronous audio generation service.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Create a job. The returned snapshot counts as the first status check.
    async fn start(&self, candidate: &Candidate) -> PipelineResult<Prediction>;

    async fn poll(&self, prediction: &Prediction) -> PipelineResult<Prediction>;

    async fn download(&self, url: &str) -> PipelineResult<Vec<u8>>;
}

/// Durable object storage for audio.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Store the payload and return its public URL.
    async fn upload(&self, key: &str, audio: Vec<u8>) -> PipelineResult<String>;
}

/// Progress notification sink.
///
/// Delivery problems are the implementation's to log; nothing is returned.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &RunEvent);
}
