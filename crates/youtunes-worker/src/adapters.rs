//! Production implementations of the pipeline seams.

use async_trait::async_trait;
use tracing::warn;

use youtunes_db::{DbError, SupabaseClient, TrackRepository, VideoRepository};
use youtunes_models::{Candidate, NewTrack, Prediction, Track, TrackMetadata, Video};
use youtunes_providers::{DiscordWebhook, Embed, OpenAiClient, ReplicateClient, YoutubeClient};
use youtunes_storage::R2Client;

use crate::error::{PipelineError, PipelineResult};
use crate::events::RunEvent;
use crate::traits::{AudioGenerator, AudioStore, MetadataGenerator, Notifier, TrendingSource, VideoStore};

#[async_trait]
impl TrendingSource for YoutubeClient {
    async fn fetch_trending(&self) -> PipelineResult<Vec<Candidate>> {
        YoutubeClient::fetch_trending(self)
            .await
            .map_err(|e| PipelineError::upstream_fetch(e.to_string()))
    }
}

/// Video and track repositories behind one store.
#[derive(Clone)]
pub struct SupabaseStore {
    videos: VideoRepository,
    tracks: TrackRepository,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            videos: VideoRepository::new(client.clone()),
            tracks: TrackRepository::new(client),
        }
    }
}

fn write_error(what: &str, e: DbError) -> PipelineError {
    if e.is_conflict() {
        PipelineError::store_write(format!("{} already exists: {}", what, e))
    } else {
        PipelineError::store_write(e.to_string())
    }
}

#[async_trait]
impl VideoStore for SupabaseStore {
    async fn video_exists(&self, video_id: &str) -> PipelineResult<bool> {
        self.videos
            .exists(video_id)
            .await
            .map_err(|e| PipelineError::store_query(e.to_string()))
    }

    async fn insert_video(&self, candidate: &Candidate) -> PipelineResult<Video> {
        self.videos
            .insert(candidate)
            .await
            .map_err(|e| write_error("video", e))
    }

    async fn insert_track(&self, track: &NewTrack) -> PipelineResult<Track> {
        self.tracks
            .insert(track)
            .await
            .map_err(|e| write_error("track", e))
    }
}

#[async_trait]
impl MetadataGenerator for OpenAiClient {
    async fn generate_metadata(&self, candidate: &Candidate) -> PipelineResult<TrackMetadata> {
        self.generate_track_metadata(candidate)
            .await
            .map_err(|e| PipelineError::generation(e.to_string()))
    }
}

#[async_trait]
impl AudioGenerator for ReplicateClient {
    async fn start(&self, candidate: &Candidate) -> PipelineResult<Prediction> {
        self.create_prediction(candidate)
            .await
            .map_err(|e| PipelineError::generation(e.to_string()))
    }

    async fn poll(&self, prediction: &Prediction) -> PipelineResult<Prediction> {
        self.get_prediction(prediction)
            .await
            .map_err(|e| PipelineError::generation(e.to_string()))
    }

    async fn download(&self, url: &str) -> PipelineResult<Vec<u8>> {
        ReplicateClient::download(self, url)
            .await
            .map_err(|e| PipelineError::generation(format!("Failed to download audio: {}", e)))
    }
}

#[async_trait]
impl AudioStore for R2Client {
    async fn upload(&self, key: &str, audio: Vec<u8>) -> PipelineResult<String> {
        self.upload_track(key, audio)
            .await
            .map_err(|e| PipelineError::upload(e.to_string()))
    }
}

/// Posts each event as a Discord embed.
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: DiscordWebhook,
}

impl DiscordNotifier {
    pub fn new(webhook: DiscordWebhook) -> Self {
        Self { webhook }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, event: &RunEvent) {
        let embed = Embed::progress(event.message(), event.color());
        if let Err(e) = self.webhook.send(&embed).await {
            warn!(event = event.kind(), "Discord webhook error: {}", e);
        }
    }
}

/// Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _event: &RunEvent) {}
}
