//! Typed repositories for videos and tracks.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;
use tracing::info;

use youtunes_models::{Candidate, NewTrack, Track, TrackWithVideo, Video};

use crate::client::SupabaseClient;
use crate::error::DbResult;
use crate::retry::Read;

const VIDEOS: &str = "videos";
const TRACKS: &str = "tracks";

/// Columns of the owning video embedded in feed queries.
const FEED_SELECT: &str = "*,videos(video_id,title,thumbnail_url,view_count)";

#[derive(Deserialize)]
struct CreatedAtRow {
    created_at: DateTime<Utc>,
}

/// Repository for rows of the `videos` table.
#[derive(Clone)]
pub struct VideoRepository {
    client: SupabaseClient,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// True if a video with this external ID was already stored.
    pub async fn exists(&self, video_id: &str) -> DbResult<bool> {
        let rows: Vec<serde_json::Value> = self
            .client
            .select(
                Read::VideoExists,
                VIDEOS,
                &[
                    ("select", "id".to_string()),
                    ("video_id", format!("eq.{}", video_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Insert a candidate and return the stored row.
    ///
    /// A second insert with the same `video_id` fails with a conflict.
    pub async fn insert(&self, candidate: &Candidate) -> DbResult<Video> {
        let video: Video = self.client.insert(VIDEOS, candidate).await?;
        counter!("youtunes_db_videos_inserted_total").increment(1);
        info!(video_id = %video.video_id(), row_id = %video.id, "Stored video");
        Ok(video)
    }

    /// Total stored videos.
    pub async fn count(&self) -> DbResult<u64> {
        self.client.count(VIDEOS).await
    }
}

/// Repository for rows of the `tracks` table.
#[derive(Clone)]
pub struct TrackRepository {
    client: SupabaseClient,
}

impl TrackRepository {
    /// Create a new track repository.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Insert a track and return the stored row.
    pub async fn insert(&self, track: &NewTrack) -> DbResult<Track> {
        let stored: Track = self.client.insert(TRACKS, track).await?;
        counter!("youtunes_db_tracks_inserted_total").increment(1);
        info!(
            track_id = %stored.id,
            video_row = %stored.video_id,
            has_audio = stored.audio_url.is_some(),
            "Stored track"
        );
        Ok(stored)
    }

    /// Most recent tracks, newest first, joined with their video.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<TrackWithVideo>> {
        self.client
            .select(
                Read::RecentTracks,
                TRACKS,
                &[
                    ("select", FEED_SELECT.to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    /// Total stored tracks.
    pub async fn count(&self) -> DbResult<u64> {
        self.client.count(TRACKS).await
    }

    /// Creation time of the newest track, if any.
    pub async fn latest_created_at(&self) -> DbResult<Option<DateTime<Utc>>> {
        let rows: Vec<CreatedAtRow> = self
            .client
            .select(
                Read::LatestTrack,
                TRACKS,
                &[
                    ("select", "created_at".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|r| r.created_at))
    }
}
