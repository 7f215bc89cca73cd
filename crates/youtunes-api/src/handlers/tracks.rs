//! Public track feed.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use youtunes_db::DbResult;
use youtunes_models::TrackFeedItem;

use crate::state::AppState;

/// Number of tracks returned by the feed.
pub const FEED_LIMIT: u32 = 50;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub track_count: u64,
    pub video_count: u64,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize)]
pub struct TracksResponse {
    pub tracks: Vec<TrackFeedItem>,
    pub stats: FeedStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn load_feed(state: &AppState) -> DbResult<TracksResponse> {
    let (rows, track_count, video_count, last_update) = tokio::try_join!(
        state.tracks.recent(FEED_LIMIT),
        state.tracks.count(),
        state.videos.count(),
        state.tracks.latest_created_at(),
    )?;

    Ok(TracksResponse {
        tracks: rows.into_iter().map(TrackFeedItem::from).collect(),
        stats: FeedStats {
            track_count,
            video_count,
            last_update,
        },
        error: None,
    })
}

/// Recent tracks with catalog stats.
///
/// Always answers 200; a store failure yields an empty feed carrying the
/// error message.
pub async fn list_tracks(State(state): State<AppState>) -> impl IntoResponse {
    let body = match load_feed(&state).await {
        Ok(feed) => feed,
        Err(e) => {
            error!(error = %e, "Failed to load track feed");
            TracksResponse {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    };

    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body))
}
