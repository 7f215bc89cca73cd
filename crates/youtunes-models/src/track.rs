//! Generated track models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::video::VideoRowId;

/// Music description returned by the text-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,

    /// Musical genre
    #[serde(default)]
    pub genre: String,

    /// Mood
    #[serde(default)]
    pub mood: String,

    /// Tempo in beats per minute
    #[serde(default, deserialize_with = "lenient_bpm")]
    pub bpm: Option<u32>,

    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// Models answer with `120`, `"120"`, `"120 BPM"` or `"90-100"`; keep the
/// leading integer and drop anything unparseable.
fn lenient_bpm<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

/// Insert payload for the `tracks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    /// Owning video row
    pub video_id: VideoRowId,
    pub title: String,
    pub genre: String,
    pub mood: String,
    pub bpm: Option<u32>,
    pub description: String,
    /// Durable or transient audio location; `None` when generation failed
    pub audio_url: Option<String>,
}

impl NewTrack {
    /// Build an insert payload from generated metadata.
    pub fn from_metadata(video_id: VideoRowId, metadata: TrackMetadata, audio_url: Option<String>) -> Self {
        Self {
            video_id,
            title: metadata.title,
            genre: metadata.genre,
            mood: metadata.mood,
            bpm: metadata.bpm,
            description: metadata.description,
            audio_url,
        }
    }
}

/// A track row in the `tracks` table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Track {
    pub id: Uuid,
    pub video_id: VideoRowId,
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Subset of the owning video embedded in a feed query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
}

/// Track row joined with its video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackWithVideo {
    #[serde(flatten)]
    pub track: Track,
    /// Embedded resource; `None` if the join produced nothing
    #[serde(default)]
    pub videos: Option<VideoSummary>,
}

/// Track as exposed by the read API.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackFeedItem {
    pub id: Uuid,
    pub title: String,
    pub audio_url: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub bpm: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub video_title: String,
    pub thumbnail_url: Option<String>,
    pub view_count: u64,
}

impl From<TrackWithVideo> for TrackFeedItem {
    fn from(row: TrackWithVideo) -> Self {
        let TrackWithVideo { track, videos } = row;
        let (video_title, thumbnail_url, view_count) = match videos {
            Some(v) => (v.title, v.thumbnail_url, v.view_count),
            None => ("Unknown Video".to_string(), None, 0),
        };

        Self {
            id: track.id,
            title: track.title,
            audio_url: track.audio_url,
            genre: track.genre,
            mood: track.mood,
            bpm: track.bpm,
            created_at: track.created_at,
            video_title,
            thumbnail_url,
            view_count,
        }
    }
}
