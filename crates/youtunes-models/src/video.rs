//! Persisted video model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::candidate::Candidate;

/// Store-assigned identifier of a video row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoRowId(pub Uuid);

impl VideoRowId {
    /// Generate a new random row ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VideoRowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A video row in the `videos` table.
///
/// Created exactly once per unique `video_id`; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Store-assigned identifier
    pub id: VideoRowId,

    /// Candidate fields, flattened into the row
    #[serde(flatten)]
    pub candidate: Candidate,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Video {
    /// External catalog identifier.
    pub fn video_id(&self) -> &str {
        &self.candidate.video_id
    }

    /// Video title.
    pub fn title(&self) -> &str {
        &self.candidate.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_row_deserializes_from_store() {
        let row = serde_json::json!({
            "id": "6f1c8f36-3c5a-4a52-9f77-4cf1b1a4d9b1",
            "video_id": "abc",
            "title": "Trending",
            "description": "desc",
            "thumbnail_url": "https://i.ytimg.com/vi/abc/hqdefault.jpg",
            "channel_title": "Channel",
            "view_count": 1200,
            "like_count": 30,
            "published_at": "2024-05-01T12:00:00Z",
            "created_at": "2024-05-02T02:00:01.123456+00:00"
        });

        let video: Video = serde_json::from_value(row).unwrap();
        assert_eq!(video.video_id(), "abc");
        assert_eq!(video.title(), "Trending");
        assert_eq!(video.candidate.view_count, 1200);
        assert!(video.candidate.published_at.is_some());
    }
}
