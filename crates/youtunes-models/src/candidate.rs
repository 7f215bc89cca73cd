//! Trending candidate model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A trending item normalized from the catalog response.
///
/// Candidates live for a single run. A candidate that passes dedup is
/// inserted as-is into the `videos` table, so the field names double as
/// column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// External catalog identifier (the dedup key)
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Video description
    #[serde(default)]
    pub description: String,

    /// Thumbnail URL (highest resolution available)
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Channel name
    #[serde(default)]
    pub channel_title: String,

    /// View count
    #[serde(default)]
    pub view_count: u64,

    /// Like count
    #[serde(default)]
    pub like_count: u64,

    /// Publish timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Create a candidate with only the identifying fields set.
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            description: String::new(),
            thumbnail_url: None,
            channel_title: String::new(),
            view_count: 0,
            like_count: 0,
            published_at: None,
        }
    }

    /// Public watch URL on the catalog.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_serializes_as_video_row() {
        let mut candidate = Candidate::new("dQw4w9WgXcQ", "Song");
        candidate.view_count = 42;

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["view_count"], 42);
        assert_eq!(json["like_count"], 0);
        assert!(json["thumbnail_url"].is_null());
    }

    #[test]
    fn test_candidate_watch_url() {
        let candidate = Candidate::new("abc123", "t");
        assert_eq!(candidate.watch_url(), "https://www.youtube.com/watch?v=abc123");
    }
}
