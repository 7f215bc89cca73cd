//! Shared data models for the YouTunes backend.
//!
//! This crate provides Serde-serializable types for:
//! - Trending candidates fetched from the video catalog
//! - Persisted videos and generated tracks
//! - Audio generation jobs (predictions)
//! - Run outcomes reported to the trigger caller

pub mod candidate;
pub mod prediction;
pub mod run;
pub mod track;
pub mod utils;
pub mod video;

// Re-export common types
pub use candidate::Candidate;
pub use prediction::{Prediction, PredictionOutput, PredictionStatus, PredictionUrls};
pub use run::{ItemOutcome, ItemStatus, RunOutcome};
pub use track::{NewTrack, Track, TrackFeedItem, TrackMetadata, TrackWithVideo, VideoSummary};
pub use utils::{
    format_count, is_safe_object_name, is_valid_audio_url, track_object_key, truncate_chars,
};
pub use video::{Video, VideoRowId};
