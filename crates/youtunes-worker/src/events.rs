//! Progress events emitted during a run.
//!
//! Each event renders to the human-readable line posted to the notification
//! channel and mirrored into the structured log.

use youtunes_models::{format_count, truncate_chars};

/// Embed colors.
pub mod colors {
    pub const SUCCESS: u32 = 0x10b981;
    pub const INFO: u32 = 0x6366f1;
    pub const SKIP: u32 = 0x94a3b8;
    pub const METADATA: u32 = 0x8b5cf6;
    pub const AUDIO: u32 = 0xec4899;
    pub const WARNING: u32 = 0xfbbf24;
    pub const ERROR: u32 = 0xef4444;
}

/// How an event is weighted in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started,
    FetchFailed { error: String },
    Found { count: usize, batch: usize },
    SkippedDuplicate { title: String },
    Processing { title: String, view_count: u64 },
    GeneratingMetadata,
    MetadataReady { track: String, genre: String, mood: String },
    GeneratingAudio,
    AudioReady,
    Uploaded,
    UploadFallback { error: String },
    AudioFailed { error: String },
    TrackSaved { track: String },
    ItemFailed { error: String },
    Completed {
        processed: u32,
        total: u32,
        next_run: String,
        site_url: String,
    },
}

impl RunEvent {
    /// Notification text (Discord markdown).
    pub fn message(&self) -> String {
        match self {
            RunEvent::Started => {
                "🚀 **Starting daily music generation**\nFetching trending YouTube videos...".to_string()
            }
            RunEvent::FetchFailed { error } => format!("❌ Failed to fetch trending videos: {}", error),
            RunEvent::Found { count, batch } => {
                format!("📊 Found **{}** trending videos\nProcessing top {}...", count, batch)
            }
            RunEvent::SkippedDuplicate { title } => {
                format!("⏭️ Skipping already processed: **{}**", truncate_chars(title, 50))
            }
            RunEvent::Processing { title, view_count } => format!(
                "🎬 Processing: **{}**\nViews: {}",
                truncate_chars(title, 60),
                format_count(*view_count)
            ),
            RunEvent::GeneratingMetadata => "🎼 Generating music metadata with AI...".to_string(),
            RunEvent::MetadataReady { track, genre, mood } => {
                format!("✅ Created track: **{}**\nGenre: {} | Mood: {}", track, genre, mood)
            }
            RunEvent::GeneratingAudio => "🎵 Generating AI music (this may take 30-60s)...".to_string(),
            RunEvent::AudioReady => "✨ Music generated! Uploading to R2...".to_string(),
            RunEvent::Uploaded => "☁️ Uploaded to R2 storage!".to_string(),
            RunEvent::UploadFallback { .. } => "⚠️ R2 upload failed, using direct URL".to_string(),
            RunEvent::AudioFailed { error } => {
                format!("⚠️ Music generation failed: {}\nSaving track without audio", error)
            }
            RunEvent::TrackSaved { track } => format!("💾 Saved to database: **{}**", track),
            RunEvent::ItemFailed { error } => format!("❌ Error processing video: {}", error),
            RunEvent::Completed {
                processed,
                total,
                next_run,
                site_url,
            } => format!(
                "✅ **Generation Complete!**\n\n\
                 📊 Processed: {}/{} videos\n\
                 🎵 New tracks: {}\n\
                 ⏰ Next run: {}\n\n\
                 Visit {} to listen! 🎧",
                processed, total, processed, next_run, site_url
            ),
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            RunEvent::Started
            | RunEvent::MetadataReady { .. }
            | RunEvent::AudioReady
            | RunEvent::Uploaded
            | RunEvent::TrackSaved { .. } => colors::SUCCESS,
            RunEvent::Found { .. } | RunEvent::Processing { .. } => colors::INFO,
            RunEvent::SkippedDuplicate { .. } => colors::SKIP,
            RunEvent::GeneratingMetadata => colors::METADATA,
            RunEvent::GeneratingAudio => colors::AUDIO,
            RunEvent::UploadFallback { .. } => colors::WARNING,
            RunEvent::AudioFailed { .. } | RunEvent::ItemFailed { .. } | RunEvent::FetchFailed { .. } => {
                colors::ERROR
            }
            RunEvent::Completed { processed, .. } => {
                if *processed > 0 {
                    colors::SUCCESS
                } else {
                    colors::WARNING
                }
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RunEvent::FetchFailed { .. } | RunEvent::ItemFailed { .. } => Severity::Error,
            RunEvent::UploadFallback { .. } | RunEvent::AudioFailed { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Short machine-readable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::Started => "started",
            RunEvent::FetchFailed { .. } => "fetch_failed",
            RunEvent::Found { .. } => "found",
            RunEvent::SkippedDuplicate { .. } => "skipped_duplicate",
            RunEvent::Processing { .. } => "processing",
            RunEvent::GeneratingMetadata => "generating_metadata",
            RunEvent::MetadataReady { .. } => "metadata_ready",
            RunEvent::GeneratingAudio => "generating_audio",
            RunEvent::AudioReady => "audio_ready",
            RunEvent::Uploaded => "uploaded",
            RunEvent::UploadFallback { .. } => "upload_fallback",
            RunEvent::AudioFailed { .. } => "audio_failed",
            RunEvent::TrackSaved { .. } => "track_saved",
            RunEvent::ItemFailed { .. } => "item_failed",
            RunEvent::Completed { .. } => "completed",
        }
    }
}
