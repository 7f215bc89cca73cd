//! Run outcome models returned to the trigger caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Outcome of a single candidate within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Video and track persisted with audio
    Success,
    /// Video and track persisted, audio generation failed
    Partial,
    /// Video already processed in an earlier run
    SkippedDuplicate,
    /// Item failed before a track could be persisted
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Success => "success",
            ItemStatus::Partial => "partial",
            ItemStatus::SkippedDuplicate => "skipped_duplicate",
            ItemStatus::Failed => "failed",
        }
    }

    /// True if a track row was created for the item.
    pub fn created_track(&self) -> bool {
        matches!(self, ItemStatus::Success | ItemStatus::Partial)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-item record in a run outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ItemOutcome {
    /// External catalog identifier
    pub video_id: String,
    /// Video title
    pub video: String,
    pub outcome: ItemStatus,
    /// True when a track was persisted
    pub success: bool,
    /// Title of the persisted track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    fn base(candidate: &Candidate, outcome: ItemStatus) -> Self {
        Self {
            video_id: candidate.video_id.clone(),
            video: candidate.title.clone(),
            outcome,
            success: outcome.created_track(),
            track: None,
            audio_url: None,
            error: None,
        }
    }

    pub fn success(candidate: &Candidate, track: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            track: Some(track.into()),
            audio_url: Some(audio_url.into()),
            ..Self::base(candidate, ItemStatus::Success)
        }
    }

    pub fn partial(candidate: &Candidate, track: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            track: Some(track.into()),
            error: Some(error.into()),
            ..Self::base(candidate, ItemStatus::Partial)
        }
    }

    pub fn skipped(candidate: &Candidate) -> Self {
        Self::base(candidate, ItemStatus::SkippedDuplicate)
    }

    pub fn failed(candidate: &Candidate, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(candidate, ItemStatus::Failed)
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunOutcome {
    /// Items for which a track was persisted
    pub processed: u32,
    /// Candidates fetched from the catalog
    pub total: u32,
    /// Items that went past dedup into generation
    pub attempted: u32,
    pub results: Vec<ItemOutcome>,
}

impl RunOutcome {
    pub fn new(total: usize) -> Self {
        Self {
            total: total as u32,
            ..Default::default()
        }
    }

    /// Note that an item passed dedup and entered generation.
    pub fn mark_attempted(&mut self) {
        self.attempted += 1;
    }

    /// Record an item and update counters.
    pub fn record(&mut self, item: ItemOutcome) {
        if item.outcome.created_track() {
            self.processed += 1;
        }
        self.results.push(item);
    }

    /// Count of items with the given status.
    pub fn count(&self, status: ItemStatus) -> usize {
        self.results.iter().filter(|r| r.outcome == status).count()
    }
}
