//! YouTube Data API client for the trending chart.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use youtunes_models::Candidate;

use crate::error::{required_env, ProviderResult};
use crate::http::{build_client, ensure_success};

const SERVICE: &str = "youtube";

/// YouTube client configuration.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
    /// Region of the trending chart
    pub region_code: String,
    /// Page size requested from the chart
    pub max_results: u32,
    pub base_url: String,
    pub timeout: Duration,
}

impl YoutubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            region_code: "US".to_string(),
            max_results: 20,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let mut config = Self::new(required_env("YOUTUBE_API_KEY")?);
        if let Ok(region) = std::env::var("YOUTUBE_REGION_CODE") {
            if !region.trim().is_empty() {
                config.region_code = region.trim().to_string();
            }
        }
        Ok(config)
    }
}

/// `videos.list` response.
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

impl From<VideoItem> for Candidate {
    fn from(item: VideoItem) -> Self {
        let Snippet {
            title,
            description,
            thumbnails,
            channel_title,
            published_at,
        } = item.snippet;

        let thumbnail_url = thumbnails
            .high
            .or(thumbnails.medium)
            .or(thumbnails.default)
            .map(|t| t.url);

        Candidate {
            video_id: item.id,
            title,
            description,
            thumbnail_url,
            channel_title,
            view_count: parse_count(item.statistics.view_count.as_deref()),
            like_count: parse_count(item.statistics.like_count.as_deref()),
            published_at,
        }
    }
}

/// Trending catalog client.
#[derive(Clone)]
pub struct YoutubeClient {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            config,
        })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(YoutubeConfig::from_env()?)
    }

    /// Fetch the most-popular chart, ranked, at most `max_results` items.
    pub async fn fetch_trending(&self) -> ProviderResult<Vec<Candidate>> {
        let url = format!("{}/videos", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.max_results.to_string();

        debug!(region = %self.config.region_code, "Fetching trending chart");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("chart", "mostPopular"),
                ("maxResults", max_results.as_str()),
                ("regionCode", self.config.region_code.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let list: VideoListResponse = response.json().await?;
        let candidates: Vec<Candidate> = list
            .items
            .into_iter()
            .take(self.config.max_results as usize)
            .map(Candidate::from)
            .collect();

        info!(count = candidates.len(), "Fetched trending candidates");
        Ok(candidates)
    }
}
