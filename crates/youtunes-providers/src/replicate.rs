//! Replicate predictions client (MusicGen).
//!
//! Creating a prediction returns immediately with a job snapshot; callers
//! poll `urls.get` until the job reaches a terminal status, then download
//! the output.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use youtunes_models::{truncate_chars, Candidate, Prediction};

use crate::error::{required_env, ProviderError, ProviderResult};
use crate::http::{build_client, ensure_success};

const SERVICE: &str = "replicate";

/// MusicGen model version used when none is configured.
pub const DEFAULT_MODEL_VERSION: &str = "b05b1dff1d8c6dc63d14b0cdb42135378dcb87f6373b0d3d341ede46e59e2b38";

/// Replicate client configuration.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_key: String,
    pub model_version: String,
    pub base_url: String,
    pub timeout: Duration,
    /// MusicGen variant
    pub model_variant: String,
    /// Clip length in seconds
    pub duration: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
}

impl ReplicateConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            base_url: "https://api.replicate.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            model_variant: "stereo-large".to_string(),
            duration: 30,
            temperature: 1.0,
            top_k: 250,
            top_p: 0.0,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let mut config = Self::new(required_env("REPLICATE_API_KEY")?);
        if let Ok(version) = std::env::var("REPLICATE_MODEL_VERSION") {
            if !version.trim().is_empty() {
                config.model_version = version.trim().to_string();
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: MusicGenInput<'a>,
}

#[derive(Debug, Serialize)]
struct MusicGenInput<'a> {
    prompt: String,
    model_version: &'a str,
    duration: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
}

/// Generation prompt: the title plus the first 200 characters of the description.
pub fn music_prompt(candidate: &Candidate) -> String {
    let description: String = candidate.description.chars().take(200).collect();
    format!("Create background music inspired by: {}. {}", candidate.title, description)
}

/// Audio generation client.
#[derive(Clone)]
pub struct ReplicateClient {
    http: Client,
    config: ReplicateConfig,
}

impl ReplicateClient {
    pub fn new(config: ReplicateConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            config,
        })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ReplicateConfig::from_env()?)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.config.api_key)
    }

    /// Start a prediction for a candidate.
    pub async fn create_prediction(&self, candidate: &Candidate) -> ProviderResult<Prediction> {
        let url = format!("{}/predictions", self.config.base_url.trim_end_matches('/'));

        let request = CreatePrediction {
            version: &self.config.model_version,
            input: MusicGenInput {
                prompt: music_prompt(candidate),
                model_version: &self.config.model_variant,
                duration: self.config.duration,
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
            },
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let prediction: Prediction = response.json().await?;
        info!(
            video_id = %candidate.video_id,
            prediction_id = %prediction.id,
            status = %prediction.status,
            "Created prediction"
        );
        Ok(prediction)
    }

    /// Fetch the current snapshot of a prediction.
    ///
    /// Uses the job's own `urls.get` link, falling back to `/predictions/{id}`.
    pub async fn get_prediction(&self, prediction: &Prediction) -> ProviderResult<Prediction> {
        let url = match prediction.urls.get.as_deref() {
            Some(get) => get.to_string(),
            None => format!(
                "{}/predictions/{}",
                self.config.base_url.trim_end_matches('/'),
                prediction.id
            ),
        };

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let snapshot: Prediction = response.json().await?;
        debug!(prediction_id = %snapshot.id, status = %snapshot.status, "Polled prediction");
        Ok(snapshot)
    }

    /// Download a finished output payload.
    pub async fn download(&self, url: &str) -> ProviderResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(SERVICE, response).await?;
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Err(ProviderError::invalid_response(
                SERVICE,
                format!("empty audio payload from {}", truncate_chars(url, 80)),
            ));
        }

        debug!(bytes = bytes.len(), "Downloaded generated audio");
        Ok(bytes.to_vec())
    }
}
