//! OpenAI chat-completions client for track metadata.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use youtunes_models::{Candidate, TrackMetadata};

use crate::error::{required_env, ProviderError, ProviderResult};
use crate::http::{build_client, ensure_success};

const SERVICE: &str = "openai";

const SYSTEM_PROMPT: &str = "You are a music producer creating background music for videos.";

/// OpenAI client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let mut config = Self::new(required_env("OPENAI_API_KEY")?);
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// User prompt for a candidate.
pub fn metadata_prompt(candidate: &Candidate) -> String {
    format!(
        "Generate a music description for this video: \"{}\". Return JSON with: title, genre, mood, bpm, description",
        candidate.title
    )
}

/// Parse the model's JSON answer, tolerating a markdown code fence.
fn parse_metadata(text: &str) -> ProviderResult<TrackMetadata> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    serde_json::from_str(text.trim())
        .map_err(|e| ProviderError::invalid_response(SERVICE, format!("metadata JSON: {}", e)))
}

/// Metadata generation client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            config,
        })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Ask the model for `title, genre, mood, bpm, description` in JSON mode.
    pub async fn generate_track_metadata(&self, candidate: &Candidate) -> ProviderResult<TrackMetadata> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: metadata_prompt(candidate),
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(video_id = %candidate.video_id, model = %self.config.model, "Requesting track metadata");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::invalid_response(SERVICE, "no content in completion"))?;

        let metadata = parse_metadata(&content)?;
        info!(video_id = %candidate.video_id, track = %metadata.title, "Generated track metadata");
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = server.uri();
        OpenAiClient::new(config).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_metadata_prompt_embeds_title() {
        let prompt = metadata_prompt(&Candidate::new("abc", "Cats vs Cucumbers"));
        assert!(prompt.contains("\"Cats vs Cucumbers\""));
        assert!(prompt.ends_with("title, genre, mood, bpm, description"));
    }

    #[test]
    fn test_parse_metadata_strips_code_fence() {
        let meta = parse_metadata("```json\n{\"title\": \"Fenced\", \"bpm\": 90}\n```").unwrap();
        assert_eq!(meta.title, "Fenced");
        assert_eq!(meta.bpm, Some(90));
    }

    #[tokio::test]
    async fn test_generate_metadata_sends_json_mode_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"title":"Neon Drift","genre":"synthwave","mood":"dreamy","bpm":"110 BPM","description":"Warm pads"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let meta = client_for(&server)
            .generate_track_metadata(&Candidate::new("abc", "Night Drive"))
            .await
            .unwrap();
        assert_eq!(meta.title, "Neon Drift");
        assert_eq!(meta.bpm, Some(110));
    }

    #[tokio::test]
    async fn test_generate_metadata_rejects_non_json_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("not json")))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_track_metadata(&Candidate::new("abc", "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_generate_metadata_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_track_metadata(&Candidate::new("abc", "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_generate_metadata_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_track_metadata(&Candidate::new("abc", "t"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(500));
    }
}
