//! Asynchronous audio generation job (prediction) models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a prediction as reported by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    /// Job accepted, not yet running
    #[default]
    Starting,
    /// Job running
    Processing,
    /// Output available
    Succeeded,
    /// Job failed
    Failed,
    /// Job was canceled upstream
    Canceled,
    /// Any status this client does not know; treated as a failed job
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Unknown => "unknown",
        }
    }

    /// Check if this is a terminal state (polling stops).
    ///
    /// `Canceled` and `Unknown` count as failures.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded
                | PredictionStatus::Failed
                | PredictionStatus::Canceled
                | PredictionStatus::Unknown
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionStatus::Succeeded)
    }
}

impl std::fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Links returned alongside a prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionUrls {
    /// Status endpoint to poll
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}

/// Prediction output: a single URL or a list of URLs depending on the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PredictionOutput {
    Url(String),
    Urls(Vec<String>),
}

impl PredictionOutput {
    /// First output URL, if any.
    pub fn first_url(&self) -> Option<&str> {
        match self {
            PredictionOutput::Url(url) => Some(url.as_str()),
            PredictionOutput::Urls(urls) => urls.first().map(String::as_str),
        }
    }
}

/// A prediction snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub urls: PredictionUrls,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    /// Output URL when the job succeeded.
    pub fn output_url(&self) -> Option<&str> {
        if !self.status.is_success() {
            return None;
        }
        self.output.as_ref().and_then(PredictionOutput::first_url)
    }

    /// Human-readable failure reason.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => format!("prediction {}", self.status),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PredictionStatus::Starting.is_terminal());
        assert!(!PredictionStatus::Processing.is_terminal());
        assert!(PredictionStatus::Succeeded.is_terminal());
        assert!(PredictionStatus::Failed.is_terminal());
        assert!(PredictionStatus::Canceled.is_terminal());
        assert!(PredictionStatus::Unknown.is_terminal());
        assert!(!PredictionStatus::Unknown.is_success());
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "aborted",
            "output": "https://replicate.delivery/out.mp3"
        }))
        .unwrap();

        assert_eq!(p.status, PredictionStatus::Unknown);
        assert_eq!(p.output_url(), None);
        assert_eq!(p.error_message(), "prediction unknown");
    }

    #[test]
    fn test_prediction_string_output() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "succeeded",
            "urls": {"get": "https://api.replicate.com/v1/predictions/p1"},
            "output": "https://replicate.delivery/out.mp3"
        }))
        .unwrap();

        assert_eq!(p.output_url(), Some("https://replicate.delivery/out.mp3"));
    }

    #[test]
    fn test_prediction_list_output() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/a.mp3", "https://replicate.delivery/b.mp3"]
        }))
        .unwrap();

        assert_eq!(p.output_url(), Some("https://replicate.delivery/a.mp3"));
    }

    #[test]
    fn test_output_hidden_until_succeeded() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "processing",
            "output": "https://replicate.delivery/partial.mp3"
        }))
        .unwrap();

        assert_eq!(p.output_url(), None);
    }

    #[test]
    fn test_error_message() {
        let p: Prediction = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "failed",
            "error": "CUDA out of memory"
        }))
        .unwrap();
        assert_eq!(p.error_message(), "CUDA out of memory");

        let p: Prediction = serde_json::from_value(serde_json::json!({"id": "p2", "status": "canceled"})).unwrap();
        assert_eq!(p.error_message(), "prediction canceled");
    }
}
