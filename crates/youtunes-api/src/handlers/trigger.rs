//! Scheduled run trigger.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use youtunes_models::RunOutcome;
use youtunes_worker::PipelineError;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_trigger;
use crate::security::bearer_matches;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerResponse {
    fn completed(result: RunOutcome) -> Self {
        Self {
            success: true,
            message: Some("Cron job completed".to_string()),
            result: Some(result),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Run the pipeline once.
///
/// The run executes on its own task while holding the lease, so a caller
/// that disconnects does not cut it short. A second call while a run is in
/// flight gets `409`.
pub async fn cron_trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let authorized = state
        .config
        .cron_secret
        .as_deref()
        .is_some_and(|secret| bearer_matches(authorization, secret));

    if !authorized {
        warn!("Rejected trigger with missing or invalid credentials");
        record_trigger("unauthorized");
        return Err(ApiError::Unauthorized);
    }

    let Some(guard) = state.lease.try_acquire() else {
        warn!("Trigger refused: run already in progress");
        record_trigger("conflict");
        return Ok((
            StatusCode::CONFLICT,
            Json(TriggerResponse::failed(PipelineError::RunInProgress.to_string())),
        ));
    };

    info!("Trigger accepted, starting run");

    let pipeline = Arc::clone(&state.pipeline);
    let run = tokio::spawn(async move {
        let _guard = guard;
        pipeline.run().await
    });

    match run.await {
        Ok(Ok(outcome)) => {
            record_trigger("completed");
            Ok((StatusCode::OK, Json(TriggerResponse::completed(outcome))))
        }
        Ok(Err(e)) => {
            error!(error = %e, "Run failed");
            record_trigger("failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResponse::failed(e.to_string())),
            ))
        }
        Err(e) => {
            error!(error = %e, "Run task aborted");
            record_trigger("failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TriggerResponse::failed(format!("Run task aborted: {}", e))),
            ))
        }
    }
}
