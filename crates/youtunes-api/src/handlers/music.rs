//! Public audio proxy.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tracing::{debug, error, warn};

use youtunes_storage::AUDIO_CONTENT_TYPE;

use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_track_file;
use crate::state::AppState;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Stream a stored track.
pub async fn serve_music(State(state): State<AppState>, Path(file): Path<String>) -> ApiResult<Response> {
    if !is_valid_track_file(&file) {
        warn!(file = %file, "Rejected music file name");
        return Err(ApiError::bad_request("Invalid file name"));
    }

    let object = state.storage.get_track(&file).await.map_err(|e| {
        if e.is_not_found() {
            debug!(file = %file, "Music file not found");
            ApiError::not_found("Music file not found")
        } else {
            error!(file = %file, error = %e, "Failed to load music file");
            ApiError::Storage(e)
        }
    })?;

    let content_type = if object.content_type.is_empty() || object.content_type == "application/octet-stream" {
        AUDIO_CONTENT_TYPE.to_string()
    } else {
        object.content_type
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.bytes.len())
        .header(header::CACHE_CONTROL, IMMUTABLE_CACHE)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header("Cross-Origin-Resource-Policy", "cross-origin");

    if let Some(etag) = object.etag {
        builder = builder.header(header::ETAG, etag);
    }

    builder
        .body(Body::from(object.bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}
