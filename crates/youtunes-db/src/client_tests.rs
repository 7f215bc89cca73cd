//! Tests for the Supabase client and repositories against a mock PostgREST.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use youtunes_models::{Candidate, NewTrack, TrackMetadata, VideoRowId};

use crate::client::{SupabaseClient, SupabaseConfig};
use crate::error::DbError;
use crate::repos::{TrackRepository, VideoRepository};
use crate::retry::ReadRetry;

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config(url: &str) -> SupabaseConfig {
    SupabaseConfig {
        url: url.to_string(),
        service_key: "service-key".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        read_retry: ReadRetry {
            attempts: 3,
            backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        },
    }
}

async fn test_client() -> (MockServer, SupabaseClient) {
    let server = MockServer::start().await;
    let client = SupabaseClient::new(test_config(&server.uri())).unwrap();
    (server, client)
}

fn video_row(video_id: &str) -> serde_json::Value {
    json!({
        "id": "6f1c8f36-3c5a-4a52-9f77-4cf1b1a4d9b1",
        "video_id": video_id,
        "title": "Trending",
        "description": "",
        "thumbnail_url": null,
        "channel_title": "Channel",
        "view_count": 10,
        "like_count": 1,
        "published_at": null,
        "created_at": "2024-05-02T02:00:01+00:00"
    })
}

// =============================================================================
// Error Type Tests
// =============================================================================

#[test]
fn test_error_from_http_status_mapping() {
    assert!(matches!(DbError::from_http_status(401, "x"), DbError::AuthError(_)));
    assert!(matches!(DbError::from_http_status(404, "x"), DbError::NotFound(_)));
    assert!(DbError::from_http_status(409, "dup").is_conflict());
    assert!(DbError::from_http_status(429, "x").is_retryable());
    assert!(DbError::from_http_status(502, "x").is_retryable());
    assert!(!DbError::from_http_status(400, "x").is_retryable());
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(DbError::RateLimited(1000).http_status(), Some(429));
    assert_eq!(DbError::ServerError(503, "x".into()).http_status(), Some(503));
    assert_eq!(DbError::config_error("x").http_status(), None);
}

// =============================================================================
// Video Repository
// =============================================================================

#[tokio::test]
async fn test_video_exists_sends_filter_and_auth() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/videos"))
        .and(query_param("video_id", "eq.abc123"))
        .and(query_param("limit", "1"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "x"}])))
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    assert!(repo.exists("abc123").await.unwrap());
}

#[tokio::test]
async fn test_video_exists_false_on_empty_result() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    assert!(!repo.exists("new-video").await.unwrap());
}

#[tokio::test]
async fn test_video_exists_retries_server_errors() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    assert!(!repo.exists("abc").await.unwrap());
}

#[tokio::test]
async fn test_video_insert_returns_stored_row() {
    let (server, client) = test_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/videos"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({"video_id": "abc", "title": "Trending"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([video_row("abc")])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    let video = repo.insert(&Candidate::new("abc", "Trending")).await.unwrap();
    assert_eq!(video.video_id(), "abc");
}

#[tokio::test]
async fn test_video_insert_conflict_is_not_retried() {
    let (server, client) = test_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key value"))
        .expect(1)
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    let err = repo.insert(&Candidate::new("abc", "Trending")).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_insert_with_empty_representation_is_invalid() {
    let (server, client) = test_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = VideoRepository::new(client);
    let err = repo.insert(&Candidate::new("abc", "Trending")).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidResponse(_)));
}

// =============================================================================
// Track Repository
// =============================================================================

#[tokio::test]
async fn test_track_insert_serializes_payload() {
    let (server, client) = test_client().await;
    let row_id = VideoRowId::new();

    Mock::given(method("POST"))
        .and(path("/rest/v1/tracks"))
        .and(body_partial_json(json!({"title": "Neon Drift", "bpm": 120, "audio_url": null})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "0b8f1c4e-98b4-4d35-8d34-0a3f7e5c8d11",
            "video_id": row_id.to_string(),
            "title": "Neon Drift",
            "genre": "synthwave",
            "mood": "dreamy",
            "bpm": 120,
            "description": "d",
            "audio_url": null,
            "created_at": "2024-05-02T02:00:05+00:00"
        }])))
        .mount(&server)
        .await;

    let metadata = TrackMetadata {
        title: "Neon Drift".to_string(),
        genre: "synthwave".to_string(),
        mood: "dreamy".to_string(),
        bpm: Some(120),
        description: "d".to_string(),
    };

    let repo = TrackRepository::new(client);
    let track = repo
        .insert(&NewTrack::from_metadata(row_id, metadata, None))
        .await
        .unwrap();
    assert_eq!(track.video_id, row_id);
    assert!(track.audio_url.is_none());
}

#[tokio::test]
async fn test_track_recent_requests_join_and_order() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tracks"))
        .and(query_param("select", "*,videos(video_id,title,thumbnail_url,view_count)"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "0b8f1c4e-98b4-4d35-8d34-0a3f7e5c8d11",
            "video_id": "6f1c8f36-3c5a-4a52-9f77-4cf1b1a4d9b1",
            "title": "Neon Drift",
            "audio_url": "https://youtunes.lol/music/1-abc.mp3",
            "created_at": "2024-05-02T02:00:05+00:00",
            "videos": {"video_id": "abc", "title": "Trending", "thumbnail_url": null, "view_count": 99}
        }])))
        .mount(&server)
        .await;

    let repo = TrackRepository::new(client);
    let rows = repo.recent(50).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].videos.as_ref().map(|v| v.view_count), Some(99));
}

#[tokio::test]
async fn test_track_count_reads_content_range() {
    let (server, client) = test_client().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/tracks"))
        .and(header("prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/42"))
        .mount(&server)
        .await;

    let repo = TrackRepository::new(client);
    assert_eq!(repo.count().await.unwrap(), 42);
}

#[tokio::test]
async fn test_latest_created_at_empty_table() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tracks"))
        .and(query_param("select", "created_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = TrackRepository::new(client);
    assert!(repo.latest_created_at().await.unwrap().is_none());
}

#[tokio::test]
async fn test_auth_failure_maps_to_auth_error() {
    let (server, client) = test_client().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/videos"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, DbError::AuthError(_)));
}

#[tokio::test]
async fn test_single_attempt_policy_does_not_replay_count() {
    let server = MockServer::start().await;
    let config = SupabaseConfig {
        read_retry: ReadRetry::once(),
        ..test_config(&server.uri())
    };
    let client = SupabaseClient::new(config).unwrap();

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/tracks"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = TrackRepository::new(client).count().await;
    assert!(matches!(result, Err(DbError::ServerError(503, _))));
}
