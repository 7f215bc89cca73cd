//! API routes.

use std::path::Path;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::handlers::{cron_trigger, health, list_tracks, ready, serve_music};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, rate_limit_middleware, request_id, request_logging, security_headers, ClientRateLimit};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Separate per-client quotas: the trigger starts a paid run, the feed is cheap
    let trigger_limit = ClientRateLimit::per_minute("trigger", state.config.trigger_rate_per_minute);
    let feed_limit = ClientRateLimit::per_second("feed", state.config.rate_limit_rps);

    let trigger_routes = Router::new()
        .route("/cron-trigger", get(cron_trigger).post(cron_trigger))
        .layer(middleware::from_fn_with_state(trigger_limit, rate_limit_middleware));

    let feed_routes = Router::new()
        .route("/tracks", get(list_tracks))
        .layer(middleware::from_fn_with_state(feed_limit, rate_limit_middleware));

    let api_routes = Router::new().merge(trigger_routes).merge(feed_routes);

    let music_routes = Router::new().route("/music/:file", get(serve_music));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Everything else is the static site, with index.html for unknown paths
    let static_dir = Path::new(&state.config.static_dir);
    let static_files = ServeDir::new(static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .merge(music_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback_service(static_files)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
