//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return the render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "youtunes_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "youtunes_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "youtunes_http_requests_in_flight";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "youtunes_rate_limit_hits_total";
    pub const TRIGGERS_TOTAL: &str = "youtunes_triggers_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a request refused by the limiter of a route class.
pub fn record_rate_limit_hit(class: &'static str) {
    counter!(names::RATE_LIMIT_HITS_TOTAL, "class" => class).increment(1);
}

/// Record a trigger call by result (`completed`, `failed`, `conflict`, `unauthorized`).
pub fn record_trigger(result: &'static str) {
    counter!(names::TRIGGERS_TOTAL, "result" => result).increment(1);
}

/// Collapse per-file and static paths so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    if path.starts_with("/music/") {
        return "/music/:file".to_string();
    }
    if path.starts_with("/api/") || matches!(path, "/health" | "/healthz" | "/ready" | "/metrics") {
        return path.to_string();
    }
    "/static".to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed().as_secs_f64());

    response
}
