//! Supabase REST (PostgREST) client.
//!
//! Thin typed wrapper over the `/rest/v1` surface:
//! - Service-key authentication (`apikey` header plus bearer)
//! - HTTP client tuning (pooling, timeouts)
//! - Retry with backoff for reads only
//! - Observability (tracing spans, metrics)

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info_span, Instrument};

use crate::error::{DbError, DbResult};
use crate::metrics::record_request;
use crate::retry::{Read, ReadRetry};

// =============================================================================
// Configuration
// =============================================================================

/// Supabase client configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service-role key used for both reads and writes
    pub service_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Replay policy for reads
    pub read_retry: ReadRetry,
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DbResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| DbError::config_error("SUPABASE_URL must be set"))?;
        if url.trim().is_empty() {
            return Err(DbError::config_error("SUPABASE_URL cannot be empty"));
        }

        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| DbError::config_error("SUPABASE_SERVICE_KEY must be set"))?;
        if service_key.is_empty() {
            return Err(DbError::config_error("SUPABASE_SERVICE_KEY cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("SUPABASE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let defaults = ReadRetry::default();
        let read_retry = ReadRetry {
            attempts: std::env::var("SUPABASE_READ_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.attempts),
            backoff: std::env::var("SUPABASE_READ_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
            ..defaults
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            read_retry,
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Supabase PostgREST client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    rest_url: String,
}

impl SupabaseClient {
    /// Create a new client.
    pub fn new(config: SupabaseConfig) -> DbResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.service_key)
                .map_err(|_| DbError::config_error("SUPABASE_SERVICE_KEY is not a valid header value"))?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .default_headers(headers)
            .user_agent(concat!("youtunes-db/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DbError::Network)?;

        let rest_url = format!("{}/rest/v1", config.url.trim_end_matches('/'));

        Ok(Self {
            http,
            config,
            rest_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> DbResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.config.service_key)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Select rows from a table. `query` holds PostgREST filter pairs;
    /// `read` names the query for replay and metrics.
    pub async fn select<T>(&self, read: Read, table: &str, query: &[(&str, String)]) -> DbResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table);
        let url = url.as_str();

        self.config.read_retry.run(read, move || {
            self.execute_request(read.label(), table, async move {
                let response = self
                    .authed(self.http.get(url))
                    .query(query)
                    .send()
                    .await?;
                let status = response.status();

                if status != StatusCode::OK {
                    return Err(Self::handle_error_response(status, url, response).await);
                }

                let rows: Vec<T> = response.json().await?;
                debug!(table = %table, rows = rows.len(), "Selected rows");
                Ok(rows)
            })
        })
        .await
    }

    /// Insert one row and return the stored representation.
    ///
    /// Not retried: a timed-out insert may already have landed.
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> DbResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table);

        self.execute_request("insert", table, async {
            let response = self
                .authed(self.http.post(&url))
                .header("Prefer", "return=representation")
                .json(body)
                .send()
                .await?;
            let status = response.status();

            match status {
                StatusCode::OK | StatusCode::CREATED => {
                    let mut rows: Vec<T> = response.json().await?;
                    if rows.is_empty() {
                        return Err(DbError::invalid_response(format!(
                            "insert into {} returned no rows",
                            table
                        )));
                    }
                    Ok(rows.swap_remove(0))
                }
                _ => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Exact row count of a table.
    pub async fn count(&self, table: &str) -> DbResult<u64> {
        let url = self.table_url(table);
        let url = url.as_str();

        self.config.read_retry.run(Read::Count, move || {
            self.execute_request(Read::Count.label(), table, async move {
                let response = self
                    .authed(self.http.head(url))
                    .query(&[("select", "id")])
                    .header("Prefer", "count=exact")
                    .send()
                    .await?;
                let status = response.status();

                if !status.is_success() {
                    return Err(Self::handle_error_response(status, url, response).await);
                }

                let range = response
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| DbError::invalid_response("missing Content-Range header"))?;

                parse_content_range_total(range).ok_or_else(|| {
                    DbError::invalid_response(format!("unparseable Content-Range: {}", range))
                })
            })
        })
        .await
    }

    /// Cheap connectivity check used by readiness.
    pub async fn ping(&self) -> DbResult<()> {
        let url = self.table_url("videos");

        self.execute_request("ping", "videos", async {
            let response = self
                .authed(self.http.get(&url))
                .query(&[("select", "id"), ("limit", "1")])
                .send()
                .await?;
            let status = response.status();

            if status.is_success() {
                Ok(())
            } else {
                Err(Self::handle_error_response(status, &url, response).await)
            }
        })
        .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn execute_request<T, F>(&self, operation: &str, table: &str, fut: F) -> DbResult<T>
    where
        F: std::future::Future<Output = DbResult<T>>,
    {
        let span = info_span!("db_request", operation = %operation, table = %table);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: reqwest::Response) -> DbError {
        let body = response.text().await.unwrap_or_default();
        DbError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

/// Parse the total out of a PostgREST `Content-Range` header (`0-24/3573`, `*/0`).
pub(crate) fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

// =============================================================================
// Tests
// =============================================================================
