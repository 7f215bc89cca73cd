//! Shared response handling for provider clients.

use std::time::Duration;

use metrics::counter;
use reqwest::{Client, Response};

use crate::error::{ProviderError, ProviderResult};

/// Build an HTTP client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("youtunes/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Network)
}

/// Turn a non-success response into [`ProviderError::Status`] and count the call.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> ProviderResult<Response> {
    let status = response.status();

    counter!(
        "youtunes_provider_requests_total",
        "service" => service,
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
