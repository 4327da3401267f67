//! Shared HTTP plumbing for provider adapters.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::error::{GatewayError, ProviderError};

/// Per-request timeout for every provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error bodies are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 500;

/// Sampling temperature used by every model.
pub const TEMPERATURE: f32 = 0.7;

/// Builds the shared client.
///
/// # Errors
///
/// Returns `GatewayError::Setup` when the TLS backend cannot be initialised.
pub fn build_client() -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| GatewayError::Setup(e.to_string()))
}

/// Turns a non-success status into a `ProviderError`; otherwise decodes the
/// JSON body.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}
