use reqwest::{Client, Response};
use std::time::Duration;
use tracing::error;

use super::types::{ModelError, ProviderKind};

/// Shared client settings for every provider adapter
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, ModelError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ModelError::Client(e.to_string()))
}

/// Turn a non-2xx response into `ModelError::Api` with the body text
pub(crate) async fn check_status(
    provider: ProviderKind,
    response: Response,
) -> Result<Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
    error!(%provider, status = status.as_u16(), "model API returned an error");
    Err(ModelError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn transport(provider: ProviderKind) -> impl FnOnce(reqwest::Error) -> ModelError {
    move |source| {
        error!(%provider, error = %source, "model HTTP request failed (transport)");
        ModelError::Transport { provider, source }
    }
}

pub(crate) fn decode(provider: ProviderKind) -> impl FnOnce(reqwest::Error) -> ModelError {
    move |e| ModelError::Decode {
        provider,
        message: format!("failed to parse response body: {e}"),
    }
}
