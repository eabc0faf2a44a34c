//! HTTP client for the Alpaca trading API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::AlpacaConfig;
use super::credentials::Credentials;
use super::error::AlpacaError;

const USER_AGENT: &str = concat!("account-gateway/", env!("CARGO_PKG_VERSION"));

/// One provider session: a pooled HTTP client bound to a credential set.
///
/// Safe for concurrent read-only use; it holds no per-request state.
#[derive(Debug)]
pub struct AlpacaHttpClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config. Performs no network I/O.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AlpacaError::Configuration(e.without_url().to_string()))?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
            base_url: config.trading_base_url().to_string(),
        })
    }

    /// Make a single GET request to the trading API.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(path, "Sending provider request");

        let response = self
            .client
            .get(&url)
            .header("APCA-API-KEY-ID", self.credentials.api_key())
            .header("APCA-API-SECRET-KEY", self.credentials.api_secret())
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| AlpacaError::Transport(e.without_url().to_string()))?;
            let body = text.trim();
            if body.is_empty() || body == "null" {
                return Err(AlpacaError::Decode(format!(
                    "empty response body from {path}"
                )));
            }
            return serde_json::from_str(body).map_err(|e| AlpacaError::Decode(e.to_string()));
        }

        let retry_after_secs = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let error_body = response
            .text()
            .await
            .map_err(|e| AlpacaError::Transport(e.without_url().to_string()))?;

        Err(api_error(status, &error_body, retry_after_secs))
    }
}

/// Build an `Api` error, keeping the provider's message verbatim.
fn api_error(status: StatusCode, body: &str, retry_after_secs: Option<u64>) -> AlpacaError {
    let parsed = serde_json::from_str::<AlpacaErrorResponse>(body).ok();
    let code = parsed.as_ref().and_then(AlpacaErrorResponse::code_string);

    let message = parsed
        .and_then(|err| err.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    AlpacaError::Api {
        status: status.as_u16(),
        code,
        message,
        retry_after_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"code": 40110000, "message": "request is not authorized"}"#,
            None,
        );
        assert_eq!(
            err,
            AlpacaError::Api {
                status: 401,
                code: Some("40110000".to_string()),
                message: "request is not authorized".to_string(),
                retry_after_secs: None,
            }
        );
    }

    #[test]
    fn plain_text_error_body_is_kept() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream timed out\n", None);
        assert_eq!(
            err,
            AlpacaError::Api {
                status: 502,
                code: None,
                message: "upstream timed out".to_string(),
                retry_after_secs: None,
            }
        );
    }

    #[test]
    fn empty_error_body_uses_reason_phrase() {
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, "", Some(3));
        assert_eq!(
            err,
            AlpacaError::Api {
                status: 429,
                code: None,
                message: "Too Many Requests".to_string(),
                retry_after_secs: Some(3),
            }
        );
    }
}
