//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::GatewayError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// Settings that only fail once a session is built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request never produced an HTTP response, or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// API returned a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the API, if present.
        code: Option<String>,
        /// Error message from the API.
        message: String,
        /// `Retry-After` header in seconds, if present.
        retry_after_secs: Option<u64>,
    },

    /// Response body was not valid JSON of the expected shape.
    #[error("Response decode error: {0}")]
    Decode(String),

    /// A field was present but could not be interpreted.
    #[error("Invalid value for field '{field}': {value:?}")]
    InvalidField {
        /// Wire field name.
        field: &'static str,
        /// Raw value received.
        value: String,
    },
}

impl AlpacaError {
    /// Whether this failure happened below the HTTP layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for AlpacaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Configuration(err.without_url().to_string());
        }
        if err.is_decode() {
            return Self::Decode(err.without_url().to_string());
        }
        // URLs never carry credentials, but strip them anyway to keep messages short.
        Self::Transport(err.without_url().to_string())
    }
}

impl From<AlpacaError> for GatewayError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Configuration(reason) => Self::ConfigurationInvalid { reason },
            AlpacaError::Transport(message) => Self::ProviderUnavailable { message },
            AlpacaError::Api {
                status,
                code,
                message,
                retry_after_secs,
            } => Self::ProviderRejected {
                status,
                code,
                message,
                retry_after_secs,
            },
            AlpacaError::Decode(_) | AlpacaError::InvalidField { .. } => Self::ProviderError {
                message: err.to_string(),
            },
        }
    }
}
