//! Account Port (Driven Port)
//!
//! Read-only interface to a brokerage account held at an external provider.

use async_trait::async_trait;

use crate::domain::account::{AccountSnapshot, Position};

/// Errors surfaced by the account gateway.
///
/// Every provider failure is classified into one of these variants; none of
/// them ever carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Credentials or settings are missing or malformed. Fatal at startup.
    #[error("Invalid gateway configuration: {reason}")]
    ConfigurationInvalid {
        /// What is wrong, naming the setting but never its value.
        reason: String,
    },

    /// Network or transport failure (DNS, TLS, timeout, connection reset).
    #[error("Provider unavailable: {message}")]
    ProviderUnavailable {
        /// Transport error details.
        message: String,
    },

    /// The provider answered with a structured error response.
    #[error("Provider rejected request ({status}): {message}")]
    ProviderRejected {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Provider-defined error code, if any.
        code: Option<String>,
        /// Provider error message, verbatim.
        message: String,
        /// Suggested delay from a `Retry-After` header, if present.
        retry_after_secs: Option<u64>,
    },

    /// Unexpected provider fault (malformed or missing response data).
    #[error("Provider error: {message}")]
    ProviderError {
        /// Error details.
        message: String,
    },

    /// The caller abandoned the request before it completed.
    #[error("Operation cancelled")]
    OperationCancelled,
}

impl GatewayError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Only transport failures qualify; a rejection means the request itself
    /// (or the credentials) must change first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }

    /// Provider HTTP status, for rejections.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics and log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConfigurationInvalid { .. } => "configuration_invalid",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ProviderRejected { .. } => "provider_rejected",
            Self::ProviderError { .. } => "provider_error",
            Self::OperationCancelled => "cancelled",
        }
    }
}

/// Port for reading account state from a brokerage provider.
///
/// Each method performs at most one provider round trip per attempt and
/// returns values the caller owns outright.
#[async_trait]
pub trait AccountPort: Send + Sync {
    /// Fetch the full account record.
    async fn fetch_account(&self) -> Result<AccountSnapshot, GatewayError>;

    /// Fetch all open positions. An account with no holdings yields an empty vector.
    async fn fetch_positions(&self) -> Result<Vec<Position>, GatewayError>;
}
