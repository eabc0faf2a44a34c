//! Alpaca API credentials.

use std::fmt;

use crate::application::ports::GatewayError;

/// API key, secret and endpoint for one provider account.
///
/// Immutable once built. `Debug` output redacts the key and secret, and no
/// error produced here ever contains them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    endpoint: String,
}

impl Credentials {
    /// Create new credentials. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            api_secret: api_secret.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Get the endpoint selector: `paper`, `live`, or a base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check that every field is present and usable as an HTTP header value.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut missing = Vec::new();
        if self.api_key.is_empty() {
            missing.push("API key");
        }
        if self.api_secret.is_empty() {
            missing.push("API secret");
        }
        if self.endpoint.is_empty() {
            missing.push("endpoint");
        }
        if !missing.is_empty() {
            return Err(GatewayError::configuration(format!(
                "missing required credential field(s): {}",
                missing.join(", ")
            )));
        }

        if !is_header_safe(&self.api_key) {
            return Err(GatewayError::configuration(
                "API key contains characters that cannot be sent in a request header",
            ));
        }
        if !is_header_safe(&self.api_secret) {
            return Err(GatewayError::configuration(
                "API secret contains characters that cannot be sent in a request header",
            ));
        }

        Ok(())
    }
}

fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_graphic())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
