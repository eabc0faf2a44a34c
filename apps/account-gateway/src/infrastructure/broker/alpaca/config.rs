//! Alpaca adapter configuration.

use std::time::Duration;

use reqwest::Url;

use super::credentials::Credentials;
use crate::application::ports::GatewayError;

/// Environment for Alpaca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    #[default]
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Get the base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Parse an environment keyword (`paper` / `live`, case-insensitive).
    #[must_use]
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PAPER" => Some(Self::Paper),
            "LIVE" => Some(Self::Live),
            _ => None,
        }
    }

    /// Environment implied by a well-known provider host, if any.
    fn from_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        if host == "alpaca.markets" || host.ends_with(".alpaca.markets") {
            if host.contains("paper") || host.contains("sandbox") {
                Some(Self::Paper)
            } else {
                Some(Self::Live)
            }
        } else {
            None
        }
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Configuration for the Alpaca account adapter.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// Resolved trading API base URL, without a trailing slash.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
}

impl AlpacaConfig {
    /// Create a new configuration.
    ///
    /// Validates the credentials and resolves the endpoint to a base URL.
    /// When `environment` is `None` it is inferred from the endpoint. No
    /// network I/O happens here.
    pub fn new(
        credentials: Credentials,
        environment: Option<AlpacaEnvironment>,
    ) -> Result<Self, GatewayError> {
        credentials.validate()?;
        let (environment, base_url) = resolve_endpoint(credentials.endpoint(), environment)?;

        Ok(Self {
            credentials,
            environment,
            base_url,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        })
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the trading API base URL.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate timeout and retry settings.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.timeout.is_zero() {
            return Err(GatewayError::configuration("HTTP timeout must be positive"));
        }
        self.retry.validate()
    }
}

/// Resolve an endpoint selector into an environment and base URL.
fn resolve_endpoint(
    endpoint: &str,
    selected: Option<AlpacaEnvironment>,
) -> Result<(AlpacaEnvironment, String), GatewayError> {
    if let Some(keyword) = AlpacaEnvironment::from_keyword(endpoint) {
        return match selected {
            Some(env) if env != keyword => Err(mismatch(env, keyword)),
            _ => Ok((keyword, keyword.trading_base_url().to_string())),
        };
    }

    let invalid = || {
        GatewayError::configuration(
            "endpoint must be 'paper', 'live', or an absolute http(s) URL",
        )
    };
    let url = Url::parse(endpoint).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?;

    let environment = match (selected, AlpacaEnvironment::from_host(host)) {
        (Some(env), Some(implied)) if env != implied => return Err(mismatch(env, implied)),
        (Some(env), _) => env,
        (None, Some(implied)) => implied,
        (None, None) => AlpacaEnvironment::Paper,
    };

    Ok((environment, endpoint.trim_end_matches('/').to_string()))
}

fn mismatch(selected: AlpacaEnvironment, endpoint: AlpacaEnvironment) -> GatewayError {
    GatewayError::configuration(format!(
        "environment mismatch: {selected} selected but endpoint targets {endpoint}"
    ))
}

/// Retry configuration.
///
/// Only transport failures are ever retried. The default performs a single
/// attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl RetryConfig {
    /// No retries: one attempt per call.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }

    /// Retry transport failures up to `max_attempts` total attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Validate the policy.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.max_attempts == 0 {
            return Err(GatewayError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.multiplier < 1.0 || !self.multiplier.is_finite() {
            return Err(GatewayError::configuration(
                "retry.multiplier must be a finite number >= 1.0",
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(GatewayError::configuration(
                "retry.initial_backoff must not exceed retry.max_backoff",
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}
