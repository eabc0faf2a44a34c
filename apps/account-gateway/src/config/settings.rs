//! Gateway settings and their translation into adapter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::application::ports::GatewayError;
use crate::infrastructure::broker::alpaca::{
    AlpacaConfig, AlpacaEnvironment, Credentials, RetryConfig,
};

/// Root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Provider credentials and endpoint.
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpSettings,
    /// Retry policy for transport failures.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Snapshot cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Alpaca credentials and endpoint selection.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AlpacaSettings {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default)]
    pub api_secret: String,
    /// `paper`, `live`, or a base URL.
    #[serde(default)]
    pub endpoint: String,
    /// Optional explicit environment (`PAPER` / `LIVE`).
    #[serde(default)]
    pub environment: Option<String>,
}

impl std::fmt::Debug for AlpacaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaSettings")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("environment", &self.environment)
            .finish()
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry settings. Only transport failures are retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per call (1 = no retry).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Cache TTL in milliseconds (0 = disabled).
    #[serde(default)]
    pub ttl_ms: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    1
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_multiplier() -> f64 {
    2.0
}

impl GatewaySettings {
    /// Check that all required values are present and sane.
    ///
    /// Messages name the missing setting, never a credential value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.alpaca.api_key.trim().is_empty() {
            missing.push("alpaca.api_key (ALPACA_KEY)");
        }
        if self.alpaca.api_secret.trim().is_empty() {
            missing.push("alpaca.api_secret (ALPACA_SECRET)");
        }
        if self.alpaca.endpoint.trim().is_empty() {
            missing.push("alpaca.endpoint (ALPACA_ENDPOINT)");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings(missing.join(", ")));
        }

        self.environment()?;

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http.timeout_secs must be positive".to_string(),
            ));
        }

        self.retry_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Explicitly selected environment, if any.
    pub fn environment(&self) -> Result<Option<AlpacaEnvironment>, ConfigError> {
        match self.alpaca.environment.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => AlpacaEnvironment::from_keyword(value).map(Some).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "alpaca.environment must be PAPER or LIVE, got '{value}'"
                ))
            }),
        }
    }

    /// Credentials built from these settings.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.alpaca.api_key.as_str(),
            self.alpaca.api_secret.as_str(),
            self.alpaca.endpoint.as_str(),
        )
    }

    /// Retry policy built from these settings.
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            multiplier: self.retry.multiplier,
        }
    }

    /// Cache TTL (zero when caching is disabled).
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache.ttl_ms)
    }

    /// Full adapter configuration.
    pub fn alpaca_config(&self) -> Result<AlpacaConfig, GatewayError> {
        self.validate()?;
        let config = AlpacaConfig::new(self.credentials(), self.environment()?)?
            .with_timeout(Duration::from_secs(self.http.timeout_secs))
            .with_retry(self.retry_config());
        config.validate()?;
        Ok(config)
    }
}
