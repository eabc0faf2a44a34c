//! Gateway configuration.
//!
//! Settings come from a YAML file (with `${VAR}` / `${VAR:-default}`
//! interpolation) or, when no file is present, directly from environment
//! variables. File resolution order:
//!
//! 1. An explicit path (`--config`)
//! 2. `ACCOUNT_GATEWAY_CONFIG`
//! 3. `account-gateway.yaml` in the working directory, if it exists
//! 4. Environment variables only

mod settings;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use settings::{AlpacaSettings, CacheSettings, GatewaySettings, HttpSettings, RetrySettings};

use crate::application::ports::GatewayError;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "account-gateway.yaml";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_VAR: &str = "ACCOUNT_GATEWAY_CONFIG";

/// Environment variables read when no config file is used.
pub mod env_vars {
    /// API key.
    pub const KEY: &str = "ALPACA_KEY";
    /// API secret.
    pub const SECRET: &str = "ALPACA_SECRET";
    /// `paper`, `live`, or a base URL.
    pub const ENDPOINT: &str = "ALPACA_ENDPOINT";
    /// Explicit environment (`PAPER` / `LIVE`).
    pub const ENVIRONMENT: &str = "ALPACA_ENVIRONMENT";
    /// Request timeout in seconds.
    pub const TIMEOUT_SECS: &str = "GATEWAY_TIMEOUT_SECS";
    /// Total attempts per call.
    pub const RETRY_MAX_ATTEMPTS: &str = "GATEWAY_RETRY_MAX_ATTEMPTS";
    /// Cache TTL in milliseconds.
    pub const CACHE_TTL_MS: &str = "GATEWAY_CACHE_TTL_MS";
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the YAML document.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Required settings are absent.
    #[error("Missing required settings: {0}")]
    MissingSettings(String),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Settings are present but inconsistent.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// Look up a variable in the process environment.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve and load settings from the process environment.
///
/// # Errors
///
/// Returns a `ConfigError` if the selected source cannot be read, parsed,
/// or validated.
pub fn load_settings(explicit: Option<&Path>) -> Result<GatewaySettings, ConfigError> {
    load_settings_with(explicit, process_env)
}

/// Resolve and load settings using `lookup` for every variable.
///
/// # Errors
///
/// Returns a `ConfigError` if the selected source cannot be read, parsed,
/// or validated.
pub fn load_settings_with<F>(explicit: Option<&Path>, lookup: F) -> Result<GatewaySettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match resolve_config_path(explicit, &lookup) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration file");
            load_config_with(&path, lookup)
        }
        None => {
            tracing::info!("No configuration file, reading environment");
            settings_from_env(lookup)
        }
    }
}

fn resolve_config_path<F>(explicit: Option<&Path>, lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.is_file().then_some(default)
}

/// Load settings from a YAML file, interpolating from the process environment.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: &Path) -> Result<GatewaySettings, ConfigError> {
    load_config_with(path, process_env)
}

/// Load settings from a YAML file, interpolating with `lookup`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<GatewaySettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_string(&contents, lookup)
}

/// Load settings from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string<F>(yaml: &str, lookup: F) -> Result<GatewaySettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let interpolated = interpolate_env_vars(yaml, &lookup);
    let settings: GatewaySettings = serde_yaml_bw::from_str(&interpolated)?;
    settings.validate()?;
    Ok(settings)
}

/// Build settings from environment variables alone.
///
/// # Errors
///
/// Returns a `ConfigError` naming any missing or malformed variable.
pub fn settings_from_env<F>(lookup: F) -> Result<GatewaySettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut settings = GatewaySettings {
        alpaca: AlpacaSettings {
            api_key: var(env_vars::KEY).unwrap_or_default(),
            api_secret: var(env_vars::SECRET).unwrap_or_default(),
            endpoint: var(env_vars::ENDPOINT).unwrap_or_default(),
            environment: var(env_vars::ENVIRONMENT),
        },
        ..GatewaySettings::default()
    };

    if let Some(value) = var(env_vars::TIMEOUT_SECS) {
        settings.http.timeout_secs = parse_number(env_vars::TIMEOUT_SECS, &value)?;
    }
    if let Some(value) = var(env_vars::RETRY_MAX_ATTEMPTS) {
        settings.retry.max_attempts = parse_number(env_vars::RETRY_MAX_ATTEMPTS, &value)?;
    }
    if let Some(value) = var(env_vars::CACHE_TTL_MS) {
        settings.cache.ttl_ms = parse_number(env_vars::CACHE_TTL_MS, &value)?;
    }

    settings.validate()?;
    Ok(settings)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        reason: "expected a non-negative integer".to_string(),
    })
}

/// Replace `${VAR}` and `${VAR:-default}` with values from `lookup`.
///
/// Unset or empty variables fall back to the default, or to an empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        cap.get(1)
            .and_then(|name| lookup(name.as_str()))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_value.to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const YAML: &str = r"
alpaca:
  api_key: ${TEST_KEY}
  api_secret: ${TEST_SECRET}
  endpoint: ${TEST_ENDPOINT:-paper}
http:
  timeout_secs: 10
retry:
  max_attempts: 3
cache:
  ttl_ms: 500
";

    #[test]
    fn interpolates_with_defaults() {
        let lookup = env(&[("A", "1"), ("EMPTY", "")]);
        assert_eq!(interpolate_env_vars("${A}-${B:-two}", &lookup), "1-two");
        assert_eq!(interpolate_env_vars("${EMPTY:-x}", &lookup), "x");
        assert_eq!(interpolate_env_vars("${MISSING}", &lookup), "");
        assert_eq!(interpolate_env_vars("plain $HOME", &lookup), "plain $HOME");
    }

    #[test]
    fn loads_yaml_string() {
        let settings =
            load_config_from_string(YAML, env(&[("TEST_KEY", "k"), ("TEST_SECRET", "s")])).unwrap();

        assert_eq!(settings.alpaca.api_key, "k");
        assert_eq!(settings.alpaca.endpoint, "paper");
        assert_eq!(settings.http.timeout_secs, 10);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.initial_backoff_ms, 100);
        assert_eq!(settings.cache_ttl(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn yaml_missing_credentials_fails() {
        let err = load_config_from_string(YAML, env(&[("TEST_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSettings(ref m) if m.contains("ALPACA_SECRET")));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = load_config_from_string("alpaca: [unclosed", env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let settings =
            load_config_with(file.path(), env(&[("TEST_KEY", "k"), ("TEST_SECRET", "s")])).unwrap();
        assert_eq!(settings.alpaca.api_secret, "s");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_config_with(Path::new("/nonexistent/gateway.yaml"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn env_only_settings() {
        let settings = settings_from_env(env(&[
            (env_vars::KEY, " k "),
            (env_vars::SECRET, "s"),
            (env_vars::ENDPOINT, "https://api.alpaca.markets"),
            (env_vars::CACHE_TTL_MS, "250"),
            (env_vars::RETRY_MAX_ATTEMPTS, "2"),
        ]))
        .unwrap();

        assert_eq!(settings.alpaca.api_key, "k");
        assert_eq!(settings.cache.ttl_ms, 250);
        assert_eq!(settings.retry.max_attempts, 2);
        assert_eq!(settings.http.timeout_secs, 30);
    }

    #[test]
    fn env_missing_everything_names_every_variable() {
        let message = settings_from_env(env(&[])).unwrap_err().to_string();
        for name in [env_vars::KEY, env_vars::SECRET, env_vars::ENDPOINT] {
            assert!(message.contains(name), "{message}");
        }
    }

    #[test]
    fn env_bad_number_is_named_without_value() {
        let err = settings_from_env(env(&[
            (env_vars::KEY, "k"),
            (env_vars::SECRET, "s"),
            (env_vars::ENDPOINT, "paper"),
            (env_vars::TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains(env_vars::TIMEOUT_SECS));
        assert!(!message.contains("soon"));
    }

    #[test]
    fn explicit_path_wins_over_env_var() {
        let explicit = Path::new("/tmp/explicit.yaml");
        let lookup = env(&[(CONFIG_PATH_VAR, "/tmp/from-env.yaml")]);
        assert_eq!(
            resolve_config_path(Some(explicit), &lookup),
            Some(explicit.to_path_buf())
        );
        assert_eq!(
            resolve_config_path(None, &lookup),
            Some(PathBuf::from("/tmp/from-env.yaml"))
        );
    }

    #[test]
    fn config_error_maps_to_configuration_invalid() {
        let err: GatewayError = ConfigError::MissingSettings("alpaca.api_key".to_string()).into();
        assert!(matches!(err, GatewayError::ConfigurationInvalid { .. }));
    }
}
