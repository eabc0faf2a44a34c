//! Alpaca account adapter implementing AccountPort.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;

use super::api_types::{AlpacaAccountResponse, AlpacaPositionResponse};
use super::config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
use super::credentials::Credentials;
use super::error::AlpacaError;
use super::retry::ExponentialBackoff;
use super::session::LazySession;
use crate::application::ports::{AccountPort, GatewayError};
use crate::application::services::AccountGateway;
use crate::domain::account::{AccountSnapshot, Position};
use crate::observability::record_provider_retry;

const ACCOUNT_PATH: &str = "/v2/account";
const POSITIONS_PATH: &str = "/v2/positions";

/// Account gateway backed by the Alpaca adapter.
pub type AlpacaGateway = AccountGateway<AlpacaAccountAdapter>;

/// Alpaca Markets account adapter.
///
/// Implements `AccountPort` for the Alpaca trading API. Construction only
/// validates settings; the HTTP session is created on the first request.
#[derive(Debug)]
pub struct AlpacaAccountAdapter {
    session: LazySession,
    retry: RetryConfig,
    environment: AlpacaEnvironment,
}

impl AlpacaAccountAdapter {
    /// Create a new Alpaca account adapter.
    pub fn new(config: AlpacaConfig) -> Result<Self, GatewayError> {
        config.credentials.validate()?;
        config.validate()?;

        if config.environment.is_live() {
            tracing::warn!(
                base_url = %config.base_url,
                "Account gateway configured for LIVE trading account"
            );
        }

        Ok(Self {
            retry: config.retry.clone(),
            environment: config.environment,
            session: LazySession::new(config),
        })
    }

    /// Check if we're reading a live trading account.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    /// The lazily created provider session.
    #[must_use]
    pub const fn session(&self) -> &LazySession {
        &self.session
    }

    /// GET `path`, retrying transport failures on a fresh session when the
    /// retry policy allows it.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            let client = self.session.acquire()?;
            let err = match client.get(path).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transport() {
                return Err(err);
            }
            self.session.invalidate(&client);

            let Some(delay) = backoff.next_backoff() else {
                return Err(err);
            };
            tracing::warn!(
                error = %err,
                path,
                delay_ms = delay.as_millis(),
                attempt = backoff.attempt,
                "Transport error, retrying on a new session"
            );
            record_provider_retry(path);
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AccountPort for AlpacaAccountAdapter {
    async fn fetch_account(&self) -> Result<AccountSnapshot, GatewayError> {
        let response: AlpacaAccountResponse = self.fetch(ACCOUNT_PATH).await?;
        let snapshot = response.into_snapshot(Utc::now())?;

        tracing::debug!(
            account_id = %snapshot.account_id,
            status = %snapshot.status,
            "Fetched account snapshot"
        );

        Ok(snapshot)
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, GatewayError> {
        let responses: Vec<AlpacaPositionResponse> = self.fetch(POSITIONS_PATH).await?;
        let positions = responses
            .into_iter()
            .map(AlpacaPositionResponse::into_position)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = positions.len(), "Fetched positions");

        Ok(positions)
    }
}

impl AccountGateway<AlpacaAccountAdapter> {
    /// Build a gateway backed by the Alpaca adapter. Performs no I/O.
    pub fn alpaca(config: AlpacaConfig) -> Result<Self, GatewayError> {
        let adapter = AlpacaAccountAdapter::new(config)?;
        tracing::info!(
            environment = %adapter.environment,
            "Account gateway initialized"
        );
        Ok(Self::new(Arc::new(adapter)))
    }

    /// Build a gateway from credentials and an optional environment selection,
    /// using default timeout and retry settings.
    pub fn connect(
        credentials: Credentials,
        environment: Option<AlpacaEnvironment>,
    ) -> Result<Self, GatewayError> {
        Self::alpaca(AlpacaConfig::new(credentials, environment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_does_not_open_a_session() {
        let config = AlpacaConfig::new(Credentials::new("key", "secret", "paper"), None).unwrap();
        let adapter = AlpacaAccountAdapter::new(config).unwrap();
        assert!(!adapter.session().is_active());
        assert_eq!(adapter.session().sessions_created(), 0);
        assert!(!adapter.is_live());
    }

    #[test]
    fn invalid_retry_policy_fails_construction() {
        let config = AlpacaConfig::new(Credentials::new("key", "secret", "paper"), None)
            .unwrap()
            .with_retry(RetryConfig::none().with_max_attempts(0));
        let err = AlpacaAccountAdapter::new(config).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigurationInvalid { .. }));
    }

    #[test]
    fn connect_rejects_empty_secret() {
        let err = AlpacaGateway::connect(Credentials::new("key", "", "paper"), None).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigurationInvalid { .. }));
    }
}
