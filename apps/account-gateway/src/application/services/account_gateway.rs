//! Account gateway service.
//!
//! The uniform, read-only entry point over a remote trading account. Callers
//! get domain values or a classified [`GatewayError`]; they never see the
//! provider's SDK or wire types.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use super::snapshot_cache::SnapshotCache;
use crate::application::ports::{AccountPort, GatewayError};
use crate::domain::account::{AccountSnapshot, AccountSummary, Position};
use crate::observability::{record_cache_hit, record_gateway_request};

/// Read-only gateway over a brokerage account.
///
/// Cheap to clone: clones share the provider adapter (and with it the lazy
/// session) and the cache. Use [`AccountGateway::scoped`] to bind a handle to
/// a caller's cancellation token.
#[derive(Debug)]
pub struct AccountGateway<P: AccountPort> {
    port: Arc<P>,
    cache: Arc<SnapshotCache>,
    cancel: CancellationToken,
}

impl<P: AccountPort> Clone for AccountGateway<P> {
    fn clone(&self) -> Self {
        Self {
            port: Arc::clone(&self.port),
            cache: Arc::clone(&self.cache),
            cancel: self.cancel.clone(),
        }
    }
}

impl<P: AccountPort> AccountGateway<P> {
    /// Create a gateway over `port` with caching disabled.
    #[must_use]
    pub fn new(port: Arc<P>) -> Self {
        Self {
            port,
            cache: Arc::new(SnapshotCache::disabled()),
            cancel: CancellationToken::new(),
        }
    }

    /// Enable short-lived caching. A zero TTL keeps caching off.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(SnapshotCache::with_ttl(ttl));
        self
    }

    /// A handle bound to `cancel`, sharing this gateway's adapter and cache.
    ///
    /// Once `cancel` fires, pending and future calls on the handle resolve to
    /// [`GatewayError::OperationCancelled`].
    #[must_use]
    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self {
            port: Arc::clone(&self.port),
            cache: Arc::clone(&self.cache),
            cancel,
        }
    }

    /// The underlying provider adapter.
    #[must_use]
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The snapshot cache.
    #[must_use]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Drop any cached snapshot and positions.
    pub fn invalidate_cache(&self) {
        self.cache.clear();
    }

    /// Fetch the full account record.
    pub async fn get_account(&self) -> Result<AccountSnapshot, GatewayError> {
        self.observe("get_account", self.account_snapshot("get_account"))
            .await
    }

    /// Cash balance, projected from one account read.
    pub async fn get_cash(&self) -> Result<Decimal, GatewayError> {
        self.observe("get_cash", async {
            self.account_snapshot("get_cash").await.map(|a| a.cash)
        })
        .await
    }

    /// Buying power, projected from one account read.
    pub async fn get_buying_power(&self) -> Result<Decimal, GatewayError> {
        self.observe("get_buying_power", async {
            self.account_snapshot("get_buying_power")
                .await
                .map(|a| a.buying_power)
        })
        .await
    }

    /// Fetch current holdings. An empty account yields an empty vector.
    pub async fn get_positions(&self) -> Result<Vec<Position>, GatewayError> {
        self.observe("get_positions", self.positions("get_positions"))
            .await
    }

    /// Account snapshot plus positions.
    ///
    /// This is the one call that makes two provider round trips (account,
    /// then positions); the two reads are not mutually consistent.
    pub async fn get_summary(&self) -> Result<AccountSummary, GatewayError> {
        self.observe("get_summary", async {
            let account = self.account_snapshot("get_summary").await?;
            let positions = self.positions("get_summary").await?;
            Ok(AccountSummary { account, positions })
        })
        .await
    }

    async fn account_snapshot(
        &self,
        operation: &'static str,
    ) -> Result<AccountSnapshot, GatewayError> {
        if let Some(cached) = self.cache.account() {
            record_cache_hit(operation);
            return Ok(cached);
        }

        let snapshot = self.until_cancelled(self.port.fetch_account()).await?;
        self.cache.store_account(&snapshot);
        Ok(snapshot)
    }

    async fn positions(&self, operation: &'static str) -> Result<Vec<Position>, GatewayError> {
        if let Some(cached) = self.cache.positions() {
            record_cache_hit(operation);
            return Ok(cached);
        }

        let positions = self.until_cancelled(self.port.fetch_positions()).await?;
        self.cache.store_positions(&positions);
        Ok(positions)
    }

    /// Race a provider call against the cancellation token. The losing
    /// request future is dropped, which abandons the HTTP request.
    async fn until_cancelled<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(GatewayError::OperationCancelled),
            result = call => result,
        }
    }

    async fn observe<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();
        let result = if self.cancel.is_cancelled() {
            Err(GatewayError::OperationCancelled)
        } else {
            call.await
        };
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => {
                record_gateway_request(operation, "ok", elapsed.as_secs_f64());
                tracing::debug!(
                    operation,
                    elapsed_ms = elapsed.as_millis(),
                    "Account gateway call completed"
                );
            }
            Err(GatewayError::OperationCancelled) => {
                record_gateway_request(operation, "cancelled", elapsed.as_secs_f64());
                tracing::debug!(operation, "Account gateway call cancelled");
            }
            Err(err) => {
                record_gateway_request(operation, err.kind(), elapsed.as_secs_f64());
                tracing::warn!(
                    operation,
                    kind = err.kind(),
                    error = %err,
                    "Account gateway call failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    use crate::domain::account::{AccountStatus, PositionSide};
    use crate::domain::shared::Symbol;

    fn snapshot() -> AccountSnapshot {
        AccountSnapshot {
            account_id: "acc-1".to_string(),
            account_number: "PA1".to_string(),
            status: AccountStatus::Active,
            currency: "USD".to_string(),
            cash: dec!(12345.67),
            buying_power: dec!(49382.68),
            equity: dec!(20000),
            last_equity: dec!(19500),
            portfolio_value: Some(dec!(20000)),
            long_market_value: dec!(7654.33),
            short_market_value: dec!(0),
            daytrading_buying_power: None,
            daytrade_count: 0,
            pattern_day_trader: false,
            trading_blocked: false,
            account_blocked: false,
            as_of: Utc::now(),
        }
    }

    fn position(symbol: &str) -> Position {
        Position {
            symbol: Symbol::new(symbol),
            asset_class: "us_equity".to_string(),
            side: PositionSide::Long,
            quantity: dec!(3),
            avg_entry_price: dec!(100),
            current_price: Some(dec!(110)),
            market_value: dec!(330),
            cost_basis: dec!(300),
            unrealized_pnl: dec!(30),
            unrealized_pnl_pct: Some(dec!(0.1)),
        }
    }

    #[derive(Default)]
    struct StubPort {
        scripted_accounts: Mutex<VecDeque<Result<AccountSnapshot, GatewayError>>>,
        positions: Vec<Position>,
        hang: bool,
        account_calls: AtomicUsize,
        position_calls: AtomicUsize,
    }

    impl StubPort {
        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::default()
            }
        }

        fn with_accounts(results: Vec<Result<AccountSnapshot, GatewayError>>) -> Self {
            Self {
                scripted_accounts: Mutex::new(results.into()),
                ..Self::default()
            }
        }

        fn account_calls(&self) -> usize {
            self.account_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccountPort for StubPort {
        async fn fetch_account(&self) -> Result<AccountSnapshot, GatewayError> {
            self.account_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.scripted_accounts
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(snapshot()))
        }

        async fn fetch_positions(&self) -> Result<Vec<Position>, GatewayError> {
            self.position_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(self.positions.clone())
        }
    }

    fn rejected(status: u16) -> GatewayError {
        GatewayError::ProviderRejected {
            status,
            code: None,
            message: "request is not authorized".to_string(),
            retry_after_secs: None,
        }
    }

    #[tokio::test]
    async fn cash_matches_account_cash() {
        let port = Arc::new(StubPort::default());
        let gateway = AccountGateway::new(Arc::clone(&port));

        let account = gateway.get_account().await.unwrap();
        let cash = gateway.get_cash().await.unwrap();
        let buying_power = gateway.get_buying_power().await.unwrap();

        assert_eq!(account.cash, cash);
        assert_eq!(account.buying_power, buying_power);
        assert_eq!(port.account_calls(), 3);
    }

    #[tokio::test]
    async fn empty_positions_are_not_an_error() {
        let gateway = AccountGateway::new(Arc::new(StubPort::default()));
        let positions = gateway.get_positions().await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn provider_errors_pass_through_unchanged() {
        let port = Arc::new(StubPort::with_accounts(vec![Err(rejected(401))]));
        let gateway = AccountGateway::new(port);

        let err = gateway.get_cash().await.unwrap_err();
        assert_eq!(err, rejected(401));
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_without_provider_call() {
        let port = Arc::new(StubPort::default());
        let token = CancellationToken::new();
        token.cancel();
        let gateway = AccountGateway::new(Arc::clone(&port)).scoped(token);

        assert_eq!(
            gateway.get_buying_power().await.unwrap_err(),
            GatewayError::OperationCancelled
        );
        assert_eq!(
            gateway.get_positions().await.unwrap_err(),
            GatewayError::OperationCancelled
        );
        assert_eq!(port.account_calls(), 0);
        assert_eq!(port.position_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn in_flight_call_resolves_cancelled() {
        let token = CancellationToken::new();
        let gateway = AccountGateway::new(Arc::new(StubPort::hanging())).scoped(token.clone());

        let pending = tokio::spawn(async move { gateway.get_account().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("cancelled call must resolve promptly")
            .unwrap();
        assert_eq!(result.unwrap_err(), GatewayError::OperationCancelled);
    }

    #[tokio::test]
    async fn cancelling_one_scope_leaves_others_running() {
        let base = AccountGateway::new(Arc::new(StubPort::default()));
        let token = CancellationToken::new();
        let cancelled = base.scoped(token.clone());
        token.cancel();

        assert!(cancelled.get_account().await.is_err());
        assert!(base.get_account().await.is_ok());
    }

    #[tokio::test]
    async fn cache_serves_repeat_reads() {
        let port = Arc::new(StubPort::default());
        let gateway =
            AccountGateway::new(Arc::clone(&port)).with_cache_ttl(Duration::from_secs(30));

        let first = gateway.get_cash().await.unwrap();
        let second = gateway.get_buying_power().await.unwrap();
        let account = gateway.get_account().await.unwrap();

        assert_eq!(first, account.cash);
        assert_eq!(second, account.buying_power);
        assert_eq!(port.account_calls(), 1);

        gateway.invalidate_cache();
        gateway.get_account().await.unwrap();
        assert_eq!(port.account_calls(), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let port = Arc::new(StubPort::with_accounts(vec![Err(
            GatewayError::ProviderUnavailable {
                message: "connection reset".to_string(),
            },
        )]));
        let gateway =
            AccountGateway::new(Arc::clone(&port)).with_cache_ttl(Duration::from_secs(30));

        assert!(gateway.get_account().await.is_err());
        assert!(gateway.get_account().await.is_ok());
        assert_eq!(port.account_calls(), 2);
    }

    #[tokio::test]
    async fn scoped_handles_share_cache() {
        let port = Arc::new(StubPort::default());
        let gateway =
            AccountGateway::new(Arc::clone(&port)).with_cache_ttl(Duration::from_secs(30));
        let scoped = gateway.scoped(CancellationToken::new());

        gateway.get_account().await.unwrap();
        scoped.get_account().await.unwrap();
        assert_eq!(port.account_calls(), 1);
    }

    #[tokio::test]
    async fn summary_reads_account_then_positions() {
        let port = Arc::new(StubPort {
            positions: vec![position("AAPL"), position("MSFT")],
            ..StubPort::default()
        });
        let gateway = AccountGateway::new(Arc::clone(&port));

        let summary = gateway.get_summary().await.unwrap();
        assert_eq!(summary.positions.len(), 2);
        assert_eq!(summary.positions_market_value(), dec!(660));
        assert_eq!(port.account_calls(), 1);
        assert_eq!(port.position_calls.load(Ordering::SeqCst), 1);
    }
}
