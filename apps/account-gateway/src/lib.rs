// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::items_after_statements,
        clippy::default_trait_access
    )
)]

//! Account Gateway - Read-only Brokerage Account Access
//!
//! Fetches account snapshots, cash, buying power, and open positions from a
//! brokerage provider and reports every failure as a typed error.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Account snapshot, position, and summary value types
//! - **Application**: The `AccountPort` seam, `GatewayError`, and the
//!   `AccountGateway` service (cancellation, optional snapshot cache, metrics)
//! - **Infrastructure**: Alpaca REST adapter with a lazily created session
//! - **Config**: YAML / environment settings
//! - **Observability**: Prometheus metrics
//!
//! # Example
//!
//! ```no_run
//! use account_gateway::{AlpacaGateway, Credentials};
//!
//! # async fn run() -> Result<(), account_gateway::GatewayError> {
//! let gateway = AlpacaGateway::connect(
//!     Credentials::new("key", "secret", "paper"),
//!     None,
//! )?;
//! let cash = gateway.get_cash().await?;
//! println!("cash: {cash}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Account value types with no external dependencies.
pub mod domain;

/// Application layer - Port definitions and the gateway service.
pub mod application;

/// Infrastructure layer - Provider adapters.
pub mod infrastructure;

/// Configuration loading.
pub mod config;

/// Metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::ports::{AccountPort, GatewayError};
pub use application::services::{AccountGateway, SnapshotCache};
pub use domain::account::{AccountSnapshot, AccountStatus, AccountSummary, Position, PositionSide};
pub use domain::shared::Symbol;
pub use infrastructure::broker::alpaca::{
    AlpacaAccountAdapter, AlpacaConfig, AlpacaEnvironment, AlpacaError, AlpacaGateway, Credentials,
    RetryConfig,
};

/// Cancellation token accepted by [`AccountGateway::scoped`].
pub use tokio_util::sync::CancellationToken;
