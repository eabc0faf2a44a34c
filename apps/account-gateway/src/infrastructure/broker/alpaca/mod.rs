//! Alpaca Markets Account Adapter
//!
//! Read-only implementation of `AccountPort` for the Alpaca trading API with:
//! - Credential validation before any I/O
//! - Paper/live environment resolution from the configured endpoint
//! - A lazily created, shared HTTP session that is rebuilt after transport failures
//! - Opt-in retry with capped exponential backoff for transport failures only

mod adapter;
mod api_types;
mod config;
mod credentials;
mod error;
mod http_client;
mod retry;
mod session;

pub use adapter::{AlpacaAccountAdapter, AlpacaGateway};
pub use config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
pub use credentials::Credentials;
pub use error::AlpacaError;
pub use session::LazySession;
