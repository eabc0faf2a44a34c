//! Broker Adapters
//!
//! Implementations of `AccountPort` for brokerage providers.

pub mod alpaca;

pub use alpaca::{
    AlpacaAccountAdapter, AlpacaConfig, AlpacaEnvironment, AlpacaError, AlpacaGateway, Credentials,
};
