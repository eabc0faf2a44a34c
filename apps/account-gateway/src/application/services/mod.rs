//! Application Services
//!
//! - [`AccountGateway`]: the typed, read-only view callers use
//! - [`SnapshotCache`]: optional short-lived cache behind the gateway

mod account_gateway;
mod snapshot_cache;

pub use account_gateway::AccountGateway;
pub use snapshot_cache::SnapshotCache;
