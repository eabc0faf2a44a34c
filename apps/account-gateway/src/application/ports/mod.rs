//! Application Ports (Driven)
//!
//! Interfaces the gateway uses to reach external systems.

mod account_port;

pub use account_port::{AccountPort, GatewayError};
