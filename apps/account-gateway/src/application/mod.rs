//! Application Layer
//!
//! - **Ports**: The outbound interface to a brokerage provider and the
//!   error taxonomy every caller sees
//! - **Services**: The account gateway callers use, plus its cache

pub mod ports;
pub mod services;

pub use ports::*;
pub use services::*;
