//! Domain Layer
//!
//! Immutable value objects describing a brokerage account at a point in time.
//! Nothing in this layer knows about HTTP, the provider's wire format, or
//! configuration.
//!
//! # Bounded Contexts
//!
//! - [`account`]: Account snapshots and held positions
//! - [`shared`]: Value objects used across contexts

pub mod account;
pub mod shared;
