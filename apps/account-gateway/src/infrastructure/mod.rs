//! Infrastructure Layer
//!
//! Adapters that implement application ports against real providers.

pub mod broker;
