//! Observability module for metrics.
//!
//! Structured logging goes through `tracing` directly; this module holds the
//! Prometheus metrics recorded by the gateway.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_cache_hit, record_gateway_request,
    record_provider_retry, record_session_created,
};
