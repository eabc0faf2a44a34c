//! Prometheus metrics for the account gateway.
//!
//! # Example
//!
//! ```ignore
//! use account_gateway::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_gateway_request("get_account", "ok", 0.120);
//! ```
//!
//! When no recorder is installed every `record_*` call is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Provider round trips: 5ms to 30s
            latency_buckets: vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Gateway Metrics
// ============================================================================

/// Record a completed gateway call.
///
/// # Arguments
///
/// * `operation` - Gateway operation (e.g., "get_account", "get_positions")
/// * `outcome` - "ok" or an error kind (e.g., "provider_unavailable")
/// * `latency_seconds` - Wall time of the call in seconds
pub fn record_gateway_request(operation: &str, outcome: &str, latency_seconds: f64) {
    counter!(
        "gateway_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(latency_seconds);
}

/// Record a call answered from the snapshot cache.
pub fn record_cache_hit(operation: &str) {
    counter!("gateway_cache_hits_total", "operation" => operation.to_string()).increment(1);
}

/// Record creation of a new provider session.
pub fn record_session_created() {
    counter!("gateway_sessions_created_total").increment(1);
}

/// Record a retried provider request.
pub fn record_provider_retry(path: &str) {
    counter!("gateway_provider_retries_total", "path" => path.to_string()).increment(1);
}
