//! Prometheus metrics.
//!
//! Recording functions are always callable and compile to no-ops without
//! the `prometheus` feature.

#[cfg(feature = "prometheus")]
use metrics::{counter, histogram};
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
#[cfg(feature = "prometheus")]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Ok(());
    }

    let addr: std::net::SocketAddr = config
        .listen
        .parse()
        .map_err(|e| MetricsError::Setup(format!("Invalid listen address: {}", e)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(MetricsError::Install)?;

    tracing::info!(listen = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Initialize the metrics system (no-op without prometheus feature).
#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.enabled {
        tracing::warn!(
            "Metrics are enabled in config but the 'prometheus' feature is not compiled. \
            Rebuild with: cargo build --features prometheus"
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Metric Recording Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Record records removed by a retention sweep.
///
/// # Arguments
/// * `table` - The table purged (e.g., "audit_events")
/// * `count` - The number of records deleted
pub fn record_retention_deletion(table: &str, count: u64) {
    #[cfg(feature = "prometheus")]
    {
        counter!(
            "retention_deletions_total",
            "table" => table.to_string()
        )
        .increment(count);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (table, count);
    }
}

/// Record the outcome of a retention sweep
/// ("success", "dry_run", "skipped", or an error kind).
pub fn record_retention_run(status: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!("retention_runs_total", "status" => status.to_string()).increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = status;
    }
}

/// Record a request to the user search index.
pub fn record_search_request(operation: &str, success: bool, duration_secs: f64) {
    #[cfg(feature = "prometheus")]
    {
        let status = if success { "success" } else { "error" };
        counter!(
            "search_requests_total",
            "operation" => operation.to_string(),
            "status" => status
        )
        .increment(1);
        histogram!(
            "search_request_duration_seconds",
            "operation" => operation.to_string()
        )
        .record(duration_secs);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (operation, success, duration_secs);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to set up metrics: {0}")]
    Setup(String),

    #[cfg(feature = "prometheus")]
    #[error("Failed to install metrics recorder: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these must be silent no-ops.
    #[test]
    fn test_recording_without_recorder() {
        record_retention_deletion("audit_events", 3);
        record_retention_run("success");
        record_search_request("search", true, 0.01);
    }

    #[test]
    fn test_disabled_metrics_skip_install() {
        let config = MetricsConfig::default();
        assert!(init_metrics(&config).is_ok());
    }
}
