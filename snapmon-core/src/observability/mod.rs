//! Observability infrastructure: tracing and self metrics.
//!
//! Logs go to stderr so that line protocol output on stdout stays clean.

use crate::error::{Result, SnapmonError};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Initialize the global observability infrastructure.
///
/// `RUST_LOG` takes precedence over `log_level`. When `metrics_addr` is set a
/// Prometheus endpoint is served there and the poller's own metrics are
/// registered on it.
///
/// Must be called once, from within the tokio runtime.
pub fn init(log_level: &str, metrics_addr: Option<SocketAddr>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| SnapmonError::InvalidConfig {
            reason: format!("Failed to initialize tracing: {}", e),
        })?;

    match metrics_addr {
        Some(addr) => {
            PrometheusBuilder::new().with_http_listener(addr).install().map_err(|e| {
                SnapmonError::InvalidConfig {
                    reason: format!("Failed to start metrics endpoint on {}: {}", addr, e),
                }
            })?;
            metrics::register_core_metrics();
            tracing::info!("Observability initialized (metrics endpoint: http://{}/metrics)", addr);
        }
        None => {
            tracing::info!("Observability initialized (metrics endpoint disabled)");
        }
    }

    Ok(())
}
