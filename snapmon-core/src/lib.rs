//! snapmon Core Library
//!
//! Polls a SnapRoute switch's REST API for per-port interface counters and
//! system readiness, and turns them into rate, delta and status samples.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observability;
pub mod sink;

// Re-export commonly used items
pub use api::{DeviceApi, HttpDeviceApi};
pub use config::{Config, OutputFormat};
pub use error::{Result, SnapmonError};
pub use metrics::PortMetricsCollector;
pub use observability::init as init_observability;
pub use sink::{
    FieldValue, LineProtocolSink, MemorySink, MetricKind, MetricSample, MetricSink, PrometheusSink,
};

/// One-line description of the collector.
pub const DESCRIPTION: &str = "Read SnapRoute Metrics";
