//! Port counter collection and history module.
//!
//! Polls the SnapRoute REST API and turns cumulative interface counters into
//! per-interval rates and deltas.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   GET state/Ports        ┌──────────────────────┐
//! │  SnapRoute      │ ◄────────────────────────│ PortMetricsCollector │
//! │  REST API       │   GET state/SystemStatus │  ├─ gather()         │
//! │                 │ ◄────────────────────────│  └─ PortHistory      │
//! └─────────────────┘                          └──────────┬───────────┘
//!                                                         │ MetricSample
//!                                                         ▼
//!                                                   MetricSink
//! ```

mod collector;
mod history;

pub use collector::PortMetricsCollector;
pub use history::{evaluate, CounterField, CounterSet, PortHistory, PortReadings, Reading};

/// Measurement carrying per-port rates and deltas.
pub const MEASUREMENT_PORTS: &str = "ports";

/// Measurement carrying device readiness.
pub const MEASUREMENT_STATUS: &str = "status";

/// Tag naming the interface on `ports` samples.
pub const TAG_PORT: &str = "port";

/// Readiness field on `status` samples.
pub const FIELD_READY: &str = "ready";
