//! Poller self metrics.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Register the poller's own metrics with descriptions.
pub fn register_core_metrics() {
    describe_counter!("snapmon_polls_total", "Total number of polls run against the device");
    describe_counter!(
        "snapmon_poll_failures_total",
        "Total number of polls that reported a failure (by reason: transport, decode)"
    );
    describe_histogram!("snapmon_poll_duration_seconds", "Wall time of a complete poll");
    describe_gauge!("snapmon_tracked_ports", "Number of ports with counter history");
}

pub fn record_poll(duration_secs: f64) {
    counter!("snapmon_polls_total").increment(1);
    histogram!("snapmon_poll_duration_seconds").record(duration_secs);
}

pub fn record_poll_failure(reason: &str) {
    counter!("snapmon_poll_failures_total", "reason" => reason.to_string()).increment(1);
}

pub fn set_tracked_ports(count: usize) {
    gauge!("snapmon_tracked_ports").set(count as f64);
}
