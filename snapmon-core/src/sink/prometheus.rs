//! Publishes samples through the `metrics` facade.
//!
//! With the Prometheus exporter installed (see [`crate::observability::init`])
//! the values show up on the `/metrics` endpoint as
//! `snaproute_<measurement>_<field>`, with sample tags as labels.

use super::{FieldValue, MetricKind, MetricSample, MetricSink};
use metrics::Label;
use tracing::debug;

/// Prefix for every published metric name.
pub const METRIC_PREFIX: &str = "snaproute";

#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusSink;

impl PrometheusSink {
    pub fn new() -> Self {
        Self
    }

    pub fn metric_name(measurement: &str, field: &str) -> String {
        format!("{}_{}_{}", METRIC_PREFIX, measurement, field)
    }
}

impl MetricSink for PrometheusSink {
    fn emit(&mut self, sample: MetricSample) {
        let labels: Vec<Label> =
            sample.tags.iter().map(|(k, v)| Label::new(k.clone(), v.clone())).collect();

        for (field, value) in &sample.fields {
            let name = Self::metric_name(&sample.measurement, field);
            match (sample.kind, value) {
                (MetricKind::Counter, FieldValue::Int(delta)) => {
                    // Prometheus counters only move forward
                    if *delta >= 0 {
                        metrics::counter!(name, labels.clone()).increment(*delta as u64);
                    } else {
                        debug!(metric = %name, delta, "Skipping negative counter delta");
                    }
                }
                (_, FieldValue::Int(v)) => {
                    metrics::gauge!(name, labels.clone()).set(*v as f64);
                }
                (_, FieldValue::Bool(v)) => {
                    metrics::gauge!(name, labels.clone()).set(if *v { 1.0 } else { 0.0 });
                }
            }
        }
    }
}
