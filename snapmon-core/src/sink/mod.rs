//! Output side of the collector.
//!
//! Every measurement leaves the collector as one [`MetricSample`] handed to a
//! [`MetricSink`]. Samples are self-contained, so a sink never observes a
//! half-written metric.

mod line_protocol;
mod prometheus;

pub use line_protocol::LineProtocolSink;
pub use prometheus::PrometheusSink;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// How a sample should be interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Plain field set with no aggregation semantics
    Untyped,
    /// Point-in-time value
    Gauge,
    /// Accumulated count
    Counter,
}

/// A single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// One emitted measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub measurement: String,
    pub kind: MetricKind,
    pub fields: BTreeMap<String, FieldValue>,
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(measurement: impl Into<String>, kind: MetricKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            kind,
            fields: BTreeMap::new(),
            tags: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).copied()
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Destination for collected samples.
pub trait MetricSink {
    fn emit(&mut self, sample: MetricSample);
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn emit(&mut self, sample: MetricSample) {
        (**self).emit(sample)
    }
}

impl<S: MetricSink + ?Sized> MetricSink for Box<S> {
    fn emit(&mut self, sample: MetricSample) {
        (**self).emit(sample)
    }
}

/// Sink that keeps every sample in emission order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    samples: Vec<MetricSample>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples of one measurement, in emission order.
    pub fn measurement<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetricSample> {
        self.samples.iter().filter(move |s| s.measurement == name)
    }

    /// Remove and return everything collected so far.
    pub fn drain(&mut self) -> Vec<MetricSample> {
        std::mem::take(&mut self.samples)
    }
}

impl MetricSink for MemorySink {
    fn emit(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }
}
