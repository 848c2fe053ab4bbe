//! InfluxDB line protocol output.

use super::{FieldValue, MetricSample, MetricSink};
use std::io::{self, Write};
use tracing::warn;

/// Writes each sample as one line protocol record.
///
/// ```text
/// ports,port=fpPort1 in_octets=100i 1700000000000000000
/// status ready=true 1700000000000000000
/// ```
pub struct LineProtocolSink<W: Write> {
    writer: W,
}

impl LineProtocolSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Render a sample, or `None` when it has no fields to write.
    pub fn format(sample: &MetricSample) -> Option<String> {
        if sample.fields.is_empty() {
            return None;
        }

        let mut line = escape(&sample.measurement, &[',', ' ']);
        for (key, value) in &sample.tags {
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }

        let fields: Vec<String> = sample
            .fields
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    FieldValue::Int(v) => format!("{}i", v),
                    FieldValue::Bool(v) => v.to_string(),
                };
                format!("{}={}", escape(key, &[',', '=', ' ']), value)
            })
            .collect();
        line.push(' ');
        line.push_str(&fields.join(","));

        if let Some(ns) = sample.timestamp.timestamp_nanos_opt() {
            line.push(' ');
            line.push_str(&ns.to_string());
        }

        Some(line)
    }
}

impl<W: Write> MetricSink for LineProtocolSink<W> {
    fn emit(&mut self, sample: MetricSample) {
        let Some(line) = Self::format(&sample) else {
            warn!(measurement = %sample.measurement, "Dropping sample without fields");
            return;
        };

        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            warn!(error = %e, measurement = %sample.measurement, "Failed to write sample");
        }
    }
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\\' || special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
