//! Port metrics collector - polls the SnapRoute REST API and emits samples.

use super::history::{CounterField, PortHistory, PortReadings, Reading};
use super::{FIELD_READY, MEASUREMENT_PORTS, MEASUREMENT_STATUS, TAG_PORT};
use crate::api::{
    decode, DeviceApi, HttpDeviceApi, PortsDocument, StatusDocument, PORTS_PATH,
    SYSTEM_STATUS_PATH,
};
use crate::config::Config;
use crate::error::{Result, SnapmonError};
use crate::sink::{MetricKind, MetricSample, MetricSink};
use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument};

/// Collects port counters and system readiness from one device.
///
/// A collector owns its counter history, and `gather` takes `&mut self`, so
/// polls against one instance are always serialized.
pub struct PortMetricsCollector {
    /// API prefix, e.g. `http://localhost:8080/public/v1/`
    base_url: String,

    api: Box<dyn DeviceApi>,

    /// Time of the previous poll that got through the port listing
    last_sample_time: Option<DateTime<Utc>>,

    history: PortHistory,
}

impl PortMetricsCollector {
    /// Create a collector reading from `base_url` through `api`.
    pub fn new(base_url: impl Into<String>, api: impl DeviceApi + 'static) -> Self {
        Self {
            base_url: base_url.into(),
            api: Box::new(api),
            last_sample_time: None,
            history: PortHistory::new(),
        }
    }

    /// Create a collector with an HTTP client built from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = HttpDeviceApi::new(config.timeout())?;
        Ok(Self::new(config.url.clone(), api))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn history(&self) -> &PortHistory {
        &self.history
    }

    pub fn last_sample_time(&self) -> Option<DateTime<Utc>> {
        self.last_sample_time
    }

    /// Run one poll against the device.
    pub async fn gather<S: MetricSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.gather_at(Utc::now(), sink).await
    }

    /// Run one poll as of `now`.
    ///
    /// - Fetch failures publish `status ready=false` and are returned.
    /// - Decode failures are returned without a status sample.
    /// - Any other fault publishes `status ready=false` and is swallowed.
    #[instrument(skip(self, sink), fields(url = %self.base_url))]
    pub async fn gather_at<S: MetricSink + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<()> {
        match self.collect(now, sink).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_transport() => {
                error!(error = %e, "Error talking to SnapRoute");
                emit_ready(sink, false, now);
                Err(e)
            }
            Err(e) if e.is_decode() => Err(e),
            Err(e) => {
                error!(error = %e, "Problem reading from SnapRoute");
                emit_ready(sink, false, now);
                Ok(())
            }
        }
    }

    async fn collect<S: MetricSink + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<()> {
        let elapsed_secs = self.last_sample_time.map_or(0, |last| (now - last).num_seconds());

        // Suspect but kept: a port listing that fails to decode does not report
        // readiness, while a failed fetch does.
        let ports: PortsDocument = self.fetch(PORTS_PATH).await?;

        let mut processed = 0usize;
        for entry in &ports.objects {
            let port = &entry.object;
            if !port.is_up() {
                continue;
            }

            let readings = self.history.observe(port, elapsed_secs)?;
            emit_port(sink, &port.intf_ref, &readings, now);
            processed += 1;
        }

        debug!(
            listed = ports.objects.len(),
            processed,
            elapsed_secs,
            tracked = self.history.len(),
            "Processed port counters"
        );

        self.last_sample_time = Some(now);

        let status: StatusDocument = self.fetch(SYSTEM_STATUS_PATH).await?;
        emit_ready(sink, status.object.ready, now);

        Ok(())
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.api.get(&url).await.map_err(|e| match e {
            SnapmonError::Transport { .. } => e,
            other => SnapmonError::Transport { url: url.clone(), reason: other.to_string() },
        })?;
        decode(&url, &body)
    }
}

/// Emit the samples for one port's readings.
///
/// Unpopulated broadcast and octet counters publish `0` right away. The full
/// set of seven is published only when every counter had a usable reading.
fn emit_port<S: MetricSink + ?Sized>(
    sink: &mut S,
    intf_ref: &str,
    readings: &PortReadings,
    now: DateTime<Utc>,
) {
    for (field, reading) in readings.iter() {
        if field.reports_unpopulated() && reading == Reading::Unpopulated {
            sink.emit(port_sample(intf_ref, MetricKind::Gauge, field, 0, now));
        }
    }

    if !readings.is_complete() {
        return;
    }

    for (field, reading) in readings.iter() {
        let value = reading.value().unwrap_or_default();
        sink.emit(port_sample(intf_ref, field.kind(), field, value, now));
    }
}

fn port_sample(
    intf_ref: &str,
    kind: MetricKind,
    field: CounterField,
    value: i64,
    now: DateTime<Utc>,
) -> MetricSample {
    MetricSample::new(MEASUREMENT_PORTS, kind, now)
        .with_field(field.name(), value)
        .with_tag(TAG_PORT, intf_ref)
}

fn emit_ready<S: MetricSink + ?Sized>(sink: &mut S, ready: bool, now: DateTime<Utc>) {
    sink.emit(
        MetricSample::new(MEASUREMENT_STATUS, MetricKind::Untyped, now)
            .with_field(FIELD_READY, ready),
    );
}
