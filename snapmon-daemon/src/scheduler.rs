//! Poll scheduling for snapmond.
//!
//! Runs the collector on a fixed interval until shutdown is requested. Each
//! tick awaits the previous poll, so polls never overlap; ticks missed while a
//! slow poll runs are skipped rather than bunched up.

use snapmon_core::observability::metrics::{record_poll, record_poll_failure, set_tracked_ports};
use snapmon_core::{MetricSink, PortMetricsCollector, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Drives one collector on an interval.
pub struct Scheduler<S: MetricSink> {
    collector: PortMetricsCollector,
    sink: S,
    interval: Duration,
}

impl<S: MetricSink> Scheduler<S> {
    pub fn new(collector: PortMetricsCollector, sink: S, interval: Duration) -> Self {
        Self { collector, sink, interval }
    }

    /// Run a single poll and record its outcome.
    pub async fn poll_once(&mut self) -> Result<()> {
        let start = Instant::now();
        let result = self.collector.gather(&mut self.sink).await;
        let elapsed = start.elapsed();

        record_poll(elapsed.as_secs_f64());
        set_tracked_ports(self.collector.history().len());

        match &result {
            Ok(()) => debug!(duration_ms = elapsed.as_millis() as u64, "Poll completed"),
            Err(e) => {
                record_poll_failure(e.kind());
                warn!(error = %e, reason = e.kind(), "Poll failed");
            }
        }

        result
    }

    /// Poll every interval until `shutdown` resolves.
    ///
    /// A failed poll is logged and the schedule continues; the next tick
    /// starts a fresh attempt.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            url = %self.collector.base_url(),
            interval_secs = self.interval.as_secs(),
            "Polling started"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let _ = self.poll_once().await;
                }
            }
        }

        info!("Polling stopped");
    }
}
