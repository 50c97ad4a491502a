//! Phase-offset probe worker.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use crate::aggregate::Resolution;
use crate::probe::{ProbeCounters, ProbeExecutor};
use crate::store::{Sample, SampleStore};

/// Highest supported probe frequency (probes per second, one worker each).
pub const MAX_FREQUENCY: u32 = 100;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Sub-second offset of worker `index` when `frequency` workers share a second.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use proping::probe::phase_offset;
///
/// assert_eq!(phase_offset(0, 10), TimeDelta::zero());
/// assert_eq!(phase_offset(3, 10), TimeDelta::milliseconds(300));
/// ```
pub fn phase_offset(index: u32, frequency: u32) -> TimeDelta {
    let frequency = i64::from(frequency.max(1));
    TimeDelta::nanoseconds(NANOS_PER_SEC * i64::from(index) / frequency)
}

/// Next scheduled probe instant: the next whole second after `now`, plus the
/// worker's phase offset.
pub fn next_probe_at(now: DateTime<Utc>, index: u32, frequency: u32) -> DateTime<Utc> {
    Resolution::OneSecond.align(now) + TimeDelta::seconds(1) + phase_offset(index, frequency)
}

/// One probe stream at a fixed phase offset.
///
/// Appends exactly one sample per loop iteration; failures become 100% loss
/// samples and never end the loop.
pub struct ProbeWorker {
    host: String,
    index: u32,
    frequency: u32,
    executor: Arc<dyn ProbeExecutor>,
    store: Arc<SampleStore>,
    counters: Arc<ProbeCounters>,
}

impl ProbeWorker {
    /// Create a worker for `index` in `0..frequency`.
    pub fn new(
        host: impl Into<String>,
        index: u32,
        frequency: u32,
        executor: Arc<dyn ProbeExecutor>,
        store: Arc<SampleStore>,
        counters: Arc<ProbeCounters>,
    ) -> Self {
        Self {
            host: host.into(),
            index,
            frequency,
            executor,
            store,
            counters,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run one probe and record its outcome.
    pub async fn probe_once(&self) -> Sample {
        let outcome = self.executor.probe(&self.host).await;
        let sample = Sample::from_outcome(Utc::now(), &outcome);

        match &outcome {
            Ok(loss) => {
                tracing::trace!(
                    worker = self.index,
                    host = %self.host,
                    loss,
                    "Probe completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    worker = self.index,
                    host = %self.host,
                    executor = self.executor.name(),
                    error = %e,
                    "Probe failed, recording total loss"
                );
            }
        }

        self.counters.record(sample.kind);
        self.store.append(sample);
        sample
    }

    /// Sleep-probe-record until `cancel` fires.
    ///
    /// Cancellation during the sleep exits immediately. An in-flight probe is
    /// allowed to finish and its sample is recorded before the loop exits.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::debug!(
            worker = self.index,
            host = %self.host,
            offset_ms = phase_offset(self.index, self.frequency).num_milliseconds(),
            "Probe worker started"
        );

        loop {
            let now = Utc::now();
            let delay = (next_probe_at(now, self.index, self.frequency) - now)
                .to_std()
                .unwrap_or_default();

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            self.probe_once().await;

            if cancel.is_cancelled() {
                break;
            }
        }

        tracing::debug!(worker = self.index, host = %self.host, "Probe worker stopped");
    }
}

impl std::fmt::Debug for ProbeWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeWorker")
            .field("host", &self.host)
            .field("index", &self.index)
            .field("frequency", &self.frequency)
            .finish_non_exhaustive()
    }
}
