//! Periodic aggregation driver.
//!
//! Single task that, on every tick, refreshes the due histories from the store
//! and publishes a fresh [`Snapshot`]. It only ever reads the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::aggregate::HistorySet;
use crate::monitor::Snapshot;
use crate::probe::ProbeCounters;
use crate::store::SampleStore;

pub(crate) struct Driver {
    pub(crate) store: Arc<SampleStore>,
    pub(crate) counters: Arc<ProbeCounters>,
    pub(crate) histories: HistorySet,
    pub(crate) tick: Duration,
    pub(crate) instant_window: TimeDelta,
    pub(crate) started_at: Instant,
    pub(crate) tx: watch::Sender<Arc<Snapshot>>,
}

impl Driver {
    /// Refresh due histories and capture a snapshot as of `now`.
    pub(crate) fn step(&mut self, now: DateTime<Utc>) -> Snapshot {
        let refreshed = self.histories.refresh(&self.store, now);
        tracing::trace!(?refreshed, samples = self.store.len(), "Histories refreshed");

        Snapshot::capture(
            &self.histories,
            &self.store,
            &self.counters,
            self.instant_window,
            now,
            self.started_at.elapsed(),
        )
    }

    pub(crate) async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(tick_ms = self.tick.as_millis(), "Aggregation driver started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let snapshot = self.step(Utc::now());
                    self.tx.send_replace(Arc::new(snapshot));
                }
            }
        }

        tracing::debug!("Aggregation driver stopped");
    }
}
