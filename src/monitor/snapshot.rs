//! Per-tick view pushed to presentation subscribers.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::aggregate::{History, HistorySet, LossStats, Resolution, instant_loss};
use crate::probe::{CounterSnapshot, ProbeCounters};
use crate::store::SampleStore;

/// One resolution's history together with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionView {
    pub resolution: Resolution,
    pub stats: LossStats,
    pub history: History,
}

/// Everything the presentation layer needs for one driver tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub uptime: Duration,
    /// Mean loss over the trailing instant window.
    pub instant_loss: f64,
    /// Views ordered as [`Resolution::ALL`].
    pub views: [ResolutionView; 3],
    pub sample_count: usize,
    pub store_capacity: usize,
    pub probes: CounterSnapshot,
}

impl Snapshot {
    pub(crate) fn capture(
        histories: &HistorySet,
        store: &SampleStore,
        counters: &ProbeCounters,
        instant_window: TimeDelta,
        now: DateTime<Utc>,
        uptime: Duration,
    ) -> Self {
        let views = Resolution::ALL.map(|resolution| ResolutionView {
            resolution,
            stats: histories.stats(resolution),
            history: histories.history(resolution).clone(),
        });

        Self {
            taken_at: now,
            uptime,
            instant_loss: instant_loss(store, instant_window, now),
            views,
            sample_count: store.len(),
            store_capacity: store.capacity(),
            probes: counters.snapshot(),
        }
    }

    pub fn view(&self, resolution: Resolution) -> &ResolutionView {
        &self.views[resolution.slot()]
    }

    pub fn history(&self, resolution: Resolution) -> &History {
        &self.view(resolution).history
    }

    pub fn stats(&self, resolution: Resolution) -> LossStats {
        self.view(resolution).stats
    }
}
