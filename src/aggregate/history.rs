//! Bucketed loss histories.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::Resolution;
use crate::store::SampleStore;

/// Default number of buckets per history (one chart's worth of bars).
pub const DEFAULT_BUCKET_COUNT: usize = 60;

/// One fixed time slot of a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Mean loss of the samples in range; `None` when no sample fell in range.
    pub value: Option<f64>,
    /// Number of samples averaged.
    pub samples: usize,
}

/// Fixed-length sequence of buckets at one resolution, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub resolution: Resolution,
    /// Wall-clock time the history was computed for.
    pub computed_at: DateTime<Utc>,
    pub buckets: Vec<Bucket>,
}

impl History {
    /// Bucket count.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket `i`, where 0 is the most recent.
    pub fn get(&self, i: usize) -> Option<&Bucket> {
        self.buckets.get(i)
    }

    /// Bucket whose range contains `ts`.
    pub fn bucket_at(&self, ts: DateTime<Utc>) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.start <= ts && ts < b.end)
    }

    /// Bucket values, newest first.
    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.buckets.iter().map(|b| b.value)
    }

    /// Buckets oldest first, the order a chart draws them left to right.
    pub fn chronological(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.buckets.iter().rev()
    }

    /// Whether every bucket is "no data".
    pub fn has_no_data(&self) -> bool {
        self.buckets.iter().all(|b| b.value.is_none())
    }
}

/// Computes histories of a fixed bucket count from a [`SampleStore`].
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    bucket_count: usize,
}

impl Aggregator {
    pub fn new(bucket_count: usize) -> Self {
        Self { bucket_count }
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Build the history for `resolution` as of `now`.
    ///
    /// Bucket `i` covers `[newest - i·width, newest - (i-1)·width)` where
    /// `newest` is [`Resolution::newest_bucket_start`]. For 1s that is the
    /// second containing `now`; for 1m and 5m it is the last completed cell.
    /// The store is scanned once for the whole span and each sample is placed
    /// by its offset.
    pub fn compute(&self, store: &SampleStore, resolution: Resolution, now: DateTime<Utc>) -> History {
        let count = self.bucket_count;
        let width_secs = resolution.width_secs();
        let newest = resolution.newest_bucket_start(now);

        let mut sums = vec![0.0_f64; count];
        let mut counts = vec![0_usize; count];

        if count > 0 {
            let span_start = newest - TimeDelta::seconds(width_secs * (count as i64 - 1));
            let span_end = newest + resolution.width();
            let width_ms = width_secs * 1_000;

            for sample in store.range_samples(span_start, span_end) {
                let offset_ms = (sample.ts - span_start).num_milliseconds();
                let oldest_first = (offset_ms / width_ms) as usize;
                if oldest_first < count {
                    let i = count - 1 - oldest_first;
                    sums[i] += sample.loss;
                    counts[i] += 1;
                }
            }
        }

        let buckets = (0..count)
            .map(|i| {
                let start = newest - TimeDelta::seconds(width_secs * i as i64);
                Bucket {
                    start,
                    end: start + resolution.width(),
                    value: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
                    samples: counts[i],
                }
            })
            .collect();

        History {
            resolution,
            computed_at: now,
            buckets,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_COUNT)
    }
}
