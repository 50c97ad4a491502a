//! Bounded FIFO sample buffer.
//!
//! Single mutex guards append+evict as one step, so readers observe either the
//! state before or after an append. Range scans copy out the matching samples
//! and release the lock before any aggregation work happens.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::Sample;

/// Upper bound on the initial allocation; the ring grows up to capacity on demand.
const MAX_PREALLOCATED: usize = 4096;

struct Inner {
    samples: VecDeque<Sample>,
    appended: u64,
    evicted: u64,
}

/// Thread-safe bounded sample store.
///
/// Shared as `Arc<SampleStore>` between every probe worker and the driver.
pub struct SampleStore {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl SampleStore {
    /// Create an empty store holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                samples: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED)),
                appended: 0,
                evicted: 0,
            }),
        }
    }

    /// Append a sample at the tail, evicting the oldest entries once over capacity.
    pub fn append(&self, sample: Sample) {
        let mut inner = self.inner.lock();
        inner.samples.push_back(sample);
        inner.appended += 1;
        while inner.samples.len() > self.capacity {
            inner.samples.pop_front();
            inner.evicted += 1;
        }
    }

    /// Loss values of all samples with `start <= ts < end`, in no particular order.
    pub fn range_query(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<f64> {
        let inner = self.inner.lock();
        inner
            .samples
            .iter()
            .filter(|s| s.ts >= start && s.ts < end)
            .map(|s| s.loss)
            .collect()
    }

    /// Full samples with `start <= ts < end`, in insertion order.
    pub fn range_samples(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Sample> {
        let inner = self.inner.lock();
        inner
            .samples
            .iter()
            .filter(|s| s.ts >= start && s.ts < end)
            .copied()
            .collect()
    }

    /// Loss values of all samples at or after `start`.
    pub fn since(&self, start: DateTime<Utc>) -> Vec<f64> {
        let inner = self.inner.lock();
        inner
            .samples
            .iter()
            .filter(|s| s.ts >= start)
            .map(|s| s.loss)
            .collect()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().samples.len()
    }

    /// Whether the store holds no samples.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().samples.is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total samples ever appended.
    pub fn total_appended(&self) -> u64 {
        self.inner.lock().appended
    }

    /// Total samples evicted by the capacity bound.
    pub fn total_evicted(&self) -> u64 {
        self.inner.lock().evicted
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStore")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
