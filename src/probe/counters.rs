//! Probe outcome counters shared by all workers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::store::SampleKind;

/// Lock-free tallies of probe outcomes.
#[derive(Debug, Default)]
pub struct ProbeCounters {
    probes: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
}

/// Point-in-time copy of [`ProbeCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub probes: u64,
    pub failures: u64,
    pub timeouts: u64,
}

impl ProbeCounters {
    /// Count one completed probe of the given kind.
    pub fn record(&self, kind: SampleKind) {
        self.probes.fetch_add(1, Ordering::Relaxed);
        match kind {
            SampleKind::Measured => {}
            SampleKind::ProbeFailed => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            SampleKind::ProbeTimeout => {
                self.timeouts.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            probes: self.probes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}
