//! Summary statistics over histories and raw samples.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::History;
use crate::store::SampleStore;

/// Average and maximum loss across the populated buckets of a history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossStats {
    pub average: f64,
    pub maximum: f64,
}

/// Summarise a history, skipping "no data" buckets. All-empty yields `(0, 0)`.
pub fn summarize(history: &History) -> LossStats {
    let (sum, count, maximum) = history
        .values()
        .flatten()
        .fold((0.0, 0_usize, 0.0_f64), |(sum, count, max), v| {
            (sum + v, count + 1, max.max(v))
        });

    if count == 0 {
        return LossStats::default();
    }

    LossStats {
        average: sum / count as f64,
        maximum,
    }
}

/// Mean loss over raw samples in `[now - window, now)`, or 0 with no samples.
///
/// Reads the store directly, bypassing bucketing.
pub fn instant_loss(store: &SampleStore, window: TimeDelta, now: DateTime<Utc>) -> f64 {
    let values = store.range_query(now - window, now);
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
