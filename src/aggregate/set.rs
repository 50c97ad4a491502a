//! The three live histories and their refresh cadence.

use chrono::{DateTime, Utc};

use crate::aggregate::{Aggregator, History, LossStats, Resolution, summarize};
use crate::store::SampleStore;

struct Slot {
    history: History,
    last_refresh: Option<DateTime<Utc>>,
}

/// Per-resolution histories, recomputed wholesale when due.
///
/// The 1s history is due on every refresh; coarser ones only once a new
/// grid boundary has passed since their previous computation, which is when
/// their newest completed cell changes.
pub struct HistorySet {
    aggregator: Aggregator,
    slots: [Slot; 3],
}

impl HistorySet {
    /// Create a set whose histories are all "no data" as of `now`.
    pub fn new(bucket_count: usize, now: DateTime<Utc>) -> Self {
        let aggregator = Aggregator::new(bucket_count);
        let empty = SampleStore::new(0);
        let slots = Resolution::ALL.map(|resolution| Slot {
            history: aggregator.compute(&empty, resolution, now),
            last_refresh: None,
        });
        Self { aggregator, slots }
    }

    /// Whether `resolution` should be recomputed at `now`.
    pub fn is_due(&self, resolution: Resolution, now: DateTime<Utc>) -> bool {
        if resolution == Resolution::OneSecond {
            return true;
        }
        match self.slots[resolution.slot()].last_refresh {
            None => true,
            Some(last) => resolution.align(now) != resolution.align(last),
        }
    }

    /// Recompute every due history; returns the resolutions that were refreshed.
    pub fn refresh(&mut self, store: &SampleStore, now: DateTime<Utc>) -> Vec<Resolution> {
        let mut refreshed = Vec::with_capacity(Resolution::ALL.len());
        for resolution in Resolution::ALL {
            if !self.is_due(resolution, now) {
                continue;
            }
            let slot = &mut self.slots[resolution.slot()];
            slot.history = self.aggregator.compute(store, resolution, now);
            slot.last_refresh = Some(now);
            refreshed.push(resolution);
        }
        refreshed
    }

    pub fn history(&self, resolution: Resolution) -> &History {
        &self.slots[resolution.slot()].history
    }

    pub fn stats(&self, resolution: Resolution) -> LossStats {
        summarize(self.history(resolution))
    }

    pub fn last_refresh(&self, resolution: Resolution) -> Option<DateTime<Utc>> {
        self.slots[resolution.slot()].last_refresh
    }
}

impl std::fmt::Debug for HistorySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySet")
            .field("bucket_count", &self.aggregator.bucket_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Sample;
    use chrono::TimeDelta;

    fn base() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_new_set_has_no_data() {
        let set = HistorySet::new(60, base());
        for resolution in Resolution::ALL {
            assert_eq!(set.history(resolution).len(), 60);
            assert!(set.history(resolution).has_no_data());
            assert_eq!(set.stats(resolution), LossStats::default());
            assert_eq!(set.last_refresh(resolution), None);
        }
    }

    #[test]
    fn test_first_refresh_computes_everything() {
        let store = SampleStore::new(10);
        let mut set = HistorySet::new(60, base());
        assert_eq!(set.refresh(&store, base()), Resolution::ALL.to_vec());
    }

    #[test]
    fn test_refresh_cadence() {
        let store = SampleStore::new(10);
        // 12:00:00 UTC, on every grid boundary.
        let start = DateTime::from_timestamp(1_709_294_400, 0).unwrap();
        let mut set = HistorySet::new(60, start);
        set.refresh(&store, start);

        let at = |secs: i64| start + TimeDelta::seconds(secs);
        assert_eq!(set.refresh(&store, at(1)), vec![Resolution::OneSecond]);
        assert_eq!(set.refresh(&store, at(59)), vec![Resolution::OneSecond]);
        assert_eq!(
            set.refresh(&store, at(60)),
            vec![Resolution::OneSecond, Resolution::OneMinute]
        );
        assert_eq!(set.refresh(&store, at(119)), vec![Resolution::OneSecond]);
        assert_eq!(
            set.refresh(&store, at(300)),
            vec![
                Resolution::OneSecond,
                Resolution::OneMinute,
                Resolution::FiveMinutes
            ]
        );
    }

    #[test]
    fn test_refresh_follows_grid_not_elapsed_time() {
        let store = SampleStore::new(10);
        // 12:00:50 UTC.
        let start = DateTime::from_timestamp(1_709_294_450, 0).unwrap();
        let mut set = HistorySet::new(60, start);
        set.refresh(&store, start);

        // Ten seconds later a new minute has begun.
        let next_minute = start + TimeDelta::seconds(10);
        assert!(set.is_due(Resolution::OneMinute, next_minute));
        assert!(!set.is_due(Resolution::FiveMinutes, next_minute));
        assert_eq!(
            set.refresh(&store, next_minute),
            vec![Resolution::OneSecond, Resolution::OneMinute]
        );
    }

    #[test]
    fn test_completed_minute_replaces_partial_view() {
        let store = SampleStore::new(1_000);
        let start = DateTime::from_timestamp(1_709_294_400, 0).unwrap();
        let mut set = HistorySet::new(60, start);

        for tenth in 0..10 {
            store.append(Sample::measured(start + TimeDelta::milliseconds(tenth * 100), 100.0));
        }
        set.refresh(&store, start + TimeDelta::seconds(1));
        assert!(set.history(Resolution::OneMinute).has_no_data());

        for second in 1..60 {
            for tenth in 0..10 {
                let ts = start + TimeDelta::milliseconds(second * 1_000 + tenth * 100);
                store.append(Sample::measured(ts, 0.0));
            }
            set.refresh(&store, start + TimeDelta::seconds(second + 1));
        }

        let stats = set.stats(Resolution::OneMinute);
        assert!((stats.average - 100.0 / 60.0).abs() < 1e-9);
        assert_eq!(stats.maximum, stats.average);
    }

    #[test]
    fn test_coarse_history_held_until_due() {
        let store = SampleStore::new(100);
        let mut set = HistorySet::new(60, base());
        set.refresh(&store, base());

        store.append(Sample::measured(base() + TimeDelta::seconds(5), 100.0));
        set.refresh(&store, base() + TimeDelta::seconds(10));

        assert!(set.history(Resolution::OneMinute).has_no_data());
        assert_eq!(set.stats(Resolution::OneSecond).maximum, 100.0);
    }
}
