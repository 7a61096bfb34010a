//! Lifetime ledger — histograms of pairing durations.
//!
//! Every pairing episode is recorded exactly once, when it ends, under the
//! number of rounds it lasted. The cumulative-from-the-right view ("how many
//! episodes lasted at least `t` rounds") is what education and scoring
//! consume.

use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Duration → number of episodes that lasted exactly that long.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeHistogram {
    counts: BTreeMap<Tick, u64>,
}

impl LifetimeHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished episode of `duration` rounds.
    pub fn record(&mut self, duration: Tick) {
        *self.counts.entry(duration).or_insert(0) += 1;
    }

    /// Record `count` episodes of `duration` rounds.
    pub fn record_many(&mut self, duration: Tick, count: u64) {
        if count > 0 {
            *self.counts.entry(duration).or_insert(0) += count;
        }
    }

    pub fn count(&self, duration: Tick) -> u64 {
        self.counts.get(&duration).copied().unwrap_or(0)
    }

    /// Total number of recorded episodes.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Sum of `duration * count` over all entries.
    pub fn total_duration(&self) -> u64 {
        self.counts.iter().map(|(d, c)| d * c).sum()
    }

    /// Number of episodes that lasted at least `duration` rounds.
    pub fn count_at_least(&self, duration: Tick) -> u64 {
        self.counts.range(duration..).map(|(_, c)| c).sum()
    }

    /// Longest recorded duration.
    pub fn max_duration(&self) -> Option<Tick> {
        self.counts.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Add every entry of `other` into this histogram.
    pub fn merge(&mut self, other: &LifetimeHistogram) {
        for (&duration, &count) in &other.counts {
            self.record_many(duration, count);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tick, u64)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }

    /// Duration → number of episodes lasting at least that long, for every
    /// recorded duration. Non-increasing in duration; the value at the
    /// smallest duration is [`LifetimeHistogram::total`].
    pub fn cumulative_from_right(&self) -> BTreeMap<Tick, u64> {
        let mut running = 0;
        let mut out = BTreeMap::new();
        for (&duration, &count) in self.counts.iter().rev() {
            running += count;
            out.insert(duration, running);
        }
        out
    }

    /// Two aligned rows for export: sorted durations, then their counts.
    pub fn rows(&self) -> (Vec<Tick>, Vec<u64>) {
        self.counts.iter().map(|(&d, &c)| (d, c)).unzip()
    }
}

impl FromIterator<(Tick, u64)> for LifetimeHistogram {
    fn from_iter<I: IntoIterator<Item = (Tick, u64)>>(iter: I) -> Self {
        let mut histogram = LifetimeHistogram::new();
        for (duration, count) in iter {
            histogram.record_many(duration, count);
        }
        histogram
    }
}

/// Combine several histograms into one.
pub fn combine<'a, I>(histograms: I) -> LifetimeHistogram
where
    I: IntoIterator<Item = &'a LifetimeHistogram>,
{
    let mut combined = LifetimeHistogram::new();
    for histogram in histograms {
        combined.merge(histogram);
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cumulative_sums_from_the_longest_duration() {
        let histogram: LifetimeHistogram = [(0, 4), (2, 3), (5, 1)].into_iter().collect();
        let cumulative = histogram.cumulative_from_right();
        assert_eq!(cumulative.get(&5), Some(&1));
        assert_eq!(cumulative.get(&2), Some(&4));
        assert_eq!(cumulative.get(&0), Some(&8));
    }

    #[test]
    fn count_at_least_covers_missing_keys() {
        let histogram: LifetimeHistogram = [(1, 2), (4, 3)].into_iter().collect();
        assert_eq!(histogram.count_at_least(0), 5);
        assert_eq!(histogram.count_at_least(2), 3);
        assert_eq!(histogram.count_at_least(4), 3);
        assert_eq!(histogram.count_at_least(5), 0);
    }

    #[test]
    fn rows_are_sorted_and_aligned() {
        let mut histogram = LifetimeHistogram::new();
        histogram.record(7);
        histogram.record(2);
        histogram.record(7);
        assert_eq!(histogram.rows(), (vec![2, 7], vec![1, 2]));
        assert_eq!(histogram.total_duration(), 16);
        assert_eq!(histogram.max_duration(), Some(7));
    }

    #[test]
    fn combine_merges_counts() {
        let a: LifetimeHistogram = [(1, 1), (3, 2)].into_iter().collect();
        let b: LifetimeHistogram = [(3, 1), (9, 1)].into_iter().collect();
        let c = combine([&a, &b]);
        assert_eq!(c.count(3), 3);
        assert_eq!(c.total(), 5);
    }

    proptest! {
        #[test]
        fn cumulative_is_monotonic(entries in proptest::collection::vec((0u64..50, 1u64..10), 1..30)) {
            let histogram: LifetimeHistogram = entries.into_iter().collect();
            let cumulative = histogram.cumulative_from_right();

            let values: Vec<u64> = cumulative.values().copied().collect();
            for pair in values.windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
            prop_assert_eq!(values[0], histogram.total());
        }
    }
}
