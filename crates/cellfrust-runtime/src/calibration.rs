//! Calibration and scoring.
//!
//! Detectors are monitored on known-normal samples first. From their
//! lifetime histograms we derive the activation tau (the pairing duration
//! beyond which persistence is unusual) and one activation threshold per
//! detector (how many such long pairings a normal sample still produces).
//! A new sample is then scored by the excess of long pairings over those
//! thresholds, summed across detectors.

use cellfrust_core::error::{CfmError, Result};
use cellfrust_core::ledger::{combine, LifetimeHistogram};
use cellfrust_core::types::Tick;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Check that every calibration sample carries one histogram per detector.
fn detector_count(samples: &[Vec<LifetimeHistogram>]) -> Result<usize> {
    let first = samples.first().ok_or(CfmError::EmptyCalibration)?;
    let n_detectors = first.len();
    if n_detectors == 0 {
        return Err(CfmError::EmptyCalibration);
    }
    for (row, sample) in samples.iter().enumerate() {
        if sample.len() != n_detectors {
            return Err(CfmError::table_columns(
                "calibration histograms",
                row,
                sample.len(),
                n_detectors,
            ));
        }
    }
    Ok(n_detectors)
}

/// Smallest duration at which the average number of pairings lasting at
/// least that long, per sample and detector, drops below one. Falls back to
/// the longest duration observed.
pub fn activation_tau(samples: &[Vec<LifetimeHistogram>]) -> Result<Tick> {
    let n_detectors = detector_count(samples)?;
    let combined = combine(samples.iter().flatten());
    let longest = combined.max_duration().ok_or(CfmError::EmptyCalibration)?;

    let norm = (samples.len() * n_detectors) as f64;
    let tau = combined
        .cumulative_from_right()
        .into_iter()
        .find(|&(_, count)| (count as f64) / norm < 1.0)
        .map_or(longest, |(duration, _)| duration);
    Ok(tau)
}

/// Index into a descending list of `len` values for the given percentile
/// (nearest rank). `None` for an empty list.
pub fn percentile_index(percentile: u32, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let rank = (percentile as usize * len + 99) / 100;
    Some(rank.saturating_sub(1).min(last))
}

/// Per detector: the number of pairings lasting at least `tau` in each
/// calibration sample, sorted descending, taken at `percentile`.
pub fn activation_thresholds(
    samples: &[Vec<LifetimeHistogram>],
    tau: Tick,
    percentile: u32,
) -> Result<Vec<u64>> {
    let n_detectors = detector_count(samples)?;
    if percentile > 100 {
        return Err(CfmError::invalid_config(
            "calibration_percentile",
            percentile,
            "must be between 0 and 100",
        ));
    }
    let index = percentile_index(percentile, samples.len()).ok_or(CfmError::EmptyCalibration)?;

    let thresholds = (0..n_detectors)
        .map(|detector| {
            let mut counts: Vec<u64> = samples
                .iter()
                .map(|sample| sample[detector].count_at_least(tau))
                .collect();
            counts.sort_unstable_by(|a, b| b.cmp(a));
            counts[index]
        })
        .collect();
    Ok(thresholds)
}

/// The fitted scoring model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub activation_tau: Tick,
    /// One activation threshold per detector, in detector order.
    pub thresholds: Vec<u64>,
    pub percentile: u32,
    /// Number of calibration samples the model was fitted on.
    pub samples: usize,
}

impl Calibration {
    /// Fit from the detector histograms of each calibration sample.
    pub fn fit(samples: &[Vec<LifetimeHistogram>], percentile: u32) -> Result<Self> {
        let activation_tau = activation_tau(samples)?;
        let thresholds = activation_thresholds(samples, activation_tau, percentile)?;
        debug!(
            activation_tau,
            samples = samples.len(),
            detectors = thresholds.len(),
            "calibrated"
        );
        Ok(Self {
            activation_tau,
            thresholds,
            percentile,
            samples: samples.len(),
        })
    }

    pub fn n_detectors(&self) -> usize {
        self.thresholds.len()
    }

    /// Anomaly score of one monitored sample: long pairings in excess of
    /// each detector's threshold, summed.
    pub fn collective_response(&self, detector_lifetimes: &[LifetimeHistogram]) -> Result<u64> {
        if detector_lifetimes.len() != self.thresholds.len() {
            return Err(CfmError::table_rows(
                "detector histograms",
                detector_lifetimes.len(),
                self.thresholds.len(),
            ));
        }
        Ok(detector_lifetimes
            .iter()
            .zip(&self.thresholds)
            .map(|(histogram, &threshold)| {
                histogram
                    .count_at_least(self.activation_tau)
                    .saturating_sub(threshold)
            })
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(entries: &[(Tick, u64)]) -> LifetimeHistogram {
        entries.iter().copied().collect()
    }

    #[test]
    fn activation_tau_is_where_average_drops_below_one() {
        // Two samples, two detectors: norm = 4.
        // Combined: 1 -> 8, 3 -> 4, 7 -> 2. Cumulative: 1 -> 14, 3 -> 6, 7 -> 2.
        let samples = vec![
            vec![hist(&[(1, 2), (3, 1)]), hist(&[(1, 2), (3, 1), (7, 1)])],
            vec![hist(&[(1, 2), (3, 1)]), hist(&[(1, 2), (3, 1), (7, 1)])],
        ];
        assert_eq!(activation_tau(&samples).unwrap(), 7);
    }

    #[test]
    fn activation_tau_falls_back_to_longest_duration() {
        // Every duration is reached at least once per detector on average.
        let samples = vec![vec![hist(&[(2, 1), (5, 1)]), hist(&[(2, 1), (5, 1)])]];
        assert_eq!(activation_tau(&samples).unwrap(), 5);
    }

    #[test]
    fn empty_calibration_is_rejected() {
        assert_eq!(activation_tau(&[]), Err(CfmError::EmptyCalibration));
        let no_episodes = vec![vec![LifetimeHistogram::new()]];
        assert_eq!(activation_tau(&no_episodes), Err(CfmError::EmptyCalibration));
    }

    #[test]
    fn ragged_samples_are_rejected() {
        let samples = vec![vec![hist(&[(1, 1)])], vec![]];
        assert!(matches!(
            activation_tau(&samples),
            Err(CfmError::TableColumns { row: 1, .. })
        ));
    }

    #[test]
    fn percentile_index_uses_nearest_rank() {
        assert_eq!(percentile_index(0, 10), Some(0));
        assert_eq!(percentile_index(5, 100), Some(4));
        assert_eq!(percentile_index(50, 10), Some(4));
        assert_eq!(percentile_index(100, 10), Some(9));
        assert_eq!(percentile_index(5, 1), Some(0));
        assert_eq!(percentile_index(5, 0), None);
    }

    #[test]
    fn identical_samples_give_their_own_count() {
        let sample = vec![hist(&[(1, 5), (4, 3), (9, 1)]), hist(&[(2, 4), (4, 2)])];
        let samples = vec![sample.clone(); 6];
        let thresholds = activation_thresholds(&samples, 4, 5).unwrap();
        assert_eq!(thresholds, vec![4, 2]);
    }

    #[test]
    fn thresholds_pick_from_descending_counts() {
        // Detector counts at tau 3 across four samples: 0, 1, 2, 3.
        let samples: Vec<Vec<LifetimeHistogram>> =
            (0..4).map(|n| vec![hist(&[(3, n)])]).collect();
        assert_eq!(activation_thresholds(&samples, 3, 0).unwrap(), vec![3]);
        assert_eq!(activation_thresholds(&samples, 3, 50).unwrap(), vec![2]);
        assert_eq!(activation_thresholds(&samples, 3, 100).unwrap(), vec![0]);
    }

    #[test]
    fn response_sums_excess_over_thresholds() {
        let calibration = Calibration {
            activation_tau: 5,
            thresholds: vec![2, 0, 10],
            percentile: 5,
            samples: 1,
        };
        let monitored = vec![
            hist(&[(5, 3), (6, 1)]),
            hist(&[(1, 7), (8, 2)]),
            hist(&[(9, 4)]),
        ];
        // (4 - 2) + (2 - 0) + 0 (floored)
        assert_eq!(calibration.collective_response(&monitored).unwrap(), 4);
    }

    #[test]
    fn response_checks_detector_count() {
        let calibration = Calibration {
            activation_tau: 1,
            thresholds: vec![0, 0],
            percentile: 5,
            samples: 1,
        };
        assert!(calibration
            .collective_response(&[LifetimeHistogram::new()])
            .is_err());
    }

    #[test]
    fn fit_then_score_normal_sample_is_zero() {
        let sample = vec![hist(&[(1, 6), (3, 2), (12, 1)]), hist(&[(2, 5), (12, 1)])];
        let calibration = Calibration::fit(&vec![sample.clone(); 3], 5).unwrap();
        assert_eq!(calibration.collective_response(&sample).unwrap(), 0);
    }
}
