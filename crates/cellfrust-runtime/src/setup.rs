//! Input generation — preference lists and critical windows.
//!
//! These build the tables an experiment starts from: random detector
//! preference lists, and per-detector critical windows cut out of the
//! clustered training data.

use cellfrust_core::error::{CfmError, Result};
use cellfrust_core::preference::Rank;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// One independent random permutation of `0..2 * n_presenters` per detector.
pub fn random_preference_lists<R: Rng + ?Sized>(
    n_detectors: usize,
    n_presenters: usize,
    rng: &mut R,
) -> Vec<Vec<Rank>> {
    let len = (2 * n_presenters) as Rank;
    (0..n_detectors)
        .map(|_| {
            let mut list: Vec<Rank> = (0..len).collect();
            list.shuffle(rng);
            list
        })
        .collect()
}

/// Generated critical windows and the matching sample-draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalWindows {
    /// One row per detector, one column per feature.
    pub left: Vec<Vec<f64>>,
    pub right: Vec<Vec<f64>>,
    /// Sample indices grouped by cluster, clusters in ascending label order.
    pub samples_queue: Vec<usize>,
}

/// Cut critical windows for every detector out of labelled training data.
///
/// Detectors are split evenly across clusters, each cluster taking at most
/// `ceil(n_detectors / n_clusters)`. A detector of a cluster with `m`
/// samples draws `nu` uniformly from `[0, max_nu)` and leaves
/// `floor((m - 1) * nu / 2)` samples outside on the left; its window runs
/// from that order statistic to the mirrored one on the right, per feature.
pub fn critical_windows<R: Rng + ?Sized>(
    training_set: &[Vec<f64>],
    labels: &[i64],
    presenter_sets: usize,
    max_nu: f64,
    rng: &mut R,
) -> Result<CriticalWindows> {
    let n_features = training_set.first().map_or(0, Vec::len);
    if n_features == 0 {
        return Err(CfmError::invalid_config(
            "training set",
            training_set.len(),
            "needs at least one sample with one feature",
        ));
    }
    for (row, sample) in training_set.iter().enumerate() {
        if sample.len() != n_features {
            return Err(CfmError::table_columns("training set", row, sample.len(), n_features));
        }
    }
    if labels.len() != training_set.len() {
        return Err(CfmError::table_rows("cluster labels", labels.len(), training_set.len()));
    }
    if presenter_sets == 0 {
        return Err(CfmError::invalid_config("presenter_sets", 0, "must be at least 1"));
    }
    if !(0.0..=1.0).contains(&max_nu) {
        return Err(CfmError::invalid_config("max_nu", max_nu, "must be between 0 and 1"));
    }

    let mut clusters: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        clusters.entry(label).or_default().push(index);
    }

    let n_detectors = n_features * presenter_sets;
    let per_cluster = n_detectors.div_ceil(clusters.len());
    let mut left = Vec::with_capacity(n_detectors);
    let mut right = Vec::with_capacity(n_detectors);

    for members in clusters.values() {
        let take = per_cluster.min(n_detectors - left.len());
        let m = members.len();

        // Sorted feature columns of this cluster.
        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|feature| {
                let mut column: Vec<f64> =
                    members.iter().map(|&i| training_set[i][feature]).collect();
                column.sort_unstable_by(f64::total_cmp);
                column
            })
            .collect();

        for _ in 0..take {
            let nu = rng.gen::<f64>() * max_nu;
            let out_left = ((m - 1) as f64 * nu / 2.0) as usize;
            let out_right = m - 1 - out_left;
            left.push(columns.iter().map(|c| c[out_left]).collect());
            right.push(columns.iter().map(|c| c[out_right]).collect());
        }
    }

    debug!(
        clusters = clusters.len(),
        detectors = n_detectors,
        per_cluster,
        "generated critical windows"
    );

    Ok(CriticalWindows {
        left,
        right,
        samples_queue: clusters.into_values().flatten().collect(),
    })
}

/// Per feature, swap every detector's window with a uniformly drawn
/// detector's window for that feature.
pub fn shuffle_critical_windows<R: Rng + ?Sized>(
    left: &mut [Vec<f64>],
    right: &mut [Vec<f64>],
    rng: &mut R,
) -> Result<()> {
    let n_detectors = left.len();
    if right.len() != n_detectors {
        return Err(CfmError::table_rows("right critical values", right.len(), n_detectors));
    }
    let n_features = left.first().map_or(0, Vec::len);
    for (row, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l.len() != n_features {
            return Err(CfmError::table_columns("left critical values", row, l.len(), n_features));
        }
        if r.len() != n_features {
            return Err(CfmError::table_columns("right critical values", row, r.len(), n_features));
        }
    }

    for feature in 0..n_features {
        for detector in 0..n_detectors {
            let other = rng.gen_range(0..n_detectors);
            if other != detector {
                let (a, b) = (left[detector][feature], left[other][feature]);
                left[detector][feature] = b;
                left[other][feature] = a;
                let (a, b) = (right[detector][feature], right[other][feature]);
                right[detector][feature] = b;
                right[other][feature] = a;
            }
        }
    }
    Ok(())
}
