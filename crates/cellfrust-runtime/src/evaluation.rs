//! ROC/AUC evaluation of anomaly responses against known classes.
//!
//! Each normal response is tried as a threshold (plus `-1`, which flags
//! everything); a response strictly above the threshold counts as positive.
//! The resulting curve is resampled at FPR = 0%, 1%, …, 100% by linear
//! interpolation and integrated with the trapezoidal rule.

use cellfrust_core::error::{CfmError, Result};
use serde::Serialize;

/// Class label of a normal sample.
pub const NORMAL: i32 = -1;
/// Class label of an abnormal sample.
pub const ABNORMAL: i32 = 1;

/// Number of points on the resampled FPR grid.
pub const GRID_POINTS: usize = 101;

/// ROC curve resampled on the FPR grid, with its area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    /// `GRID_POINTS` evenly spaced values from 0 to 1.
    pub fpr: Vec<f64>,
    /// Interpolated true-positive rate at each FPR.
    pub tpr: Vec<f64>,
    pub auc: f64,
}

impl RocCurve {
    /// `(fpr %, tpr %)` rows, FPR as a whole percentage.
    pub fn percent_rows(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.tpr
            .iter()
            .enumerate()
            .map(|(i, &tpr)| (i as u32, tpr * 100.0))
    }

    pub fn auc_percent(&self) -> f64 {
        self.auc * 100.0
    }
}

/// Raw (FPR, TPR) points, one per threshold, ordered by increasing FPR.
pub fn roc_points(normal: &[u64], abnormal: &[u64]) -> (Vec<f64>, Vec<f64>) {
    let mut sorted = normal.to_vec();
    sorted.sort_unstable();

    let thresholds = std::iter::once(-1i64).chain(sorted.iter().map(|&r| r as i64));
    let rate = |responses: &[u64], threshold: i64| {
        let positives = responses.iter().filter(|&&r| r as i64 > threshold).count();
        positives as f64 / responses.len() as f64
    };

    let (mut fpr, mut tpr): (Vec<f64>, Vec<f64>) = thresholds
        .map(|t| (rate(normal, t), rate(abnormal, t)))
        .unzip();
    fpr.reverse();
    tpr.reverse();
    (fpr, tpr)
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`. `xp` must be
/// non-decreasing; values outside its range clamp to the end points.
/// On repeated abscissae the last point wins.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x < xp[0] {
        return fp[0];
    }
    let j = xp.partition_point(|&v| v <= x) - 1;
    if j >= last {
        return fp[last];
    }
    let (x0, x1) = (xp[j], xp[j + 1]);
    fp[j] + (fp[j + 1] - fp[j]) * (x - x0) / (x1 - x0)
}

/// Trapezoidal area under `(x, y)`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// Build the resampled ROC curve. `classes` holds one label per response,
/// [`NORMAL`] or [`ABNORMAL`]; both classes must be present.
pub fn roc_curve(responses: &[u64], classes: &[i32]) -> Result<RocCurve> {
    if responses.len() != classes.len() {
        return Err(CfmError::LabelMismatch {
            responses: responses.len(),
            labels: classes.len(),
        });
    }

    let mut normal = Vec::new();
    let mut abnormal = Vec::new();
    for (&response, &class) in responses.iter().zip(classes) {
        match class {
            NORMAL => normal.push(response),
            ABNORMAL => abnormal.push(response),
            other => {
                return Err(CfmError::invalid_config(
                    "class label",
                    other,
                    "expected -1 (normal) or 1 (abnormal)",
                ))
            }
        }
    }
    if normal.is_empty() || abnormal.is_empty() {
        return Err(CfmError::invalid_config(
            "class labels",
            format!("{} normal, {} abnormal", normal.len(), abnormal.len()),
            "both classes are required",
        ));
    }

    let (xp, fp) = roc_points(&normal, &abnormal);
    let fpr: Vec<f64> = (0..GRID_POINTS)
        .map(|i| i as f64 / (GRID_POINTS - 1) as f64)
        .collect();
    let tpr: Vec<f64> = fpr.iter().map(|&x| interp(x, &xp, &fp)).collect();
    let auc = trapezoid(&fpr, &tpr);

    Ok(RocCurve { fpr, tpr, auc })
}
