//! Cellfrust Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use cellfrust_runtime::prelude::*;
//! ```

// Re-export colony
pub use crate::colony::{Colony, NoEducation, PhaseReport, RoundHook, SampleFeed};

// Re-export matching
pub use crate::matching::{decide, Decision, InteractionTally, Matchmaker};

// Re-export dissociation and education
pub use crate::dissociation::{Dissociation, RARE_VALUE};
pub use crate::education::{Demotion, EducationPass, Educator};

// Re-export calibration and evaluation
pub use crate::calibration::{activation_thresholds, activation_tau, percentile_index, Calibration};
pub use crate::evaluation::{roc_curve, RocCurve, ABNORMAL, NORMAL};

// Re-export setup and export helpers
pub use crate::export::{lifetime_rows, lifetime_stats, HistogramRows, LifetimeStats};
pub use crate::setup::{
    critical_windows, random_preference_lists, shuffle_critical_windows, CriticalWindows,
};
