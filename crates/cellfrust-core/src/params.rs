//! Experiment parameters.
//!
//! One immutable struct built once (from a config file or in code) and
//! passed by reference into every phase.

use crate::error::{CfmError, Result};
use crate::types::Tick;
use serde::{Deserialize, Serialize};

/// Tunable parameters of a cellular frustration experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Seed for the per-phase random generator.
    #[serde(default)]
    pub seed: u64,
    /// Number of presenter sets; each set has one presenter per feature.
    #[serde(default = "default_presenter_sets")]
    pub presenter_sets: usize,
    /// Rounds a training sample stays active before the next is drawn.
    #[serde(default = "default_sample_rounds")]
    pub sample_rounds: Tick,
    /// Rounds of the untrained and trained (non-learning) runs.
    #[serde(default = "default_frustration_rounds")]
    pub frustration_rounds: Tick,
    /// Rounds of the learning run.
    #[serde(default = "default_training_rounds")]
    pub training_rounds: Tick,
    /// Rounds spent monitoring each calibration or test sample.
    #[serde(default = "default_monitoring_rounds")]
    pub monitoring_rounds: Tick,
    /// Education runs every this many rounds; also the initial threshold.
    #[serde(default = "default_training_interval")]
    pub training_interval: Tick,
    /// Percentile (0-100) of the descending calibration counts used as a
    /// detector's activation threshold.
    #[serde(default = "default_calibration_percentile")]
    pub calibration_percentile: u32,
    /// Run the untrained/training/trained phases.
    #[serde(default = "default_true")]
    pub train: bool,
    /// Run calibration and monitoring.
    #[serde(default = "default_true")]
    pub monitor: bool,
    /// Size of the range each dissociation draw is taken from; one value in
    /// this range forces the agent apart.
    #[serde(default = "default_dissociation_odds")]
    pub dissociation_odds: u32,
    /// Upper bound of the out-of-window fraction used when generating
    /// critical windows.
    #[serde(default = "default_max_nu")]
    pub max_nu: f64,
}

fn default_presenter_sets() -> usize { 1 }
fn default_sample_rounds() -> Tick { 10 }
fn default_frustration_rounds() -> Tick { 10_000 }
fn default_training_rounds() -> Tick { 10_000 }
fn default_monitoring_rounds() -> Tick { 1_000 }
fn default_training_interval() -> Tick { 10 }
fn default_calibration_percentile() -> u32 { 5 }
fn default_true() -> bool { true }
fn default_dissociation_odds() -> u32 { 10_000 }
fn default_max_nu() -> f64 { 0.1 }

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: 0,
            presenter_sets: default_presenter_sets(),
            sample_rounds: default_sample_rounds(),
            frustration_rounds: default_frustration_rounds(),
            training_rounds: default_training_rounds(),
            monitoring_rounds: default_monitoring_rounds(),
            training_interval: default_training_interval(),
            calibration_percentile: default_calibration_percentile(),
            train: true,
            monitor: true,
            dissociation_odds: default_dissociation_odds(),
            max_nu: default_max_nu(),
        }
    }
}

impl Params {
    /// Reject values that would divide by zero or make a phase meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.presenter_sets == 0 {
            return Err(CfmError::invalid_config(
                "presenter_sets",
                self.presenter_sets,
                "must be at least 1",
            ));
        }
        if self.sample_rounds == 0 {
            return Err(CfmError::invalid_config(
                "sample_rounds",
                self.sample_rounds,
                "must be at least 1",
            ));
        }
        if self.training_interval == 0 {
            return Err(CfmError::invalid_config(
                "training_interval",
                self.training_interval,
                "must be at least 1",
            ));
        }
        if self.calibration_percentile > 100 {
            return Err(CfmError::invalid_config(
                "calibration_percentile",
                self.calibration_percentile,
                "must be 0-100",
            ));
        }
        if self.dissociation_odds == 0 {
            return Err(CfmError::invalid_config(
                "dissociation_odds",
                self.dissociation_odds,
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_nu) {
            return Err(CfmError::invalid_config("max_nu", self.max_nu, "must be 0.0-1.0"));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_presenter_sets(mut self, sets: usize) -> Self {
        self.presenter_sets = sets;
        self
    }

    pub fn with_dissociation_odds(mut self, odds: u32) -> Self {
        self.dissociation_odds = odds;
        self
    }

    pub fn with_training_interval(mut self, interval: Tick) -> Self {
        self.training_interval = interval;
        self
    }

    pub fn with_sample_rounds(mut self, rounds: Tick) -> Self {
        self.sample_rounds = rounds;
        self
    }

    pub fn with_monitoring_rounds(mut self, rounds: Tick) -> Self {
        self.monitoring_rounds = rounds;
        self
    }

    pub fn with_training_rounds(mut self, rounds: Tick) -> Self {
        self.training_rounds = rounds;
        self
    }

    pub fn with_frustration_rounds(mut self, rounds: Tick) -> Self {
        self.frustration_rounds = rounds;
        self
    }

    pub fn with_calibration_percentile(mut self, percentile: u32) -> Self {
        self.calibration_percentile = percentile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let params: Params = serde_json::from_str(r#"{"seed": 7, "train": false}"#).unwrap();
        assert_eq!(params.seed, 7);
        assert!(!params.train);
        assert!(params.monitor);
        assert_eq!(params.dissociation_odds, 10_000);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let params = Params::default().with_calibration_percentile(101);
        assert!(matches!(
            params.validate(),
            Err(CfmError::InvalidConfig { ref field, .. }) if field == "calibration_percentile"
        ));
        assert!(Params::default().with_training_interval(0).validate().is_err());
        assert!(Params::default().with_dissociation_odds(0).validate().is_err());
    }
}
