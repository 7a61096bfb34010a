//! Education — demoting the signals detectors latch onto.
//!
//! Every `interval` rounds, each detector whose current pairing has lasted
//! longer than the education threshold demotes the slot of its partner (as
//! it currently perceives it) to the worst rank, and the pair is broken.
//! When a pass trains nobody, the threshold rises to the longest tau seen,
//! so education gets harder to trigger as the population settles.
//!
//! Biological analog: thymic education. Detectors that bind persistently to
//! what they are shown during training learn to ignore it.

use crate::colony::RoundHook;
use cellfrust_core::agents::AgentStore;
use cellfrust_core::preference::Rank;
use cellfrust_core::types::{AgentId, Tick};
use serde::Serialize;
use tracing::debug;

/// One demotion performed by an education pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Demotion {
    pub detector: AgentId,
    pub presenter: AgentId,
    /// Preference slot that was demoted.
    pub slot: usize,
    /// Rank the slot held before demotion.
    pub previous_rank: Rank,
    /// Tau of the broken pairing.
    pub tau: Tick,
}

/// Outcome of one education pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationPass {
    pub round: Tick,
    /// Longest tau among all detectors before the pass.
    pub max_tau: Tick,
    pub demotions: Vec<Demotion>,
    /// Threshold after the pass.
    pub threshold: Tick,
}

/// Periodic detector education with an adaptive threshold.
#[derive(Debug, Clone)]
pub struct Educator {
    interval: Tick,
    threshold: Tick,
    passes: u64,
    demotions: u64,
}

impl Educator {
    /// The threshold starts at the interval.
    pub fn new(interval: Tick) -> Self {
        assert!(interval > 0, "education interval must be at least 1");
        Self {
            interval,
            threshold: interval,
            passes: 0,
            demotions: 0,
        }
    }

    pub fn threshold(&self) -> Tick {
        self.threshold
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn demotions(&self) -> u64 {
        self.demotions
    }

    /// Education runs on every positive multiple of the interval.
    pub fn is_due(&self, round: Tick) -> bool {
        round > 0 && round % self.interval == 0
    }

    /// Run one education pass over all detectors.
    pub fn educate(&mut self, agents: &mut AgentStore, round: Tick) -> EducationPass {
        let layout = *agents.layout();
        let mut max_tau = 0;
        let mut demotions = Vec::new();

        for detector in layout.detectors() {
            let tau = agents.tau(detector);
            max_tau = max_tau.max(tau);
            if tau <= self.threshold {
                continue;
            }
            // Tau only grows while paired and restarts on every partner change.
            let Some(presenter) = agents.partner(detector) else {
                debug_assert!(false, "detector {detector} has tau {tau} but no partner");
                continue;
            };
            let slot = agents.local_code(detector, presenter).slot();
            let previous_rank = agents.demote(detector, slot);
            agents.unpair(detector);
            demotions.push(Demotion {
                detector,
                presenter,
                slot,
                previous_rank,
                tau,
            });
        }

        if demotions.is_empty() {
            self.threshold = max_tau;
        }
        self.passes += 1;
        self.demotions += demotions.len() as u64;

        debug!(
            round,
            max_tau,
            demoted = demotions.len(),
            threshold = self.threshold,
            "education pass"
        );

        EducationPass {
            round,
            max_tau,
            demotions,
            threshold: self.threshold,
        }
    }
}

impl RoundHook for Educator {
    fn after_round(&mut self, agents: &mut AgentStore, round: Tick) -> u64 {
        if self.is_due(round) {
            self.educate(agents, round).demotions.len() as u64
        } else {
            0
        }
    }
}
