//! Colony — the round driver.
//!
//! The colony owns the agent store and runs phases of rounds over it. Every
//! phase uses the same loop, parameterized by how samples are fed and by a
//! per-round hook:
//!
//! 1. Present the next sample when one is due
//! 2. Shuffle the proposal order, shuffle the assignment, judge proposals
//! 3. Draw dissociations, one per agent id
//! 4. Advance tau of every paired agent
//! 5. Run the hook (education in the learning phase)
//!
//! When the last round ends, every agent's open episode is recorded once.
//!
//! Each phase re-seeds one ChaCha generator from the experiment seed and
//! draws from it strictly in that order, so a phase is reproducible from
//! its seed, parameters and inputs alone. Phases never reset the store;
//! callers decide what carries over (see [`AgentStore::reset_phase_state`]).

use crate::dissociation::Dissociation;
use crate::education::Educator;
use crate::matching::{InteractionTally, Matchmaker};
use cellfrust_core::agents::AgentStore;
use cellfrust_core::error::{CfmError, Result};
use cellfrust_core::ledger::LifetimeHistogram;
use cellfrust_core::params::Params;
use cellfrust_core::signal::{check_sample_shape, present_sample};
use cellfrust_core::types::{Layout, Tick};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// Work done after the fixed steps of every round.
pub trait RoundHook {
    /// Called once per round with the round index. Returns the number of
    /// preference demotions performed.
    fn after_round(&mut self, agents: &mut AgentStore, round: Tick) -> u64;
}

/// A hook that does nothing: phases without learning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEducation;

impl RoundHook for NoEducation {
    fn after_round(&mut self, _agents: &mut AgentStore, _round: Tick) -> u64 {
        0
    }
}

/// Where a phase takes its samples from.
#[derive(Debug, Clone, Copy)]
pub enum SampleFeed<'a> {
    /// One sample for the whole phase.
    Fixed(&'a [f64]),
    /// Samples drawn from `data_set` in `queue` order, each held for
    /// `hold_rounds` rounds. The queue is cycled when exhausted.
    Queue {
        data_set: &'a [Vec<f64>],
        queue: &'a [usize],
        hold_rounds: Tick,
    },
}

impl SampleFeed<'_> {
    /// Check every sample the phase will present before round 0.
    fn validate(&self, layout: &Layout) -> Result<()> {
        match self {
            SampleFeed::Fixed(sample) => check_sample_shape(layout, sample),
            SampleFeed::Queue {
                data_set,
                queue,
                hold_rounds,
            } => {
                if queue.is_empty() {
                    return Err(CfmError::invalid_config("samples queue", 0, "must not be empty"));
                }
                if *hold_rounds == 0 {
                    return Err(CfmError::invalid_config("sample_rounds", 0, "must be at least 1"));
                }
                for &index in queue.iter() {
                    let sample = data_set.get(index).ok_or(CfmError::SampleOutOfRange {
                        index,
                        len: data_set.len(),
                    })?;
                    check_sample_shape(layout, sample)?;
                }
                Ok(())
            }
        }
    }
}

/// Summary of one finished phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: String,
    pub rounds: Tick,
    pub samples_presented: u64,
    /// Accepted proposals per decision rule.
    pub decisions: InteractionTally,
    pub dissociations: u64,
    pub demotions: u64,
    /// Education threshold at the end of a learning phase.
    pub education_threshold: Option<Tick>,
    pub paired_at_end: usize,
}

impl PhaseReport {
    fn new(phase: &str, rounds: Tick) -> Self {
        Self {
            phase: phase.to_string(),
            rounds,
            samples_presented: 0,
            decisions: InteractionTally::default(),
            dissociations: 0,
            demotions: 0,
            education_threshold: None,
            paired_at_end: 0,
        }
    }

    /// Total pairing mutations caused by decision rules.
    pub fn pairings(&self) -> u64 {
        self.decisions.total()
    }
}

/// The population together with its round driver.
pub struct Colony {
    agents: AgentStore,
    params: Params,
    matchmaker: Matchmaker,
    dissociation: Dissociation,
}

impl Colony {
    /// Wrap a store. Fails if the parameters do not validate.
    pub fn new(agents: AgentStore, params: &Params) -> Result<Self> {
        params.validate()?;
        let matchmaker = Matchmaker::new(agents.layout());
        Ok(Self {
            agents,
            params: params.clone(),
            matchmaker,
            dissociation: Dissociation::new(params.dissociation_odds),
        })
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut AgentStore {
        &mut self.agents
    }

    pub fn into_agents(self) -> AgentStore {
        self.agents
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A non-learning run over queued samples (the untrained and trained
    /// runs), `frustration_rounds` long.
    pub fn run_frustration(
        &mut self,
        phase: &str,
        data_set: &[Vec<f64>],
        queue: &[usize],
    ) -> Result<PhaseReport> {
        let feed = SampleFeed::Queue {
            data_set,
            queue,
            hold_rounds: self.params.sample_rounds,
        };
        self.run_phase(phase, self.params.frustration_rounds, feed, &mut NoEducation)
    }

    /// The learning run: queued samples with education, `training_rounds`
    /// long. Detector preference lists are updated in place.
    pub fn run_training(&mut self, data_set: &[Vec<f64>], queue: &[usize]) -> Result<PhaseReport> {
        let feed = SampleFeed::Queue {
            data_set,
            queue,
            hold_rounds: self.params.sample_rounds,
        };
        let mut educator = Educator::new(self.params.training_interval);
        let mut report = self.run_phase("training", self.params.training_rounds, feed, &mut educator)?;
        report.education_threshold = Some(educator.threshold());
        Ok(report)
    }

    /// Monitor one sample for `monitoring_rounds` rounds without learning.
    pub fn run_monitoring(&mut self, sample: &[f64]) -> Result<PhaseReport> {
        self.run_phase(
            "monitoring",
            self.params.monitoring_rounds,
            SampleFeed::Fixed(sample),
            &mut NoEducation,
        )
    }

    /// Detector lifetime histograms after a phase, in detector order.
    pub fn detector_lifetimes(&self) -> Vec<LifetimeHistogram> {
        self.agents.detector_lifetimes().to_vec()
    }

    /// Run `rounds` rounds with the given sample feed and hook.
    pub fn run_phase(
        &mut self,
        phase: &str,
        rounds: Tick,
        feed: SampleFeed<'_>,
        hook: &mut dyn RoundHook,
    ) -> Result<PhaseReport> {
        feed.validate(self.agents.layout())?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        self.matchmaker.reset(self.agents.layout());
        let mut report = PhaseReport::new(phase, rounds);
        let mut next_sample = 0usize;

        if let SampleFeed::Fixed(sample) = feed {
            present_sample(&mut self.agents, sample)?;
            report.samples_presented += 1;
        }

        for round in 0..rounds {
            if let SampleFeed::Queue {
                data_set,
                queue,
                hold_rounds,
            } = feed
            {
                if round % hold_rounds == 0 {
                    let index = queue[next_sample % queue.len()];
                    next_sample += 1;
                    present_sample(&mut self.agents, &data_set[index])?;
                    report.samples_presented += 1;
                }
            }

            let tally = self.matchmaker.interact(&mut self.agents, &mut rng);
            report.decisions.add(&tally);

            report.dissociations += self.dissociation.apply(&mut self.agents, &mut rng);

            self.agents.advance_taus();

            report.demotions += hook.after_round(&mut self.agents, round);
        }

        self.agents.close_episodes();
        report.paired_at_end = self.agents.paired_count();

        info!(
            phase,
            rounds,
            samples = report.samples_presented,
            pairings = report.pairings(),
            dissociations = report.dissociations,
            demotions = report.demotions,
            "phase complete"
        );
        Ok(report)
    }
}
