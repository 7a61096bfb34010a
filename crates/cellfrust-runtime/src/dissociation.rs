//! Dissociation — rare forced unpairing.
//!
//! Once per round every agent draws a uniform integer from `0..odds`; on the
//! rare value the agent and its partner are separated. Without this the
//! matching can freeze into one stable configuration and taus grow without
//! bound.

use cellfrust_core::agents::AgentStore;
use rand::Rng;
use tracing::trace;

/// The draw that forces an agent apart.
pub const RARE_VALUE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dissociation {
    odds: u32,
}

impl Dissociation {
    /// `odds` is the size of the draw range; one draw in `odds` dissociates.
    pub fn new(odds: u32) -> Self {
        assert!(odds > 0, "dissociation odds must be at least 1");
        Self { odds }
    }

    pub fn odds(&self) -> u32 {
        self.odds
    }

    /// Draw once per agent id in ascending order and unpair on the rare
    /// value. Every agent draws, paired or not, so the random stream does
    /// not depend on the pairing state. Returns the number of pairs broken.
    pub fn apply<R: Rng + ?Sized>(&self, agents: &mut AgentStore, rng: &mut R) -> u64 {
        let mut broken = 0;
        for id in 0..agents.n_agents() {
            let draw = rng.gen_range(0..self.odds);
            if draw == RARE_VALUE && agents.unpair(id).is_some() {
                broken += 1;
            }
        }
        if broken > 0 {
            trace!(broken, "dissociated pairs");
        }
        broken
    }
}
