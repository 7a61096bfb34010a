//! Shared types used across the agent store and the runtime.

use crate::error::{CfmError, Result};
use serde::{Deserialize, Serialize};

/// Index of an agent in the population. Presenters occupy
/// `0..n_presenters`, detectors `n_presenters..n_agents`.
pub type AgentId = usize;

/// Simulation round counter, also used for pairing durations (tau).
pub type Tick = u64;

/// The two agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Displays a classification signal taken from the active sample.
    Presenter,
    /// Classifies presenters and accumulates pairing statistics.
    Detector,
}

/// Cohort within a role. Each role is split into two halves with mirrored
/// preference and signal setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtype {
    Zero,
    One,
}

impl Subtype {
    pub fn index(self) -> usize {
        match self {
            Subtype::Zero => 0,
            Subtype::One => 1,
        }
    }

    /// Subtype of the `offset`-th member of a role with `count` members:
    /// the first half is `Zero`, the rest `One`.
    pub fn for_offset(offset: usize, count: usize) -> Self {
        if offset < count / 2 {
            Subtype::Zero
        } else {
            Subtype::One
        }
    }
}

/// How a detector perceives one presenter: the presenter it refers to and
/// whether the presenter's signal sits inside the detector's window.
///
/// Each code maps to a slot in the detector's preference list: presenter
/// `j` seen as normal is slot `2j`, seen as abnormal is slot `2j + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerCode {
    pub target: AgentId,
    pub recognized_as_normal: bool,
}

impl PartnerCode {
    pub fn new(target: AgentId, recognized_as_normal: bool) -> Self {
        Self {
            target,
            recognized_as_normal,
        }
    }

    /// Slot of this code in a detector's preference list.
    pub fn slot(&self) -> usize {
        2 * self.target + usize::from(!self.recognized_as_normal)
    }

    /// Inverse of [`PartnerCode::slot`].
    pub fn from_slot(slot: usize) -> Self {
        Self {
            target: slot / 2,
            recognized_as_normal: slot % 2 == 0,
        }
    }
}

/// Population dimensions derived from the feature count and the number of
/// presenter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub features: usize,
    pub presenter_sets: usize,
}

impl Layout {
    pub fn new(features: usize, presenter_sets: usize) -> Result<Self> {
        if features == 0 {
            return Err(CfmError::invalid_config("features", features, "must be at least 1"));
        }
        if presenter_sets == 0 {
            return Err(CfmError::invalid_config(
                "presenter_sets",
                presenter_sets,
                "must be at least 1",
            ));
        }
        Ok(Self {
            features,
            presenter_sets,
        })
    }

    pub fn n_presenters(&self) -> usize {
        self.features * self.presenter_sets
    }

    pub fn n_detectors(&self) -> usize {
        self.n_presenters()
    }

    pub fn n_agents(&self) -> usize {
        self.n_presenters() + self.n_detectors()
    }

    /// Length of a detector's preference list (two codes per presenter).
    pub fn detector_list_len(&self) -> usize {
        2 * self.n_presenters()
    }

    pub fn role(&self, id: AgentId) -> Role {
        if id < self.n_presenters() {
            Role::Presenter
        } else {
            Role::Detector
        }
    }

    /// Ids of all presenters.
    pub fn presenters(&self) -> std::ops::Range<AgentId> {
        0..self.n_presenters()
    }

    /// Ids of all detectors.
    pub fn detectors(&self) -> std::ops::Range<AgentId> {
        self.n_presenters()..self.n_agents()
    }

    /// Feature shown by a presenter; features cycle across presenter sets.
    pub fn feature_of(&self, presenter: AgentId) -> usize {
        presenter % self.features
    }

    /// Position of a detector among detectors (row in per-detector tables).
    pub fn detector_offset(&self, detector: AgentId) -> usize {
        detector - self.n_presenters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_code_slots_are_even_for_normal() {
        assert_eq!(PartnerCode::new(3, true).slot(), 6);
        assert_eq!(PartnerCode::new(3, false).slot(), 7);
        assert_eq!(PartnerCode::from_slot(7), PartnerCode::new(3, false));
        assert_eq!(PartnerCode::from_slot(0), PartnerCode::new(0, true));
    }

    #[test]
    fn layout_counts() {
        let layout = Layout::new(2, 3).unwrap();
        assert_eq!(layout.n_presenters(), 6);
        assert_eq!(layout.n_agents(), 12);
        assert_eq!(layout.detector_list_len(), 12);
        assert_eq!(layout.role(5), Role::Presenter);
        assert_eq!(layout.role(6), Role::Detector);
        assert_eq!(layout.feature_of(5), 1);
        assert_eq!(layout.detector_offset(8), 2);
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert!(Layout::new(0, 2).is_err());
        assert!(Layout::new(2, 0).is_err());
    }

    #[test]
    fn subtypes_split_roles_in_half() {
        assert_eq!(Subtype::for_offset(0, 4), Subtype::Zero);
        assert_eq!(Subtype::for_offset(1, 4), Subtype::Zero);
        assert_eq!(Subtype::for_offset(2, 4), Subtype::One);
        assert_eq!(Subtype::for_offset(3, 4), Subtype::One);
    }
}
