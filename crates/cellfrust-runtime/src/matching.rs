//! Matching engine — randomized pairing with frustrated tie-breaks.
//!
//! Every round each presenter proposes to exactly one detector. The
//! proposal order and the presenter → detector assignment are two
//! independent shuffles. Proposals are then judged in order by six decision
//! rules, a frustration-driven variant of stable matching: preference ranks
//! decide first, and ties are broken by how well the detectors involved
//! recognize the presenter's signal.

use cellfrust_core::agents::AgentStore;
use cellfrust_core::types::{AgentId, Layout};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Which rule accepted a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    /// Rule 1: both unpaired.
    BothUnpaired,
    /// Rule 2: the detector ranks the presenter above its current partner.
    DetectorPrefers,
    /// Rule 3: the presenter ranks the detector above its current partner.
    PresenterPrefers,
    /// Rule 4: presenter-side rank tie, broken because the new detector sees
    /// the presenter as normal and the current one does not.
    PresenterTieBreak,
    /// Rule 5: both paired, both strictly prefer each other.
    MutualPreference,
    /// Rule 6: both paired, presenter-side rank tie, broken by recognition.
    RecognitionTieBreak,
}

impl Decision {
    pub const ALL: [Decision; 6] = [
        Decision::BothUnpaired,
        Decision::DetectorPrefers,
        Decision::PresenterPrefers,
        Decision::PresenterTieBreak,
        Decision::MutualPreference,
        Decision::RecognitionTieBreak,
    ];

    /// Rule number, 1-6.
    pub fn rule(self) -> usize {
        match self {
            Decision::BothUnpaired => 1,
            Decision::DetectorPrefers => 2,
            Decision::PresenterPrefers => 3,
            Decision::PresenterTieBreak => 4,
            Decision::MutualPreference => 5,
            Decision::RecognitionTieBreak => 6,
        }
    }
}

/// Judge a proposal from `presenter` to `detector`. `None` means no rule
/// applies and nothing changes.
pub fn decide(agents: &AgentStore, presenter: AgentId, detector: AgentId) -> Option<Decision> {
    match (agents.partner(presenter), agents.partner(detector)) {
        (None, None) => Some(Decision::BothUnpaired),

        (None, Some(rival)) => {
            let prefers = agents.detector_rank(detector, presenter) < agents.detector_rank(detector, rival);
            prefers.then_some(Decision::DetectorPrefers)
        }

        (Some(current), None) => {
            let offered = agents.presenter_rank(presenter, detector);
            let held = agents.presenter_rank(presenter, current);
            if offered < held {
                Some(Decision::PresenterPrefers)
            } else if offered == held
                && agents.recognizes_as_normal(detector, presenter)
                && !agents.recognizes_as_normal(current, presenter)
            {
                Some(Decision::PresenterTieBreak)
            } else {
                None
            }
        }

        (Some(current), Some(rival)) => {
            if current == detector {
                return None;
            }
            let detector_prefers =
                agents.detector_rank(detector, presenter) < agents.detector_rank(detector, rival);
            let offered = agents.presenter_rank(presenter, detector);
            let held = agents.presenter_rank(presenter, current);

            if detector_prefers && offered < held {
                Some(Decision::MutualPreference)
            } else if offered == held
                && agents.recognizes_as_normal(detector, presenter)
                && !agents.recognizes_as_normal(detector, rival)
                && !agents.recognizes_as_normal(current, presenter)
            {
                Some(Decision::RecognitionTieBreak)
            } else {
                None
            }
        }
    }
}

/// Accepted proposals per rule over some number of rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionTally {
    /// Index `r - 1` counts rule `r`.
    pub per_rule: [u64; 6],
}

impl InteractionTally {
    pub fn record(&mut self, decision: Decision) {
        self.per_rule[decision.rule() - 1] += 1;
    }

    pub fn count(&self, decision: Decision) -> u64 {
        self.per_rule[decision.rule() - 1]
    }

    /// Total accepted proposals (pairing mutations).
    pub fn total(&self) -> u64 {
        self.per_rule.iter().sum()
    }

    pub fn add(&mut self, other: &InteractionTally) {
        for (mine, theirs) in self.per_rule.iter_mut().zip(other.per_rule) {
            *mine += theirs;
        }
    }
}

/// The shuffled proposal order and presenter → detector assignment.
///
/// Both buffers persist across rounds and are reshuffled in place, so the
/// random stream depends only on the seed and the round count.
#[derive(Debug, Clone)]
pub struct Matchmaker {
    /// Presenter ids in proposal order.
    order: Vec<AgentId>,
    /// Indexed by presenter id: the detector it proposes to.
    assignment: Vec<AgentId>,
}

impl Matchmaker {
    pub fn new(layout: &Layout) -> Self {
        Self {
            order: layout.presenters().collect(),
            assignment: layout.detectors().collect(),
        }
    }

    /// Restore both buffers to identity order.
    pub fn reset(&mut self, layout: &Layout) {
        *self = Self::new(layout);
    }

    /// Run one round of proposals: shuffle the order, shuffle the
    /// assignment, then judge every proposal in order.
    pub fn interact<R: Rng + ?Sized>(&mut self, agents: &mut AgentStore, rng: &mut R) -> InteractionTally {
        self.order.shuffle(rng);
        self.assignment.shuffle(rng);

        let mut tally = InteractionTally::default();
        for &presenter in &self.order {
            let detector = self.assignment[presenter];
            if let Some(decision) = decide(agents, presenter, detector) {
                agents.pair(presenter, detector);
                tally.record(decision);
            }
        }
        debug_assert!(agents.is_symmetric());
        tally
    }

    pub fn order(&self) -> &[AgentId] {
        &self.order
    }

    pub fn assignment(&self) -> &[AgentId] {
        &self.assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfrust_core::signal::present_sample;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// One feature, two presenter sets: presenters 0 (subtype 0) and 1
    /// (subtype 1), detectors 2 (subtype 0) and 3 (subtype 1). Detector 2
    /// has window (0, 1), detector 3 window (5, 6).
    fn store(lists: Vec<Vec<u32>>) -> AgentStore {
        let layout = Layout::new(1, 2).unwrap();
        AgentStore::new(layout, lists, vec![vec![0.0], vec![5.0]], vec![vec![1.0], vec![6.0]]).unwrap()
    }

    fn identity_store() -> AgentStore {
        store(vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3]])
    }

    #[test]
    fn rule_one_pairs_unpaired_agents() {
        let s = identity_store();
        assert_eq!(decide(&s, 0, 3), Some(Decision::BothUnpaired));
    }

    #[test]
    fn rule_two_follows_detector_ranks() {
        // Detector 2 ranks presenter 1 (as abnormal, slot 3) above presenter 0
        // (as abnormal, slot 1).
        let mut s = store(vec![vec![3, 2, 1, 0], vec![0, 1, 2, 3]]);
        s.pair(0, 2);
        assert_eq!(decide(&s, 1, 2), Some(Decision::DetectorPrefers));

        let mut s = identity_store();
        s.pair(1, 2);
        assert_eq!(decide(&s, 0, 2), Some(Decision::DetectorPrefers));
        s.pair(0, 2);
        assert_eq!(decide(&s, 1, 2), None);
    }

    #[test]
    fn rule_three_follows_presenter_ranks() {
        let mut s = identity_store();
        // Presenter 0 (subtype 0) holds detector 3 (subtype 1), prefers 2.
        s.pair(0, 3);
        assert_eq!(decide(&s, 0, 2), Some(Decision::PresenterPrefers));

        // Presenter 1 (subtype 1) holds detector 3 (subtype 1): no upgrade.
        let mut s = identity_store();
        s.pair(1, 3);
        assert_eq!(decide(&s, 1, 2), None);
    }

    #[test]
    fn rule_four_breaks_ties_by_recognition() {
        // Four presenter sets of one feature: four presenters and four
        // detectors so a presenter can hold a same-subtype detector while
        // being offered another same-subtype one.
        let layout = Layout::new(1, 4).unwrap();
        let lists = vec![(0..8).collect(); 4];
        let left = vec![vec![0.0], vec![5.0], vec![0.0], vec![0.0]];
        let right = vec![vec![1.0], vec![6.0], vec![1.0], vec![1.0]];
        let mut s = AgentStore::new(layout, lists, left, right).unwrap();
        present_sample(&mut s, &[0.5]).unwrap();

        // Detectors 4 and 5 are subtype 0. Presenter 0 holds detector 5,
        // which sees 0.5 as abnormal; detector 4 sees it as normal.
        s.pair(0, 5);
        assert_eq!(decide(&s, 0, 4), Some(Decision::PresenterTieBreak));

        // Reverse: holding the recognizing detector, no switch.
        let mut s2 = s.clone();
        s2.pair(0, 4);
        assert_eq!(decide(&s2, 0, 5), None);
    }

    #[test]
    fn rule_five_needs_mutual_strict_preference() {
        let mut s = identity_store();
        // Presenter 0 holds detector 3 (worse subtype); detector 2 holds
        // presenter 1, which it ranks below presenter 0 (slot 3 vs slot 1).
        s.pair(0, 3);
        s.pair(1, 2);
        assert_eq!(decide(&s, 0, 2), Some(Decision::MutualPreference));

        // Presenter 1 would downgrade from its own-subtype detector 3.
        let mut s = identity_store();
        s.pair(1, 3);
        s.pair(0, 2);
        assert_eq!(decide(&s, 1, 2), None);
    }

    #[test]
    fn rule_six_breaks_paired_ties_by_recognition() {
        let layout = Layout::new(1, 4).unwrap();
        // Detector 4 strongly prefers presenter 2's abnormal slot (5) so rule
        // five cannot fire for presenter 0.
        let top = vec![1, 2, 3, 4, 5, 0, 6, 7];
        let lists = vec![top, (0..8).collect(), (0..8).collect(), (0..8).collect()];
        let left = vec![vec![0.0], vec![5.0], vec![0.0], vec![0.0]];
        let right = vec![vec![1.0], vec![6.0], vec![1.0], vec![1.0]];
        let mut s = AgentStore::new(layout, lists, left, right).unwrap();
        // Presenters 0,1 show 0.5 (normal for detectors 4,6,7); presenter 2
        // shows 9.0 (abnormal for everyone).
        present_sample(&mut s, &[0.5, 0.5, 9.0, 0.5]).unwrap();

        s.pair(0, 5); // detector 5 sees presenter 0 as abnormal
        s.pair(2, 4); // detector 4 sees presenter 2 as abnormal
        assert_eq!(decide(&s, 0, 4), Some(Decision::RecognitionTieBreak));
    }

    #[test]
    fn proposal_to_current_partner_is_ignored() {
        let mut s = identity_store();
        s.pair(0, 2);
        assert_eq!(decide(&s, 0, 2), None);
    }

    #[test]
    fn first_round_pairs_everyone() {
        let mut s = identity_store();
        let mut matchmaker = Matchmaker::new(s.layout());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tally = matchmaker.interact(&mut s, &mut rng);
        assert_eq!(tally.count(Decision::BothUnpaired), 2);
        assert_eq!(s.paired_count(), 4);
        assert!(s.is_symmetric());
    }

    #[test]
    fn tally_adds_per_rule() {
        let mut a = InteractionTally::default();
        a.record(Decision::BothUnpaired);
        a.record(Decision::RecognitionTieBreak);
        let mut b = InteractionTally::default();
        b.record(Decision::RecognitionTieBreak);
        a.add(&b);
        assert_eq!(a.count(Decision::RecognitionTieBreak), 2);
        assert_eq!(a.total(), 3);
    }
}
