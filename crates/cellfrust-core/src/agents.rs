//! Agent store — all per-agent state of a population.
//!
//! The store is a set of parallel arrays keyed by [`AgentId`]. It owns no
//! behavior beyond accessors and the single pairing mutation primitive
//! ([`AgentStore::pair`] / [`AgentStore::unpair`]) that every decision rule,
//! dissociation and education funnel through. That primitive guarantees
//! histogram completeness: whenever an agent's partner changes, the episode
//! that just ended is recorded under its duration and tau restarts at zero.
//!
//! State shared across phases (partners, taus, lifetime histograms) is never
//! reset implicitly; callers use the reset operations between phases.

use crate::error::{CfmError, Result};
use crate::ledger::LifetimeHistogram;
use crate::preference::{PreferenceList, Rank};
use crate::types::*;
use serde::Serialize;

/// Per-agent state arrays for one experiment size.
#[derive(Debug, Clone)]
pub struct AgentStore {
    layout: Layout,
    subtype: Vec<Subtype>,
    partner: Vec<Option<AgentId>>,
    /// Presenters: value of the active sample. Detectors: subtype baseline.
    signal: Vec<f64>,
    tau: Vec<Tick>,
    lifetimes: Vec<LifetimeHistogram>,
    preferences: Vec<PreferenceList>,
    /// Indexed by detector offset, then presenter id.
    local_lists: Vec<Vec<PartnerCode>>,
    left_criticals: Vec<Vec<f64>>,
    right_criticals: Vec<Vec<f64>>,
}

/// Serializable summary of one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub role: Role,
    pub subtype: Subtype,
    pub partner: Option<AgentId>,
    pub signal: f64,
    pub tau: Tick,
    pub episodes: u64,
}

impl AgentStore {
    /// Build a population from detector preference rows and critical windows.
    ///
    /// `detector_lists` needs one permutation of `0..2 * n_presenters` per
    /// detector; `left_criticals` / `right_criticals` one row per detector
    /// with one column per feature.
    pub fn new(
        layout: Layout,
        detector_lists: Vec<Vec<Rank>>,
        left_criticals: Vec<Vec<f64>>,
        right_criticals: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n_presenters = layout.n_presenters();
        let n_detectors = layout.n_detectors();
        let n_agents = layout.n_agents();

        check_table("left criticals", &left_criticals, n_detectors, layout.features)?;
        check_table("right criticals", &right_criticals, n_detectors, layout.features)?;

        let mut subtype = Vec::with_capacity(n_agents);
        let mut signal = Vec::with_capacity(n_agents);
        let mut preferences = Vec::with_capacity(n_agents);

        for presenter in layout.presenters() {
            let st = Subtype::for_offset(presenter, n_presenters);
            subtype.push(st);
            signal.push(0.0);
            // Presenters rank detector subtypes, own subtype first.
            preferences.push(match st {
                Subtype::Zero => PreferenceList::identity(2),
                Subtype::One => PreferenceList::reversed(2),
            });
        }
        for detector in layout.detectors() {
            let st = Subtype::for_offset(layout.detector_offset(detector), n_detectors);
            subtype.push(st);
            signal.push(st.index() as f64);
            preferences.push(PreferenceList::identity(layout.detector_list_len()));
        }

        let local_lists = (0..n_detectors)
            .map(|_| {
                layout
                    .presenters()
                    .map(|p| PartnerCode::new(p, false))
                    .collect()
            })
            .collect();

        let mut store = Self {
            layout,
            subtype,
            partner: vec![None; n_agents],
            signal,
            tau: vec![0; n_agents],
            lifetimes: vec![LifetimeHistogram::new(); n_agents],
            preferences,
            local_lists,
            left_criticals,
            right_criticals,
        };
        store.set_detector_preferences(detector_lists)?;
        Ok(store)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn n_agents(&self) -> usize {
        self.layout.n_agents()
    }

    pub fn n_presenters(&self) -> usize {
        self.layout.n_presenters()
    }

    pub fn n_detectors(&self) -> usize {
        self.layout.n_detectors()
    }

    pub fn role(&self, id: AgentId) -> Role {
        self.layout.role(id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        id < self.n_agents()
    }

    pub fn subtype(&self, id: AgentId) -> Subtype {
        self.subtype[id]
    }

    pub fn partner(&self, id: AgentId) -> Option<AgentId> {
        self.partner[id]
    }

    pub fn is_paired(&self, id: AgentId) -> bool {
        self.partner[id].is_some()
    }

    pub fn signal(&self, id: AgentId) -> f64 {
        self.signal[id]
    }

    pub fn tau(&self, id: AgentId) -> Tick {
        self.tau[id]
    }

    pub fn lifetimes(&self, id: AgentId) -> &LifetimeHistogram {
        &self.lifetimes[id]
    }

    /// Lifetime histograms of all detectors, in detector order.
    pub fn detector_lifetimes(&self) -> &[LifetimeHistogram] {
        &self.lifetimes[self.n_presenters()..]
    }

    pub fn all_lifetimes(&self) -> &[LifetimeHistogram] {
        &self.lifetimes
    }

    pub fn preferences(&self, id: AgentId) -> &PreferenceList {
        &self.preferences[id]
    }

    /// How `detector` currently perceives `presenter`.
    pub fn local_code(&self, detector: AgentId, presenter: AgentId) -> PartnerCode {
        self.local_lists[self.layout.detector_offset(detector)][presenter]
    }

    /// Critical window of `detector` for `feature`, as `(left, right)`.
    pub fn critical_window(&self, detector: AgentId, feature: usize) -> (f64, f64) {
        let offset = self.layout.detector_offset(detector);
        (
            self.left_criticals[offset][feature],
            self.right_criticals[offset][feature],
        )
    }

    pub fn snapshot(&self, id: AgentId) -> AgentSnapshot {
        AgentSnapshot {
            id,
            role: self.role(id),
            subtype: self.subtype[id],
            partner: self.partner[id],
            signal: self.signal[id],
            tau: self.tau[id],
            episodes: self.lifetimes[id].total(),
        }
    }

    /// Rank a presenter gives a detector, by the detector's subtype.
    pub fn presenter_rank(&self, presenter: AgentId, detector: AgentId) -> Rank {
        self.preferences[presenter].rank(self.subtype[detector].index())
    }

    /// Rank a detector gives a presenter, by how it currently perceives it.
    pub fn detector_rank(&self, detector: AgentId, presenter: AgentId) -> Rank {
        let code = self.local_code(detector, presenter);
        self.preferences[detector].rank(code.slot())
    }

    /// Whether `detector` sees `presenter`'s signal inside its window.
    pub fn recognizes_as_normal(&self, detector: AgentId, presenter: AgentId) -> bool {
        self.local_code(detector, presenter).recognized_as_normal
    }

    pub(crate) fn set_signal(&mut self, presenter: AgentId, value: f64) {
        debug_assert_eq!(self.role(presenter), Role::Presenter);
        self.signal[presenter] = value;
    }

    pub(crate) fn set_local_code(&mut self, detector: AgentId, code: PartnerCode) {
        let offset = self.layout.detector_offset(detector);
        self.local_lists[offset][code.target] = code;
    }

    /// Pair `a` with `b`, displacing any current partners.
    ///
    /// Every agent whose partner changes (both new members and displaced old
    /// partners) records its pre-change tau and restarts at zero.
    pub fn pair(&mut self, a: AgentId, b: AgentId) {
        self.assert_agent(a);
        self.assert_agent(b);
        debug_assert_ne!(a, b, "agent {a} cannot pair with itself");
        debug_assert_ne!(self.role(a), self.role(b), "pairs join a presenter and a detector");

        if self.partner[a] == Some(b) {
            return;
        }
        if let Some(old) = self.partner[a] {
            self.end_episode(old);
            self.partner[old] = None;
        }
        if let Some(old) = self.partner[b] {
            self.end_episode(old);
            self.partner[old] = None;
        }
        self.end_episode(a);
        self.end_episode(b);
        self.partner[a] = Some(b);
        self.partner[b] = Some(a);
        debug_assert!(self.pair_is_symmetric(a) && self.pair_is_symmetric(b));
    }

    /// Separate `a` from its partner. Returns the former partner, or `None`
    /// if `a` was already unpaired (no mutation then).
    pub fn unpair(&mut self, a: AgentId) -> Option<AgentId> {
        self.assert_agent(a);
        let b = self.partner[a]?;
        debug_assert_eq!(self.partner[b], Some(a), "asymmetric pairing {a} -> {b}");
        self.end_episode(a);
        self.end_episode(b);
        self.partner[a] = None;
        self.partner[b] = None;
        Some(b)
    }

    fn end_episode(&mut self, id: AgentId) {
        self.lifetimes[id].record(self.tau[id]);
        self.tau[id] = 0;
    }

    fn pair_is_symmetric(&self, id: AgentId) -> bool {
        match self.partner[id] {
            Some(p) => p != id && self.partner[p] == Some(id),
            None => true,
        }
    }

    fn assert_agent(&self, id: AgentId) {
        assert!(
            self.contains(id),
            "{}",
            CfmError::AgentOutOfRange {
                agent: id,
                population: self.n_agents(),
            }
        );
    }

    /// Add one round to the tau of every paired agent.
    pub fn advance_taus(&mut self) {
        for (tau, partner) in self.tau.iter_mut().zip(&self.partner) {
            if partner.is_some() {
                *tau += 1;
            }
        }
    }

    /// Record every agent's current tau as an episode without ending it.
    /// Called once when a phase finishes so open episodes are counted.
    pub fn close_episodes(&mut self) {
        for (histogram, &tau) in self.lifetimes.iter_mut().zip(&self.tau) {
            histogram.record(tau);
        }
    }

    /// Demote a slot of a detector's preference list to the worst rank.
    /// Returns the slot's previous rank.
    pub fn demote(&mut self, detector: AgentId, slot: usize) -> Rank {
        debug_assert_eq!(self.role(detector), Role::Detector);
        self.preferences[detector].demote(slot)
    }

    /// Replace every detector's preference list (e.g. with trained lists).
    pub fn set_detector_preferences(&mut self, rows: Vec<Vec<Rank>>) -> Result<()> {
        let expected_len = self.layout.detector_list_len();
        if rows.len() != self.n_detectors() {
            return Err(CfmError::table_rows("preference lists", rows.len(), self.n_detectors()));
        }
        let n_presenters = self.n_presenters();
        let mut lists = Vec::with_capacity(rows.len());
        for (row, ranks) in rows.into_iter().enumerate() {
            if ranks.len() != expected_len {
                return Err(CfmError::table_columns(
                    "preference lists",
                    row,
                    ranks.len(),
                    expected_len,
                ));
            }
            let list = PreferenceList::from_ranks(ranks).ok_or(CfmError::InvalidPermutation {
                agent: n_presenters + row,
                len: expected_len,
            })?;
            lists.push(list);
        }
        for (detector, list) in self.layout.detectors().zip(lists) {
            self.preferences[detector] = list;
        }
        Ok(())
    }

    /// Current detector preference lists as raw rows, in detector order.
    pub fn detector_preference_rows(&self) -> Vec<Vec<Rank>> {
        self.layout
            .detectors()
            .map(|d| self.preferences[d].ranks().to_vec())
            .collect()
    }

    /// Unpair every agent without recording anything.
    pub fn reset_matches(&mut self) {
        self.partner.iter_mut().for_each(|p| *p = None);
    }

    pub fn reset_taus(&mut self) {
        self.tau.iter_mut().for_each(|t| *t = 0);
    }

    pub fn clear_lifetimes(&mut self) {
        self.lifetimes.iter_mut().for_each(LifetimeHistogram::clear);
    }

    /// All three resets: the state a fresh phase starts from.
    pub fn reset_phase_state(&mut self) {
        self.reset_matches();
        self.reset_taus();
        self.clear_lifetimes();
    }

    /// Whether every pairing is mutual and no agent is paired with itself.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n_agents()).all(|id| self.pair_is_symmetric(id))
    }

    pub fn paired_count(&self) -> usize {
        self.partner.iter().filter(|p| p.is_some()).count()
    }
}

fn check_table(name: &str, rows: &[Vec<f64>], n_rows: usize, n_columns: usize) -> Result<()> {
    if rows.len() != n_rows {
        return Err(CfmError::table_rows(name, rows.len(), n_rows));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_columns {
            return Err(CfmError::table_columns(name, i, row.len(), n_columns));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AgentStore {
        let layout = Layout::new(1, 4).unwrap();
        let lists = (0..4).map(|_| (0..8).collect()).collect();
        let windows = vec![vec![0.0]; 4];
        let rights = vec![vec![1.0]; 4];
        AgentStore::new(layout, lists, windows, rights).unwrap()
    }

    #[test]
    fn subtypes_and_baselines() {
        let s = store();
        assert_eq!(s.subtype(0), Subtype::Zero);
        assert_eq!(s.subtype(2), Subtype::One);
        assert_eq!(s.subtype(4), Subtype::Zero);
        assert_eq!(s.subtype(7), Subtype::One);
        assert_eq!(s.signal(7), 1.0);
        assert_eq!(s.preferences(0).ranks(), &[0, 1]);
        assert_eq!(s.preferences(3).ranks(), &[1, 0]);
        assert_eq!(s.presenter_rank(0, 4), 0);
        assert_eq!(s.presenter_rank(0, 7), 1);
    }

    #[test]
    fn pair_records_every_changed_agent() {
        let mut s = store();
        s.pair(0, 4);
        s.advance_taus();
        s.advance_taus();
        s.pair(1, 5);
        s.advance_taus();

        // Presenter 1 steals detector 4; presenter 0 is displaced after 3 rounds.
        s.pair(1, 4);
        assert_eq!(s.partner(1), Some(4));
        assert_eq!(s.partner(4), Some(1));
        assert_eq!(s.partner(0), None);
        assert_eq!(s.partner(5), None);
        assert_eq!(s.lifetimes(0).count(3), 1);
        assert_eq!(s.lifetimes(4).count(3), 1);
        assert_eq!(s.lifetimes(1).count(1), 1);
        assert_eq!(s.lifetimes(5).count(1), 1);
        assert_eq!(s.tau(4), 0);
        assert!(s.is_symmetric());
    }

    #[test]
    fn unpair_is_a_no_op_when_unpaired() {
        let mut s = store();
        assert_eq!(s.unpair(2), None);
        assert!(s.lifetimes(2).is_empty());
    }

    #[test]
    fn resets_are_idempotent() {
        let mut s = store();
        s.pair(0, 4);
        s.advance_taus();
        s.close_episodes();
        s.reset_phase_state();
        s.reset_phase_state();
        assert_eq!(s.paired_count(), 0);
        assert!(s.all_lifetimes().iter().all(LifetimeHistogram::is_empty));
        assert_eq!(s.tau(0), 0);
    }

    #[test]
    fn rejects_malformed_preference_rows() {
        let layout = Layout::new(1, 2).unwrap();
        let windows = vec![vec![0.0]; 2];
        let err = AgentStore::new(
            layout,
            vec![vec![0, 1, 2, 3], vec![0, 1, 2, 2]],
            windows.clone(),
            windows.clone(),
        )
        .unwrap_err();
        assert_eq!(err, CfmError::InvalidPermutation { agent: 3, len: 4 });

        let err = AgentStore::new(layout, vec![vec![0, 1, 2]], windows.clone(), windows).unwrap_err();
        assert!(matches!(err, CfmError::TableRows { .. }));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn pairing_unknown_agent_panics() {
        let mut s = store();
        s.pair(0, 42);
    }
}
