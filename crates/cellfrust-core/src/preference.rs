//! Preference lists — an agent's ranking over perceived partner types.
//!
//! A list maps a slot (an encoded partner type) to a rank, lower being more
//! preferred. The ranks are always a permutation of `0..len`; demotion
//! shifts the displaced ranks instead of duplicating one.

use serde::{Deserialize, Serialize};

/// Rank of a slot in a preference list. Lower is better.
pub type Rank = u32;

/// A validated slot → rank permutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceList {
    ranks: Vec<Rank>,
}

impl PreferenceList {
    /// Build a list from raw ranks, or `None` if they are not a
    /// permutation of `0..ranks.len()`.
    pub fn from_ranks(ranks: Vec<Rank>) -> Option<Self> {
        let mut seen = vec![false; ranks.len()];
        for &rank in &ranks {
            let slot = seen.get_mut(rank as usize)?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Self { ranks })
    }

    /// The identity ranking: slot `i` has rank `i`.
    pub fn identity(len: usize) -> Self {
        Self {
            ranks: (0..len as Rank).collect(),
        }
    }

    /// The reversed ranking: slot `i` has rank `len - 1 - i`.
    pub fn reversed(len: usize) -> Self {
        Self {
            ranks: (0..len as Rank).rev().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Rank of a slot. Slots come from the owning store's layout, so an
    /// out-of-range slot is a logic error and panics.
    pub fn rank(&self, slot: usize) -> Rank {
        self.ranks[slot]
    }

    /// Worst possible rank in this list.
    pub fn worst_rank(&self) -> Rank {
        self.ranks.len().saturating_sub(1) as Rank
    }

    /// Move `slot` to the worst rank. Every rank between the old and the
    /// new position moves up by one, so the list stays a permutation.
    ///
    /// Returns the rank the slot held before demotion.
    pub fn demote(&mut self, slot: usize) -> Rank {
        let old_rank = self.ranks[slot];
        let new_rank = self.worst_rank();
        for rank in self.ranks.iter_mut() {
            if *rank > old_rank && *rank <= new_rank {
                *rank -= 1;
            }
        }
        self.ranks[slot] = new_rank;
        old_rank
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Whether the ranks are still a permutation of `0..len`.
    pub fn is_permutation(&self) -> bool {
        Self::from_ranks(self.ranks.clone()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_duplicates_and_gaps() {
        assert!(PreferenceList::from_ranks(vec![0, 1, 1]).is_none());
        assert!(PreferenceList::from_ranks(vec![0, 1, 3]).is_none());
        assert!(PreferenceList::from_ranks(vec![2, 0, 1]).is_some());
    }

    #[test]
    fn demote_shifts_intervening_ranks() {
        let mut list = PreferenceList::from_ranks(vec![3, 0, 2, 1, 4]).unwrap();
        let old = list.demote(1);
        assert_eq!(old, 0);
        assert_eq!(list.ranks(), &[2, 4, 1, 0, 3]);
        assert!(list.is_permutation());
    }

    #[test]
    fn demoting_the_worst_slot_is_a_no_op() {
        let mut list = PreferenceList::from_ranks(vec![1, 2, 0]).unwrap();
        list.demote(1);
        assert_eq!(list.ranks(), &[1, 2, 0]);
    }

    proptest! {
        #[test]
        fn demotion_preserves_permutation(
            seed in proptest::collection::vec(any::<u32>(), 1..24),
            demotions in proptest::collection::vec(any::<usize>(), 0..16),
        ) {
            // Rank slots by their random key to get an arbitrary permutation.
            let mut order: Vec<usize> = (0..seed.len()).collect();
            order.sort_by_key(|&i| (seed[i], i));
            let mut ranks = vec![0; seed.len()];
            for (rank, slot) in order.into_iter().enumerate() {
                ranks[slot] = rank as Rank;
            }
            let mut list = PreferenceList::from_ranks(ranks).unwrap();

            for d in demotions {
                let slot = d % list.len();
                list.demote(slot);
                prop_assert_eq!(list.rank(slot), list.worst_rank());
                prop_assert!(list.is_permutation());
            }
        }
    }
}
