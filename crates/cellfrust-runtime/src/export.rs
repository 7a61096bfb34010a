//! Lifetime exporter — histogram rows and summary statistics.
//!
//! Each agent's histogram is exported as two aligned rows (sorted durations,
//! then counts), ready to be written as delimited text.

use cellfrust_core::agents::AgentStore;
use cellfrust_core::ledger::{combine, LifetimeHistogram};
use cellfrust_core::types::{AgentId, Role, Tick};
use serde::Serialize;

/// One agent's histogram as two aligned rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramRows {
    pub agent: AgentId,
    pub role: Role,
    pub durations: Vec<Tick>,
    pub counts: Vec<u64>,
}

/// Export every agent's histogram, in agent id order.
pub fn lifetime_rows(agents: &AgentStore) -> Vec<HistogramRows> {
    agents
        .all_lifetimes()
        .iter()
        .enumerate()
        .map(|(agent, histogram)| {
            let (durations, counts) = histogram.rows();
            HistogramRows {
                agent,
                role: agents.role(agent),
                durations,
                counts,
            }
        })
        .collect()
}

/// Summary of a set of lifetime histograms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeStats {
    pub agents: usize,
    pub episodes: u64,
    pub mean_duration: f64,
    pub median_duration: Tick,
    pub max_duration: Tick,
    /// Episodes that ended without a single round paired.
    pub empty_episodes: u64,
}

/// Statistics over the episodes of all given histograms.
pub fn lifetime_stats(histograms: &[LifetimeHistogram]) -> LifetimeStats {
    let combined = combine(histograms);
    let episodes = combined.total();
    if episodes == 0 {
        return LifetimeStats {
            agents: histograms.len(),
            episodes: 0,
            mean_duration: 0.0,
            median_duration: 0,
            max_duration: 0,
            empty_episodes: 0,
        };
    }

    // Upper median: the duration holding the episode at index episodes / 2.
    let middle = episodes / 2;
    let mut seen = 0;
    let mut median_duration = 0;
    for (duration, count) in combined.iter() {
        seen += count;
        if seen > middle {
            median_duration = duration;
            break;
        }
    }

    LifetimeStats {
        agents: histograms.len(),
        episodes,
        mean_duration: combined.total_duration() as f64 / episodes as f64,
        median_duration,
        max_duration: combined.max_duration().unwrap_or(0),
        empty_episodes: combined.count(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellfrust_core::types::Layout;

    #[test]
    fn rows_follow_agent_order() {
        let layout = Layout::new(1, 2).unwrap();
        let mut s = AgentStore::new(
            layout,
            vec![vec![0, 1, 2, 3]; 2],
            vec![vec![0.0]; 2],
            vec![vec![1.0]; 2],
        )
        .unwrap();
        s.pair(0, 2);
        s.advance_taus();
        s.advance_taus();
        s.unpair(0);

        let rows = lifetime_rows(&s);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].role, Role::Presenter);
        assert_eq!(rows[2].role, Role::Detector);
        // Each pairing records an empty episode for the agents it joins.
        assert_eq!(rows[0].durations, vec![0, 2]);
        assert_eq!(rows[0].counts, vec![1, 1]);
        assert!(rows[1].durations.is_empty());
    }

    #[test]
    fn stats_summarise_all_episodes() {
        let a: LifetimeHistogram = [(0, 2), (3, 1)].into_iter().collect();
        let b: LifetimeHistogram = [(5, 1), (10, 1)].into_iter().collect();
        let stats = lifetime_stats(&[a, b]);
        assert_eq!(stats.agents, 2);
        assert_eq!(stats.episodes, 5);
        assert_eq!(stats.mean_duration, 18.0 / 5.0);
        assert_eq!(stats.median_duration, 3);
        assert_eq!(stats.max_duration, 10);
        assert_eq!(stats.empty_episodes, 2);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        let stats = lifetime_stats(&[LifetimeHistogram::new()]);
        assert_eq!(stats.episodes, 0);
        assert_eq!(stats.mean_duration, 0.0);
    }
}
