//! Signal mapping — turning a sample into presenter signals and detector
//! local lists.
//!
//! Runs every time the active sample changes. Presenters display one feature
//! value each (features cycle across presenter sets); every detector then
//! classifies every presenter against its critical window for that feature.

use crate::agents::AgentStore;
use crate::error::{CfmError, Result};
use crate::types::{Layout, PartnerCode};

/// Assign each presenter its signal from `sample`.
///
/// A sample of `features` values is shown by every presenter set; a sample
/// of `features * presenter_sets` values gives each set its own slice. Any
/// other length is a configuration error.
pub fn map_sample_to_signals(agents: &mut AgentStore, sample: &[f64]) -> Result<()> {
    let layout = *agents.layout();
    check_sample_shape(&layout, sample)?;
    let full = layout.n_presenters();
    for presenter in layout.presenters() {
        let value = if sample.len() == full {
            sample[presenter]
        } else {
            sample[layout.feature_of(presenter)]
        };
        agents.set_signal(presenter, value);
    }
    Ok(())
}

/// Fail unless `sample` has `features` or `features * presenter_sets` values.
pub fn check_sample_shape(layout: &Layout, sample: &[f64]) -> Result<()> {
    let full = layout.n_presenters();
    if sample.len() != layout.features && sample.len() != full {
        return Err(CfmError::SampleShape {
            found: sample.len(),
            features: layout.features,
            full,
        });
    }
    Ok(())
}

/// Whether `signal` lies strictly inside `(left, right)`. A signal equal to
/// either bound is abnormal.
pub fn within_window(signal: f64, left: f64, right: f64) -> bool {
    signal > left && signal < right
}

/// Recompute every detector's local list from the current presenter signals.
pub fn map_signals_to_local_lists(agents: &mut AgentStore) {
    let layout = *agents.layout();
    for detector in layout.detectors() {
        for presenter in layout.presenters() {
            let (left, right) = agents.critical_window(detector, layout.feature_of(presenter));
            let normal = within_window(agents.signal(presenter), left, right);
            agents.set_local_code(detector, PartnerCode::new(presenter, normal));
        }
    }
}

/// Make `sample` the active sample: signals first, then local lists.
pub fn present_sample(agents: &mut AgentStore, sample: &[f64]) -> Result<()> {
    map_sample_to_signals(agents, sample)?;
    map_signals_to_local_lists(agents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two features, two presenter sets, detectors all share window (0, 1)
    /// for feature 0 and (10, 20) for feature 1.
    fn store() -> AgentStore {
        let layout = Layout::new(2, 2).unwrap();
        let lists = (0..4).map(|_| (0..8).collect()).collect();
        let left = vec![vec![0.0, 10.0]; 4];
        let right = vec![vec![1.0, 20.0]; 4];
        AgentStore::new(layout, lists, left, right).unwrap()
    }

    #[test]
    fn short_samples_are_broadcast_to_every_set() {
        let mut s = store();
        map_sample_to_signals(&mut s, &[0.5, 15.0]).unwrap();
        let signals: Vec<f64> = (0..4).map(|p| s.signal(p)).collect();
        assert_eq!(signals, vec![0.5, 15.0, 0.5, 15.0]);
    }

    #[test]
    fn full_samples_give_each_set_its_slice() {
        let mut s = store();
        map_sample_to_signals(&mut s, &[0.5, 15.0, 2.0, 30.0]).unwrap();
        let signals: Vec<f64> = (0..4).map(|p| s.signal(p)).collect();
        assert_eq!(signals, vec![0.5, 15.0, 2.0, 30.0]);
    }

    #[test]
    fn mismatched_sample_fails() {
        let mut s = store();
        let err = map_sample_to_signals(&mut s, &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            CfmError::SampleShape {
                found: 3,
                features: 2,
                full: 4
            }
        );
    }

    #[test]
    fn local_codes_follow_windows() {
        let mut s = store();
        present_sample(&mut s, &[0.5, 15.0, 2.0, 30.0]).unwrap();
        for detector in 4..8 {
            assert!(s.recognizes_as_normal(detector, 0));
            assert!(s.recognizes_as_normal(detector, 1));
            assert!(!s.recognizes_as_normal(detector, 2));
            assert!(!s.recognizes_as_normal(detector, 3));
            assert_eq!(s.local_code(detector, 1).slot(), 2);
            assert_eq!(s.local_code(detector, 3).slot(), 7);
        }
    }

    #[test]
    fn bounds_count_as_abnormal() {
        assert!(!within_window(0.0, 0.0, 1.0));
        assert!(!within_window(1.0, 0.0, 1.0));
        assert!(within_window(0.999, 0.0, 1.0));
    }
}
