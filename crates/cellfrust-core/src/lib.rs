//! # Cellfrust Core
//!
//! Agent data model of the cellular frustration model.
//!
//! A population of *presenters* (showing feature values of the active
//! sample) and *detectors* (classifying presenters against critical windows)
//! is held in an [`agents::AgentStore`]. This crate defines that store and
//! the pieces it is made of:
//!
//! - **types**: ids, roles, subtypes, the partner code a detector perceives
//! - **preference**: slot → rank permutations with rank-shifting demotion
//! - **ledger**: histograms of pairing durations and their cumulative view
//! - **signal**: mapping a sample onto signals and detector local lists
//! - **params**: the immutable experiment parameter set
//!
//! ## Quick Start
//!
//! ```rust
//! use cellfrust_core::prelude::*;
//!
//! let layout = Layout::new(1, 2).unwrap();
//! let lists = vec![vec![0, 1, 2, 3]; 2];
//! let windows = (vec![vec![0.0]; 2], vec![vec![1.0]; 2]);
//! let mut agents = AgentStore::new(layout, lists, windows.0, windows.1).unwrap();
//!
//! present_sample(&mut agents, &[0.5]).unwrap();
//! assert!(agents.recognizes_as_normal(2, 0));
//! ```

pub mod agents;
pub mod error;
pub mod ledger;
pub mod params;
pub mod preference;
pub mod prelude;
pub mod signal;
pub mod types;
