//! # Cellfrust Runtime
//!
//! The round driver and everything that runs on top of the agent store.
//!
//! The runtime is the "tissue": it shuffles presenters and detectors into
//! proposals every round, breaks pairs at random, educates detectors that
//! latch onto the same signals during training, and turns the lifetime
//! statistics of monitored samples into anomaly scores.

pub mod calibration;
pub mod colony;
pub mod dissociation;
pub mod education;
pub mod evaluation;
pub mod export;
pub mod matching;
pub mod prelude;
pub mod setup;
