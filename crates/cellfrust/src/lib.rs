//! # Cellfrust
//!
//! Anomaly detection through cellular frustration.
//!
//! A population of presenter agents displays the features of a sample; a
//! population of detector agents classifies each presenter as normal or
//! abnormal against its own critical window. Every round presenters propose
//! to detectors and pairings are made and broken by preference rules whose
//! ties are settled by recognition. Samples that look like the training
//! data keep the population churning; unusual samples produce pairings
//! that last. The durations of those pairings are the anomaly signal.
//!
//! ## Quick Start
//!
//! ```rust
//! use cellfrust::prelude::*;
//!
//! // One feature, two presenter sets: two presenters, two detectors.
//! let layout = Layout::new(1, 2).unwrap();
//! let lists = vec![vec![0, 1, 2, 3], vec![3, 2, 1, 0]];
//! let left = vec![vec![0.0], vec![0.4]];
//! let right = vec![vec![1.0], vec![0.6]];
//! let agents = AgentStore::new(layout, lists, left, right).unwrap();
//!
//! let params = Params::default().with_monitoring_rounds(100);
//! let mut colony = Colony::new(agents, &params).unwrap();
//! let report = colony.run_monitoring(&[0.5]).unwrap();
//!
//! assert_eq!(report.rounds, 100);
//! assert!(colony.agents().is_symmetric());
//! ```
//!
//! ## Architecture
//!
//! - [`cellfrust_core`] - Agent store, preference lists, signal mapping,
//!   lifetime histograms, parameters and errors
//! - [`cellfrust_runtime`] - Matching engine, dissociation, education, the
//!   round driver, calibration, ROC/AUC evaluation and input generation
//!
//! ## Key Concepts
//!
//! | Step | Biological Analog | What It Does |
//! |------|-------------------|--------------|
//! | Present | Antigen presentation | Presenters show sample features |
//! | Match | Receptor binding | Presenters and detectors pair by preference |
//! | Dissociate | Unbinding | Rare random unpairing keeps the system moving |
//! | Educate | Thymic education | Detectors demote signals they latch onto |
//! | Score | Activation | Long pairings beyond normal levels signal anomalies |

// Re-export all subcrates
pub use cellfrust_core as core;
pub use cellfrust_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use cellfrust::prelude::*;
/// ```
pub mod prelude {
    pub use cellfrust_core::prelude::*;
    pub use cellfrust_runtime::prelude::*;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
