//! Cellfrust Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use cellfrust_core::prelude::*;
//! ```

pub use crate::types::{AgentId, Layout, PartnerCode, Role, Subtype, Tick};

pub use crate::agents::{AgentSnapshot, AgentStore};

pub use crate::preference::{PreferenceList, Rank};

pub use crate::ledger::{combine, LifetimeHistogram};

pub use crate::signal::{
    check_sample_shape, map_sample_to_signals, map_signals_to_local_lists, present_sample, within_window,
};

pub use crate::params::Params;

pub use crate::error::{CfmError, Result};
