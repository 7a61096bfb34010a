//! Error types for cellular frustration operations.
//!
//! Every variant is a configuration or shape error: the simulation itself
//! has no transient failures, so nothing here is worth retrying.

use thiserror::Error;

/// Result type for cellular frustration operations.
pub type Result<T> = std::result::Result<T, CfmError>;

/// Errors raised when inputs do not fit the agent layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CfmError {
    /// A sample does not match the presenter/feature layout.
    #[error("sample has {found} values, expected {features} (one presenter set) or {full} (all presenter sets)")]
    SampleShape {
        found: usize,
        features: usize,
        full: usize,
    },

    /// A table has the wrong number of rows.
    #[error("{table} has {found} rows, expected {expected}")]
    TableRows {
        table: String,
        found: usize,
        expected: usize,
    },

    /// A table row has the wrong number of columns.
    #[error("{table} row {row} has {found} columns, expected {expected}")]
    TableColumns {
        table: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A preference list is not a permutation of `0..len`.
    #[error("preference list of agent {agent} is not a permutation of 0..{len}")]
    InvalidPermutation { agent: usize, len: usize },

    /// An agent id outside `0..n_agents`.
    #[error("agent {agent} out of range (population of {population})")]
    AgentOutOfRange { agent: usize, population: usize },

    /// A sample-draw index outside the data set.
    #[error("sample index {index} out of range ({len} samples)")]
    SampleOutOfRange { index: usize, len: usize },

    /// A parameter value that cannot drive a simulation.
    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    /// Calibration needs at least one normal sample and one detector.
    #[error("calibration requires at least one sample and one detector")]
    EmptyCalibration,

    /// Responses and class labels differ in length.
    #[error("{responses} responses but {labels} class labels")]
    LabelMismatch { responses: usize, labels: usize },
}

impl CfmError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        CfmError::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn table_rows(table: impl Into<String>, found: usize, expected: usize) -> Self {
        CfmError::TableRows {
            table: table.into(),
            found,
            expected,
        }
    }

    pub fn table_columns(
        table: impl Into<String>,
        row: usize,
        found: usize,
        expected: usize,
    ) -> Self {
        CfmError::TableColumns {
            table: table.into(),
            row,
            found,
            expected,
        }
    }
}
