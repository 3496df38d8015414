//! Error types for the analytics pipeline.
//!
//! - [`SchemaError`] - a required column or field is absent or unusable (fatal)
//! - [`ConfigError`] - grading thresholds that cannot be applied
//! - [`PipelineError`] - top-level wrapper returned by file-facing operations
//!
//! Repairable defects are not errors; see [`crate::cleaning::ValidationWarning`].

use thiserror::Error;

/// Raw input cannot be turned into a record collection.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// A required header is missing from the input table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A row has no value for a field that cannot be derived.
    #[error("Row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    /// A row has a value for a required field that cannot be repaired.
    #[error("Row {row}: invalid value {value:?} for field '{field}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Grading thresholds that violate the band ordering rules.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Threshold '{name}' = {value} is outside [0, 100]")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("Threshold '{upper}' must be strictly greater than '{lower}'")]
    NotDescending {
        upper: &'static str,
        lower: &'static str,
    },

    #[error("Performance bands contradict letter bands: {0}")]
    Inconsistent(String),
}

/// Top-level pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
