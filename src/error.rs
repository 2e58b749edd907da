//! Error types
//!
//! Only wiring defects surface as errors. Degenerate runtime input (division
//! by zero, empty candidate sets, no live targets) has a defined fallback and
//! never reaches these types.

use thiserror::Error;

/// Invalid tuning or setup, fatal at initialization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown operator symbol `{0}`")]
    UnknownOperator(String),

    #[error("operator set is empty")]
    NoOperators,

    #[error("tile superset is empty")]
    EmptyTileSuperset,

    #[error("visible tile count must be at least 1")]
    NoVisibleTiles,

    #[error("number range is inverted: min {min} > max {max}")]
    InvertedNumberRange { min: i64, max: i64 },

    #[error("number range {min}..={max} is wider than {limit}")]
    NumberRangeTooWide { min: i64, max: i64, limit: i64 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },

    #[error("max concurrent targets must be at least 1")]
    NoTargetSlots,

    #[error("initial lives must be at least 1")]
    NoLives,

    #[error("invalid tuning JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Malformed operand/operator sequence handed to the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EquationError {
    #[error("equation has no operands")]
    Empty,

    #[error("{operators} operators cannot join {operands} operands")]
    ArityMismatch { operands: usize, operators: usize },
}
