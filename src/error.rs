//! Error taxonomy for the mining pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BasketError {
    /// Malformed or empty transaction input, or an out-of-range threshold
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing sheet '{sheet}' (expected file {sheet}.csv)")]
    MissingSheet { sheet: String },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    Schema { sheet: String, column: String },

    /// Internal check failure between the miner and the rule generator.
    /// Never recovered from.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BasketError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn schema(sheet: &str, column: &str) -> Self {
        Self::Schema {
            sheet: sheet.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BasketError>;
