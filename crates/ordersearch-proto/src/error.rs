//! Criteria validation errors.

use thiserror::Error;

/// Errors raised while building search criteria or value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Offset below zero.
    #[error("offset must be >= 0, got {0}")]
    NegativeOffset(i64),

    /// Limit outside the accepted window.
    #[error("limit must be in 1..={max}, got {limit}")]
    LimitOutOfRange { limit: i64, max: i64 },

    /// Money amount that cannot be represented with two fractional digits.
    #[error("invalid money amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: &'static str },
}

/// Error returned when text does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected text.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
