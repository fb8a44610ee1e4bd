//! Core error types.

use thiserror::Error;

/// Errors raised while compiling, executing, or mapping a search.
#[derive(Debug, Error)]
pub enum Error {
    /// Criteria or value rejected before any query was built.
    #[error("validation error: {0}")]
    Validation(#[from] ordersearch_proto::ValidationError),

    /// A stored value could not be mapped onto its domain type.
    #[error("cannot map column `{column}`: {reason}")]
    Mapping { column: String, reason: String },

    /// The store failed while executing a statement.
    #[error("query execution failed: {0}")]
    Execution(#[from] rusqlite::Error),

    /// Store could not be opened or configured.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub(crate) fn mapping(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Mapping {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
