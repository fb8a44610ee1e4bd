//! Relational store behind the search engine.
//!
//! The query layer talks to storage only through [`QueryBackend`]: it hands
//! over a rendered [`Statement`] and receives untyped [`Row`]s or a count.
//! [`SqliteStore`] is the bundled implementation.

pub mod config;
pub mod fixtures;
pub mod schema;
pub mod sqlite;

mod row;

pub use config::StorageConfig;
pub use row::{Cell, Row};
pub use sqlite::SqliteStore;

use crate::error::Error;
use crate::query::Statement;

/// Executes rendered statements against a relational store.
pub trait QueryBackend {
    /// Run a row-producing statement.
    fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, Error>;

    /// Run a statement yielding a single integer in its first column.
    fn fetch_count(&self, statement: &Statement) -> Result<u64, Error>;
}
