//! ordersearch core - criteria compiler, query execution, and SQLite store.
//!
//! A [`SearchCriteria`](proto::SearchCriteria) is compiled into predicates,
//! a join graph and a grouped projection, rendered to SQL, and executed
//! through a [`QueryBackend`]. Search and count share one predicate set, so a
//! count always agrees with the rows a search can page through.

pub mod error;
pub mod query;
pub mod storage;

pub use error::Error;
pub use query::{QueryExecutor, QueryExplanation, QueryPlanner, Statement};
pub use storage::{fixtures, QueryBackend, SqliteStore, StorageConfig};

/// Re-export protocol types.
pub use ordersearch_proto as proto;
