//! Storage configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default time to wait on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for opening a [`SqliteStore`](super::SqliteStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path to the database file. None means a private in-memory database.
    pub path: Option<PathBuf>,

    /// How long a statement waits on a lock held by another connection.
    pub busy_timeout: Duration,

    /// Open without write access.
    pub read_only: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            read_only: false,
        }
    }
}

impl StorageConfig {
    /// Create a new configuration with the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Create an in-memory configuration for testing.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Open the database read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}
