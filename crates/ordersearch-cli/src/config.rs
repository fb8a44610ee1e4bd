//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ordersearch_core::StorageConfig;

use crate::commands::Command;
use crate::formatter::OutputFormat;

/// Default database file.
pub const DEFAULT_DB_PATH: &str = "ordersearch.db";

/// Default busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// ordersearch command-line client
#[derive(Parser, Debug)]
#[command(name = "ordersearch")]
#[command(version, about = "Search orders by customer, product and payment criteria", long_about = None)]
pub struct Args {
    /// Path to the SQLite database file.
    #[arg(long, global = true, env = "ORDERSEARCH_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Use a throwaway in-memory database loaded with the reference dataset.
    /// Overrides `--db`.
    #[arg(long, global = true)]
    pub memory: bool,

    /// Output format.
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Milliseconds to wait on a locked database.
    #[arg(long, global = true, default_value_t = DEFAULT_BUSY_TIMEOUT_MS)]
    pub busy_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Resolved configuration for one invocation.
#[derive(Debug)]
pub struct CliConfig {
    pub storage: StorageConfig,
    pub format: OutputFormat,
    /// Seed the in-memory store before running the command.
    pub memory: bool,
    pub command: Command,
}

impl Args {
    /// Convert command-line arguments to a client configuration.
    pub fn into_config(self) -> CliConfig {
        let storage = if self.memory {
            StorageConfig::in_memory()
        } else {
            StorageConfig::new(self.db)
        };
        let storage = storage.with_busy_timeout(Duration::from_millis(self.busy_timeout_ms));

        // Only init and seed write to the file.
        let storage = if self.command.is_read_only() && !self.memory {
            storage.read_only()
        } else {
            storage
        };

        CliConfig {
            storage,
            format: self.format,
            memory: self.memory,
            command: self.command,
        }
    }
}
