//! ordersearch command-line client
//!
//! Creates and seeds an order database, then searches, counts and explains
//! criteria against it.

mod commands;
mod config;
mod formatter;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Args;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordersearch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Args::parse().into_config();

    tracing::debug!(
        db = ?config.storage.path,
        format = %config.format,
        "configuration loaded"
    );

    match commands::run(&config) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            let formatter = formatter::create_formatter(config.format);
            eprintln!("{}", formatter.format_error(&e.to_string()));
            std::process::exit(1);
        }
    }
}
