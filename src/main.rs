//! eventlog binary entry point.
//!
//! Reads lines from stdin and logs each one as an INFO `system.game` event.
//! The logger's own diagnostics go to stderr, filtered by `RUST_LOG`
//! (default `eventlog=info`).

use eventlog::config::{CommandLine, ConfigDocument, ConfigLoader, ConfigResolver, EnvHostConfig};
use eventlog::logging::{EventKind, EventLogger, SystemClock};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Default settings document location.
const DEFAULT_CONFIG_PATH: &str = "eventlog/config.json";

/// Diagnostics filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "eventlog=info";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = CommandLine::from_env();
    let config_path = cli
        .get("eventlog-config")
        .filter(|path| !path.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    // a broken document is left untouched and none of it is applied
    let document = ConfigLoader::new()
        .load_or_create(&config_path)
        .unwrap_or_else(|e| {
            error!(path = %config_path.display(), error = %e, "Using default settings");
            ConfigDocument::default()
        });

    let log_dir = config_path
        .parent()
        .map_or_else(|| PathBuf::from("logs"), |dir| dir.join("logs"));
    let host = EnvHostConfig;
    let settings = ConfigResolver::new(&document, &host, &cli)
        .with_log_dir(log_dir)
        .resolve();

    println!(
        "eventlog v{} writing to {}",
        env!("CARGO_PKG_VERSION"),
        settings.file.active_path().display()
    );

    let mut status = ExitCode::SUCCESS;
    let mut logger = EventLogger::open(&settings, Arc::new(SystemClock::new()));
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) => logger.info(EventKind::SystemGame, &line),
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                status = ExitCode::FAILURE;
                break;
            },
        }
        logger.tick();
    }
    logger.close();

    status
}
