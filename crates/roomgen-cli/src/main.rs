//! roomgen - AI interior design from the terminal.
//!
//! Signs in to the roomgen service, manages the user profile and saved
//! designs, and submits room photos for restyling.

mod app;
mod cli;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use roomgen_core::Config;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::Cli;

/// Log file name inside the cache directory
const LOG_FILE: &str = "roomgen.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file in the cache directory so stdout stays clean for
/// command output; stderr is used if the directory cannot be created.
fn init_tracing(log_dir: Option<&Path>) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let (writer, guard) = match log_dir {
        Some(dir) => tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE)),
        None => tracing_appender::non_blocking(io::stderr()),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(config.cache_dir().ok().as_deref());
    info!(backend = %config.session_backend, "roomgen starting");

    let mut app = match App::new(config, cli.json).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match app.run(cli.command.unwrap_or_default()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", app.describe_error(&e).await);
            ExitCode::FAILURE
        }
    }
}
