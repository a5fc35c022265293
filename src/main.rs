#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use cli::commands::Cli;
use runbell::lifecycle::is_cancellation;

/// Exit status for a run stopped with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    enable_error_backtraces();

    let cli = Cli::parse();

    // Logs go to stderr; the wrapped command owns stdout.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to install log subscriber: {e}");
    }

    match app::dispatch::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_cancellation(&err) => {
            eprintln!("Cancelled.");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Interruption mails carry the error's backtrace unless the user opted out.
fn enable_error_backtraces() {
    if std::env::var_os("RUST_BACKTRACE").is_none()
        && std::env::var_os("RUST_LIB_BACKTRACE").is_none()
    {
        // SAFETY: called from `main` before any other thread exists.
        unsafe {
            std::env::set_var("RUST_LIB_BACKTRACE", "1");
        }
    }
}
