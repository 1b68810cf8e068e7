//! Binary crate for the `wxbar` command-line tool.
//!
//! This crate focuses on:
//! - Parsing the single optional output-mode argument
//! - Logging setup (stderr only; stdout carries the result)
//! - Mapping failures to the `Error` token and an exit status

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod cli;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();

    match cli::Cli::parse_or_report() {
        Ok(cmd) => cmd.run().await,
        Err(code) => code,
    }
}
