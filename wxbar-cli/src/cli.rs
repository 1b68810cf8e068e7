use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, error::ErrorKind};
use tracing::debug;
use wxbar_core::{
    CacheStore, ConfigStore, Orchestrator, OutputMode, Paths, WeatherError,
    provider::provider_from_settings,
};

/// Token printed on stdout for every failure; the cause goes to stderr.
pub const ERROR_TOKEN: &str = "Error";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxbar", version, about = "Current weather for status bars")]
pub struct Cli {
    /// `icon` prints the condition glyph; anything else prints the temperature.
    #[arg(value_name = "MODE", allow_hyphen_values = true)]
    pub mode: Option<String>,

    /// Anything after the mode is accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    _rest: Vec<String>,
}

impl Cli {
    /// Parse `std::env::args`. Only `--help` and `--version` leave early;
    /// any other parse failure is reported like a runtime failure.
    pub fn parse_or_report() -> Result<Self, ExitCode> {
        match Self::try_parse() {
            Ok(cli) => Ok(cli),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                println!("{ERROR_TOKEN}");
                eprint!("{e}");
                Err(ExitCode::FAILURE)
            }
        }
    }

    pub async fn run(self) -> ExitCode {
        let mode = OutputMode::from_arg(self.mode.as_deref());

        match execute(mode).await {
            Ok(line) => {
                println!("{line}");
                ExitCode::SUCCESS
            }
            Err(err) => report(&err),
        }
    }
}

async fn execute(mode: OutputMode) -> anyhow::Result<String> {
    let paths = Paths::default_locations().context("Failed to locate config directory")?;
    debug!(?mode, config = %paths.config.display(), cache = %paths.cache.display(), "starting");

    let orchestrator = Orchestrator::new(ConfigStore::new(paths.config), CacheStore::new(paths.cache));
    let line = orchestrator
        .run(mode, Utc::now(), provider_from_settings)
        .await?;

    Ok(line)
}

fn report(err: &anyhow::Error) -> ExitCode {
    println!("{ERROR_TOKEN}");

    match err.downcast_ref::<WeatherError>() {
        Some(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
        None => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
