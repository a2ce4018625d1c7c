//! # palyno
//!
//! Command line front end for pollen analysis.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  args ──► LabConfig::load ──► command handler ──► JSON / TOML on stdout │
//! │                                                                         │
//! │  Exit codes: 0 ok, 1 error, 2 counts failed validation                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use palyno_lab::LabConfig;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Exit code when `validate` finds blocking errors.
const EXIT_INVALID: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("palyno error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = LabConfig::load(cli.config.clone()).context("failed to load configuration")?;

    match &cli.command {
        Commands::Report(args) => {
            let today = chrono::Local::now().date_naive();
            println!("{}", commands::report::handle(args, &config, today)?);
        }
        Commands::Validate(args) => {
            let report = commands::validate::handle(args, &config.validation)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.outcome.is_valid {
                return Ok(ExitCode::from(EXIT_INVALID));
            }
        }
        Commands::Config(args) => {
            print!("{}", commands::config::handle(args, &config, cli.config.clone())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PALYNO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
