//! Argument parsing for the `palyno` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use palyno_core::{AnalystId, BeekeeperId, PoolId};

/// Top-level CLI parser for the `palyno` binary.
#[derive(Debug, Parser)]
#[command(name = "palyno", version, about = "Palyno - pollen analysis toolbox")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a report from exported analysis records
    Report(ReportArgs),

    /// Validate a set of species counts before saving
    Validate(ValidateArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// JSON array of analysis records
    #[arg(long)]
    pub records: PathBuf,

    /// First analysis date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last analysis date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Only pools counted by this analyst
    #[arg(long)]
    pub analyst: Option<AnalystId>,

    /// Only this pool
    #[arg(long)]
    pub pool: Option<PoolId>,

    /// Only pools with a drum from this beekeeper
    #[arg(long, requires = "memberships")]
    pub beekeeper: Option<BeekeeperId>,

    /// JSON array of pool memberships, needed by --beekeeper
    #[arg(long)]
    pub memberships: Option<PathBuf>,

    /// Species in the top ranking (overrides config)
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// JSON array of species counts
    #[arg(long)]
    pub counts: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Also write the effective configuration to the config file
    #[arg(long)]
    pub save: bool,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_parses_filters() {
        let cli = Cli::try_parse_from([
            "palyno",
            "--verbose",
            "report",
            "--records",
            "records.json",
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-31",
            "--analyst",
            "7",
            "--top",
            "5",
        ])
        .expect("cli should parse");

        assert!(cli.verbose);
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.records, PathBuf::from("records.json"));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(args.analyst, Some(7));
        assert_eq!(args.pool, None);
        assert_eq!(args.top, Some(5));
    }

    #[test]
    fn beekeeper_requires_memberships() {
        let result = Cli::try_parse_from([
            "palyno",
            "report",
            "--records",
            "records.json",
            "--beekeeper",
            "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_date_is_rejected() {
        let result = Cli::try_parse_from([
            "palyno",
            "report",
            "--records",
            "records.json",
            "--from",
            "03/01/2024",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["palyno", "validate", "--counts", "c.json", "-c", "lab.toml"])
            .expect("cli should parse");

        assert_eq!(cli.config, Some(PathBuf::from("lab.toml")));
        assert!(matches!(cli.command, Commands::Validate(_)));
    }
}
