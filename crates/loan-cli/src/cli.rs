//! CLI argument definitions for the loan silver pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "loan-silver",
    version,
    about = "Build the silver loan table from bronze source files",
    long_about = "Ingest the eight bronze loan tables, normalize their types and dates,\n\
                  join them into one silver table and check it against the expected schema."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and the config file).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline and print a summary.
    Run(RunArgs),

    /// Print the effective configuration as TOML.
    ShowConfig(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the bronze data directory.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Load the persisted silver table instead of rebuilding it.
    #[arg(long = "load-silver")]
    pub load_silver: bool,

    /// Do not write the silver table.
    #[arg(long = "no-save")]
    pub no_save: bool,

    /// Also write the normalized bronze tables.
    #[arg(long = "save-bronze")]
    pub save_bronze: bool,

    /// Write the schema report as JSON.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Exit with a failure code when the schema does not match.
    #[arg(long = "fail-on-mismatch")]
    pub fail_on_mismatch: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
