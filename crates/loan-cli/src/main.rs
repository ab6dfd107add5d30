//! Loan silver pipeline CLI.

use clap::{ColorChoice, Parser};
use loan_cli::logging::{LogConfig, LogFormat, init_logging};
use loan_model::LoanConfig;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{apply_overrides, load_config, run_pipeline, show_config};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();

    let config_args = match &cli.command {
        Command::Run(args) => &args.config,
        Command::ShowConfig(args) => args,
    };
    // Configuration errors are fatal before any table is read.
    let config = match load_config(config_args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(2);
        }
    };

    let log_config = log_config_from_cli(&cli, &config);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match &cli.command {
        Command::Run(args) => {
            let config = apply_overrides(config, args);
            match run_pipeline(config, args) {
                Ok(outcome) => {
                    print_summary(&outcome);
                    if args.fail_on_mismatch && !outcome.report.verdict.is_match() {
                        1
                    } else {
                        0
                    }
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    1
                }
            }
        }
        Command::ShowConfig(_) => match show_config(&config) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration with this precedence: `--log-level`, then
/// `-v`/`-q`, then `RUST_LOG`, then the config file's `log_level`.
fn log_config_from_cli(cli: &Cli, config: &LoanConfig) -> LogConfig {
    let mut log_config = LogConfig::from_level(config.project.log_level);
    if cli.verbosity.is_present() {
        log_config.level_filter = cli.verbosity.tracing_level_filter();
    }
    log_config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        log_config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    log_config = log_config
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        })
        .with_log_file(cli.log_file.clone());
    log_config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    log_config
}
