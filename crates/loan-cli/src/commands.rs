use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use loan_cli::pipeline::{PipelineOutcome, SilverPipeline};
use loan_model::LoanConfig;

use crate::cli::{ConfigArgs, RunArgs};

/// Load the configuration file, or defaults when none is given.
pub fn load_config(args: &ConfigArgs) -> Result<LoanConfig> {
    match &args.config {
        Some(path) => LoanConfig::load(path).context("load configuration"),
        None => Ok(LoanConfig::default()),
    }
}

/// Apply command-line overrides on top of the file configuration.
pub fn apply_overrides(mut config: LoanConfig, args: &RunArgs) -> LoanConfig {
    let project = &mut config.project;
    if let Some(dir) = &args.data_dir {
        project.data_dir = dir.clone();
    }
    if args.load_silver {
        project.from_scratch = false;
    }
    if args.no_save {
        project.save_silver = false;
    }
    if args.save_bronze {
        project.save_bronze = true;
    }
    config
}

pub fn run_pipeline(config: LoanConfig, args: &RunArgs) -> Result<PipelineOutcome> {
    let outcome = SilverPipeline::new(config).run()?;
    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&outcome.report).context("render schema report")?;
        fs::write(path, json)
            .with_context(|| format!("write schema report to {}", path.display()))?;
        info!(path = %path.display(), "schema report written");
    }
    Ok(outcome)
}

pub fn show_config(config: &LoanConfig) -> Result<()> {
    let rendered = config.to_toml_string().context("render configuration")?;
    print!("{rendered}");
    Ok(())
}
