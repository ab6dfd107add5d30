//! Project and pipeline configuration.
//!
//! A single TOML file carries two groups: `[project]` for paths, toggles and
//! verbosity, and `[pipeline]` for table layouts, join stages and the expected
//! silver schema. Every field has a default matching the reference dataset, so
//! a config file only needs the values that differ.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::join::JoinPlan;
use crate::schema::ExpectedSchema;
use crate::table::{TableKind, TableSpecs};

/// Log verbosity configured for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Project-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding the bronze source files.
    pub data_dir: PathBuf,
    /// Rebuild silver from bronze tables; load the persisted silver otherwise.
    pub from_scratch: bool,
    pub save_silver: bool,
    pub silver_dir: PathBuf,
    pub silver_file: String,
    /// Persist each normalized bronze table next to the silver output.
    pub save_bronze: bool,
    pub bronze_dir: PathBuf,
    pub log_level: LogLevel,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/bronze"),
            from_scratch: true,
            save_silver: true,
            silver_dir: PathBuf::from("data/silver"),
            silver_file: "bronze_merged.csv".to_string(),
            save_bronze: false,
            bronze_dir: PathBuf::from("data/bronze_normalized"),
            log_level: LogLevel::Info,
        }
    }
}

impl ProjectConfig {
    pub fn silver_path(&self) -> PathBuf {
        self.silver_dir.join(&self.silver_file)
    }

    pub fn source_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

/// Settings specific to the ingest-and-merge pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column separator shared by every bronze file.
    pub separator: char,
    /// `chrono` pattern for date columns.
    pub date_format: String,
    pub tables: TableSpecs,
    pub joins: JoinPlan,
    pub schema: ExpectedSchema,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            separator: ';',
            date_format: "%y%m%d".to_string(),
            tables: TableSpecs::default(),
            joins: JoinPlan::default(),
            schema: ExpectedSchema::default(),
        }
    }
}

impl PipelineConfig {
    /// Separator as the single byte the CSV reader expects.
    pub fn separator_byte(&self) -> u8 {
        // `validate` guarantees an ASCII separator.
        u8::try_from(self.separator).unwrap_or(b',')
    }

    /// Reject configurations that would only fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if !self.separator.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "separator '{}' is not a single ASCII character",
                self.separator
            )));
        }
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::Invalid("date_format is empty".to_string()));
        }

        let mut date_columns = BTreeSet::new();
        for (kind, spec) in self.tables.iter() {
            if spec.file.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("table '{kind}' has no file")));
            }
            if kind == TableKind::District && spec.date_column.is_some() {
                return Err(ConfigError::Invalid(
                    "table 'district' is not normalized and cannot declare a date column"
                        .to_string(),
                ));
            }
            if let Some(subset) = &spec.null_subset
                && subset.is_empty()
            {
                return Err(ConfigError::Invalid(format!(
                    "table '{kind}' declares an empty null_subset"
                )));
            }
            if let Some(date_column) = &spec.date_column {
                date_columns.insert(date_column.as_str());
            }
        }

        for (name, stage) in self.joins.stages() {
            stage.check(name).map_err(ConfigError::Invalid)?;
            for (left, right) in stage.key_pairs() {
                if let Some(date) = [left, right].into_iter().find(|k| date_columns.contains(k)) {
                    return Err(ConfigError::Invalid(format!(
                        "join stage '{name}' uses date column '{date}' as a key"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanConfig {
    pub project: ProjectConfig,
    pub pipeline: PipelineConfig,
}

impl LoanConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: LoanConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.pipeline.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
