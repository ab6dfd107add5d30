//! Bronze-to-silver pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read the eight bronze files and apply the null policy
//! 2. **Normalize**: cast declared dtypes and parse dates (district exempt)
//! 3. **Merge**: build the silver table from the account and client branches
//! 4. **Validate**: compare silver against the expected schema (observational)
//! 5. **Persist**: optionally write silver and the normalized bronze tables
//!
//! When the project is not rebuilt from scratch, stages 1 to 3 are replaced by
//! loading the persisted silver table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use polars::prelude::DataFrame;
use tracing::{Span, debug, info, info_span, warn};

use loan_ingest::{NullAction, SilverFormat, drop_nulls, load_silver, read_delimited, write_csv};
use loan_merge::{BronzeTables, MergeEngine};
use loan_model::{
    ExpectedSchema, LoanConfig, PipelineConfig, ProjectConfig, SchemaReport, TableKind,
};
use loan_transform::normalize_table;
use loan_validate::validate_schema;

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// What ingestion did with one bronze table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub table: TableKind,
    pub path: PathBuf,
    pub rows_read: usize,
    /// Rows left after the null policy.
    pub rows: usize,
    pub missing_fraction: f64,
    pub null_action: NullAction,
    /// Values that did not parse as dates; `None` when the table has no date
    /// column or is not normalized.
    pub malformed_dates: Option<usize>,
}

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    pub tables: BTreeMap<TableKind, DataFrame>,
    pub summaries: Vec<TableSummary>,
}

/// Read every bronze table and apply the null-dropping policy.
pub fn ingest(project: &ProjectConfig, pipeline: &PipelineConfig) -> Result<IngestResult> {
    let separator = pipeline.separator_byte();
    let mut tables = BTreeMap::new();
    let mut summaries = Vec::new();

    for (kind, spec) in pipeline.tables.iter() {
        let _span = info_span!("ingest", table = %kind).entered();
        let path = project.source_path(&spec.file);
        let raw = read_delimited(&path, separator)
            .with_context(|| format!("ingest {kind} table from {}", path.display()))?;
        let rows_read = raw.height();
        let outcome = drop_nulls(raw, spec.null_subset.as_deref())
            .with_context(|| format!("apply null policy to {kind} table"))?;
        debug!(
            rows_read,
            rows = outcome.table.height(),
            columns = outcome.table.width(),
            "table ingested"
        );
        summaries.push(TableSummary {
            table: kind,
            path,
            rows_read,
            rows: outcome.table.height(),
            missing_fraction: outcome.fraction,
            null_action: outcome.action,
            malformed_dates: None,
        });
        tables.insert(kind, outcome.table);
    }

    Ok(IngestResult { tables, summaries })
}

// ============================================================================
// Stage 2: Normalize
// ============================================================================

/// Cast and date-parse every table except district, in place.
pub fn normalize(ingested: &mut IngestResult, pipeline: &PipelineConfig) -> Result<()> {
    for summary in &mut ingested.summaries {
        let kind = summary.table;
        if !kind.is_normalized() {
            continue;
        }
        let _span = info_span!("normalize", table = %kind).entered();
        let table = ingested
            .tables
            .remove(&kind)
            .ok_or_else(|| anyhow!("{kind} table was not ingested"))?;
        let normalized = normalize_table(table, pipeline.tables.get(kind), &pipeline.date_format)
            .with_context(|| format!("normalize {kind} table"))?;
        summary.malformed_dates = normalized.dates.map(|dates| dates.malformed);
        debug!("table normalized");
        ingested.tables.insert(kind, normalized.table);
    }
    Ok(())
}

// ============================================================================
// Stage 3: Merge
// ============================================================================

/// Move the merged tables out of the ingest result.
pub fn bronze_tables(tables: &mut BTreeMap<TableKind, DataFrame>) -> Result<BronzeTables> {
    let mut take = |kind: TableKind| {
        tables
            .remove(&kind)
            .ok_or_else(|| anyhow!("{kind} table was not ingested"))
    };
    Ok(BronzeTables {
        account: take(TableKind::Account)?,
        card: take(TableKind::Card)?,
        client: take(TableKind::Client)?,
        disp: take(TableKind::Disp)?,
        loan: take(TableKind::Loan)?,
        order: take(TableKind::Order)?,
        transactions: take(TableKind::Transactions)?,
    })
}

// ============================================================================
// Stage 4: Validate
// ============================================================================

/// Validate silver and log the verdict. Never fails.
pub fn validate(silver: &DataFrame, schema: &ExpectedSchema) -> SchemaReport {
    let report = validate_schema(silver, schema, schema.required.as_deref());
    if report.verdict.is_match() {
        debug!(verdict = %report.verdict, "silver schema validated");
    } else {
        warn!(
            verdict = %report.verdict,
            issues = report.issues.len(),
            "silver schema mismatch"
        );
    }
    report
}

// ============================================================================
// Stage 5: Persist
// ============================================================================

/// Result of one best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Skipped,
    Written(PathBuf),
    Failed { path: PathBuf, message: String },
}

impl Persistence {
    pub fn is_failed(&self) -> bool {
        matches!(self, Persistence::Failed { .. })
    }
}

/// Write a table as CSV, logging instead of failing.
pub fn persist(df: &mut DataFrame, path: &Path) -> Persistence {
    match write_csv(df, path) {
        Ok(()) => {
            info!(path = %path.display(), rows = df.height(), "table saved");
            Persistence::Written(path.to_path_buf())
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to save table");
            Persistence::Failed {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        }
    }
}

fn persist_bronze(
    tables: &mut BTreeMap<TableKind, DataFrame>,
    dir: &Path,
) -> Vec<(TableKind, Persistence)> {
    tables
        .iter_mut()
        .map(|(kind, df)| {
            let path = dir.join(format!("{kind}.csv"));
            (*kind, persist(df, &path))
        })
        .collect()
}

// ============================================================================
// Run
// ============================================================================

/// Where the silver table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilverSource {
    Built,
    Loaded(SilverFormat),
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub silver: DataFrame,
    pub source: SilverSource,
    pub report: SchemaReport,
    /// Per-table ingestion results; empty when silver was loaded.
    pub tables: Vec<TableSummary>,
    pub silver_output: Persistence,
    pub bronze_outputs: Vec<(TableKind, Persistence)>,
    pub elapsed: Duration,
}

/// One configured run of the pipeline.
///
/// The run span is created up front and handed to every component, so all
/// events of a run share its context.
#[derive(Debug)]
pub struct SilverPipeline {
    config: LoanConfig,
    span: Span,
}

impl SilverPipeline {
    pub fn new(config: LoanConfig) -> Self {
        let span = info_span!(
            "silver_run",
            data_dir = %config.project.data_dir.display(),
            from_scratch = config.project.from_scratch,
        );
        Self { config, span }
    }

    pub fn run(self) -> Result<PipelineOutcome> {
        let _guard = self.span.enter();
        let start = Instant::now();
        let LoanConfig { project, pipeline } = &self.config;

        let (mut silver, source, tables, bronze_outputs) = if project.from_scratch {
            let mut ingested = ingest(project, pipeline)?;
            normalize(&mut ingested, pipeline)?;
            let bronze_outputs = if project.save_bronze {
                persist_bronze(&mut ingested.tables, &project.bronze_dir)
            } else {
                Vec::new()
            };
            let bronze = bronze_tables(&mut ingested.tables)?;
            let silver = MergeEngine::new(&pipeline.joins, &self.span)
                .merge(bronze)
                .context("merge bronze tables")?;
            (silver, SilverSource::Built, ingested.summaries, bronze_outputs)
        } else {
            let path = project.silver_path();
            let (silver, format) = load_silver(&path)
                .with_context(|| format!("load silver table from {}", path.display()))?;
            info!(path = %path.display(), ?format, rows = silver.height(), "silver table loaded");
            (silver, SilverSource::Loaded(format), Vec::new(), Vec::new())
        };

        let report = validate(&silver, &pipeline.schema);

        // Loaded tables are rewritten too, so an IPC snapshot comes back as CSV.
        let silver_output = if project.save_silver {
            persist(&mut silver, &project.silver_path())
        } else {
            Persistence::Skipped
        };

        let elapsed = start.elapsed();
        info!(
            rows = silver.height(),
            columns = silver.width(),
            elapsed_ms = elapsed.as_millis() as u64,
            "silver pipeline complete"
        );
        Ok(PipelineOutcome {
            silver,
            source,
            report,
            tables,
            silver_output,
            bronze_outputs,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn missing_table_is_reported_by_name() {
        let mut tables = BTreeMap::new();
        tables.insert(TableKind::Account, df!("account_id" => [1i64]).unwrap());

        let err = bronze_tables(&mut tables).unwrap_err();

        assert!(err.to_string().contains("card"));
    }

    #[test]
    fn failed_write_is_recorded_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let mut df = df!("a" => [1i64]).unwrap();

        let result = persist(&mut df, &blocker.join("silver.csv"));

        assert!(result.is_failed());
    }
}
