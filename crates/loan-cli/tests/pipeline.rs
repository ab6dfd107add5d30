//! End-to-end tests for the silver pipeline over small bronze fixtures.

use std::fs;
use std::path::Path;

use loan_cli::pipeline::{Persistence, SilverPipeline, SilverSource};
use loan_ingest::{NullAction, SilverFormat};
use loan_model::{JoinKind, LoanConfig, SchemaVerdict, TableKind};
use polars::prelude::*;
use tempfile::TempDir;

const BRONZE: [(&str, &str); 8] = [
    (
        "account.asc",
        "account_id;district_id;frequency;date\n\
         1;18;POPLATEK MESICNE;930101\n\
         2;1;POPLATEK TYDNE;930102\n\
         3;5;POPLATEK MESICNE;930103\n",
    ),
    (
        "card.asc",
        "card_id;disp_id;type;issued\n\
         600;400;classic;931107 00:00:00\n\
         601;402;gold;940103 00:00:00\n",
    ),
    (
        "client.asc",
        "client_id;birth_number;district_id\n\
         500;706213;18\n\
         501;450204;1\n\
         502;406009;5\n",
    ),
    (
        "disp.asc",
        "disp_id;client_id;account_id;type\n\
         400;500;1;OWNER\n\
         401;501;2;OWNER\n\
         402;502;3;OWNER\n",
    ),
    (
        "district.asc",
        "A1;A2;A3\n\
         1;Hl.m. Praha;Prague\n\
         5;Kolin;central Bohemia\n\
         18;Pisek;south Bohemia\n",
    ),
    (
        "loan.asc",
        "loan_id;account_id;date;amount;duration;payments;status\n\
         700;1;940105;80952;24;3373.00;A\n\
         701;2;940607;30276;12;2523.00;B\n",
    ),
    (
        "order.asc",
        "order_id;account_id;bank_to;account_to;amount;k_symbol\n\
         800;1;YZ;87144583;2452.0;SIPO\n\
         801;1;ST;89597016;3372.7;UVER\n\
         802;2;QR;13943797;7266.0;SIPO\n",
    ),
    (
        "trans.asc",
        "trans_id;account_id;date;type;operation;amount;balance;k_symbol;bank;account\n\
         900;1;950324;PRIJEM;VKLAD;1000.0;1000.0;;;\n\
         901;2;950413;PRIJEM;PREVOD Z UCTU;3679.0;3679.0;;AB;41403269\n\
         902;3;950423;VYDAJ;VYBER;900.0;900.0;;;\n",
    ),
];

fn workspace() -> (TempDir, LoanConfig) {
    let dir = tempfile::tempdir().unwrap();
    let bronze = dir.path().join("bronze");
    fs::create_dir_all(&bronze).unwrap();
    for (file, content) in BRONZE {
        fs::write(bronze.join(file), content).unwrap();
    }
    let mut config = LoanConfig::default();
    config.project.data_dir = bronze;
    config.project.silver_dir = dir.path().join("silver");
    config.project.bronze_dir = dir.path().join("normalized");
    (dir, config)
}

fn column_names(path: &Path) -> Vec<String> {
    let (df, _) = loan_ingest::load_silver(path).unwrap();
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn builds_silver_from_bronze_files() {
    let (_dir, config) = workspace();
    let silver_path = config.project.silver_path();

    let outcome = SilverPipeline::new(config).run().unwrap();

    assert_eq!(outcome.source, SilverSource::Built);
    assert_eq!(outcome.silver.height(), 2);
    assert_eq!(outcome.report.verdict, SchemaVerdict::Matched);
    assert_eq!(outcome.silver_output, Persistence::Written(silver_path.clone()));
    assert!(silver_path.is_file());
    assert_eq!(outcome.tables.len(), 8);
}

#[test]
fn ingest_summaries_report_policy_and_dates() {
    let (_dir, config) = workspace();

    let outcome = SilverPipeline::new(config).run().unwrap();

    let summary = |kind: TableKind| {
        outcome
            .tables
            .iter()
            .find(|summary| summary.table == kind)
            .unwrap()
    };
    // Women's birth numbers carry month + 50 and do not parse as dates.
    assert_eq!(summary(TableKind::Client).malformed_dates, Some(2));
    assert_eq!(summary(TableKind::Loan).malformed_dates, Some(0));
    assert_eq!(summary(TableKind::District).malformed_dates, None);
    // Only the unchecked k_symbol/bank/account columns are empty.
    assert_eq!(summary(TableKind::Transactions).null_action, NullAction::Clean);
    assert_eq!(summary(TableKind::Account).rows, 3);
}

#[test]
fn persisted_silver_round_trips() {
    let (_dir, config) = workspace();
    let built = SilverPipeline::new(config.clone()).run().unwrap();
    let written_columns = column_names(&config.project.silver_path());

    let mut reload = config.clone();
    reload.project.from_scratch = false;
    let loaded = SilverPipeline::new(reload).run().unwrap();

    assert_eq!(loaded.source, SilverSource::Loaded(SilverFormat::Csv));
    assert_eq!(loaded.silver.height(), built.silver.height());
    assert_eq!(loaded.silver.width(), built.silver.width());
    let built_columns: Vec<String> = built
        .silver
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(written_columns, built_columns);
    assert_eq!(
        loaded.silver_output,
        Persistence::Written(config.project.silver_path())
    );
    assert_eq!(column_names(&config.project.silver_path()), built_columns);
    assert_eq!(loaded.report.verdict, SchemaVerdict::Matched);
    assert!(loaded.tables.is_empty());
}

#[test]
fn loaded_ipc_silver_is_rewritten_as_csv() {
    let (_dir, mut config) = workspace();
    let silver_path = config.project.silver_path();
    let mut silver = df!(
        "account_id" => [1i64, 2],
        "status" => [Some("A"), None]
    )
    .unwrap();
    fs::create_dir_all(&config.project.silver_dir).unwrap();
    let mut file = fs::File::create(&silver_path).unwrap();
    IpcWriter::new(&mut file).finish(&mut silver).unwrap();
    drop(file);
    config.project.from_scratch = false;

    let outcome = SilverPipeline::new(config).run().unwrap();

    assert_eq!(outcome.source, SilverSource::Loaded(SilverFormat::Ipc));
    assert_eq!(outcome.silver_output, Persistence::Written(silver_path.clone()));
    let (reloaded, format) = loan_ingest::load_silver(&silver_path).unwrap();
    assert_eq!(format, SilverFormat::Csv);
    assert!(reloaded.equals_missing(&silver));
}

#[test]
fn missing_persisted_silver_is_fatal() {
    let (_dir, mut config) = workspace();
    config.project.from_scratch = false;

    let err = SilverPipeline::new(config).run().unwrap_err();

    assert!(format!("{err:#}").contains("load silver table"));
}

#[test]
fn missing_source_file_aborts_run() {
    let (_dir, config) = workspace();
    fs::remove_file(config.project.data_dir.join("loan.asc")).unwrap();
    let silver_path = config.project.silver_path();

    let err = SilverPipeline::new(config).run().unwrap_err();

    assert!(format!("{err:#}").contains("ingest loan table"));
    assert!(!silver_path.exists());
}

#[test]
fn cast_failure_aborts_run() {
    let (_dir, config) = workspace();
    fs::write(
        config.project.data_dir.join("disp.asc"),
        "disp_id;client_id;account_id;type\n400;500;one;OWNER\n",
    )
    .unwrap();

    let err = SilverPipeline::new(config).run().unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("normalize disp table"));
    assert!(message.contains("account_id"));
}

#[test]
fn save_failure_keeps_the_run_alive() {
    let (dir, mut config) = workspace();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    config.project.silver_dir = blocker;

    let outcome = SilverPipeline::new(config).run().unwrap();

    assert!(outcome.silver_output.is_failed());
    assert_eq!(outcome.silver.height(), 2);
}

#[test]
fn save_bronze_writes_every_table() {
    let (_dir, mut config) = workspace();
    config.project.save_bronze = true;
    config.project.save_silver = false;
    let bronze_dir = config.project.bronze_dir.clone();

    let outcome = SilverPipeline::new(config).run().unwrap();

    assert_eq!(outcome.bronze_outputs.len(), 8);
    for kind in TableKind::ALL {
        assert!(bronze_dir.join(format!("{kind}.csv")).is_file(), "{kind}");
    }
    assert_eq!(outcome.silver_output, Persistence::Skipped);
}

#[test]
fn left_joins_keep_unmatched_rows_and_flag_schema() {
    let (_dir, mut config) = workspace();
    config.pipeline.joins = config.pipeline.joins.clone().with_kind(JoinKind::Left);
    config.project.save_silver = false;

    let outcome = SilverPipeline::new(config).run().unwrap();

    assert_eq!(outcome.silver.height(), 4);
    assert_eq!(
        outcome.report.verdict,
        SchemaVerdict::MismatchedSubsetPresent
    );
}

#[test]
fn config_file_drives_the_run() {
    let (dir, config) = workspace();
    let path = dir.path().join("loan.toml");
    fs::write(
        &path,
        format!(
            "[project]\ndata_dir = {:?}\nsave_silver = false\n\n\
             [pipeline.joins.account_loan]\nleft_on = [\"account_id\"]\n\
             right_on = [\"account_id\"]\nhow = \"left\"\nsuffixes = [\"_account\", \"_loan\"]\n",
            config.project.data_dir.display().to_string()
        ),
    )
    .unwrap();

    let loaded = LoanConfig::load(&path).unwrap();
    let outcome = SilverPipeline::new(loaded).run().unwrap();

    assert_eq!(outcome.silver_output, Persistence::Skipped);
    assert_eq!(outcome.silver.height(), 2);
}
