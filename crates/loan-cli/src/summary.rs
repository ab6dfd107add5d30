use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use loan_cli::pipeline::{Persistence, PipelineOutcome, SilverSource, TableSummary};
use loan_ingest::{NullAction, SilverFormat};

pub fn print_summary(outcome: &PipelineOutcome) {
    let source = match outcome.source {
        SilverSource::Built => "built from bronze tables",
        SilverSource::Loaded(SilverFormat::Csv) => "loaded from CSV",
        SilverSource::Loaded(SilverFormat::Ipc) => "loaded from Arrow IPC",
    };
    println!(
        "Silver: {} rows x {} columns ({source}, {:.2}s)",
        outcome.silver.height(),
        outcome.silver.width(),
        outcome.elapsed.as_secs_f64()
    );
    if !outcome.tables.is_empty() {
        print_table_summaries(&outcome.tables);
    }
    print_schema(outcome);
    print_persistence("Silver output", &outcome.silver_output);
    for (table, result) in &outcome.bronze_outputs {
        print_persistence(&format!("Bronze {table}"), result);
    }
}

fn print_table_summaries(summaries: &[TableSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("File"),
        header_cell("Rows read"),
        header_cell("Rows kept"),
        header_cell("Missing"),
        header_cell("Nulls"),
        header_cell("Bad dates"),
    ]);
    apply_summary_table_style(&mut table);
    for index in [2, 3, 4, 6] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_read = 0usize;
    let mut total_kept = 0usize;
    for summary in summaries {
        total_read += summary.rows_read;
        total_kept += summary.rows;
        let file = summary
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(summary.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(file),
            Cell::new(summary.rows_read),
            Cell::new(summary.rows),
            Cell::new(format!("{:.2}%", summary.missing_fraction * 100.0)),
            null_action_cell(summary.null_action),
            count_cell(summary.malformed_dates),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_read).add_attribute(Attribute::Bold),
        Cell::new(total_kept).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn print_schema(outcome: &PipelineOutcome) {
    let verdict = &outcome.report.verdict;
    if verdict.is_match() {
        println!("Schema: {verdict}");
        return;
    }
    eprintln!("Schema: {verdict}");
    for issue in &outcome.report.issues {
        eprintln!("- {issue}");
    }
}

fn print_persistence(label: &str, result: &Persistence) {
    match result {
        Persistence::Skipped => {}
        Persistence::Written(path) => println!("{label}: {}", path.display()),
        Persistence::Failed { path, message } => {
            eprintln!("{label}: failed to write {} ({message})", path.display());
        }
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn null_action_cell(action: NullAction) -> Cell {
    match action {
        NullAction::Clean => dim_cell("clean"),
        NullAction::Dropped { rows } => Cell::new(format!("dropped {rows}")).fg(Color::Yellow),
        NullAction::Retained => Cell::new("retained").fg(Color::Yellow),
    }
}

fn count_cell(count: Option<usize>) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
