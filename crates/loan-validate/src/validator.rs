use std::collections::BTreeSet;

use loan_model::{ExpectedSchema, SchemaIssue, SchemaReport, SchemaVerdict};
use loan_transform::polars_dtype;
use polars::prelude::DataFrame;
use tracing::debug;

/// Every difference between `df` and `schema`, in schema column order.
///
/// Strict schemas additionally report columns the schema does not list.
pub fn schema_issues(df: &DataFrame, schema: &ExpectedSchema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    for expected in &schema.columns {
        let Ok(column) = df.column(&expected.name) else {
            issues.push(SchemaIssue::MissingColumn {
                column: expected.name.clone(),
            });
            continue;
        };
        if let Some(dtype) = expected.dtype
            && column.dtype() != &polars_dtype(dtype)
        {
            issues.push(SchemaIssue::WrongType {
                column: expected.name.clone(),
                expected: dtype,
                actual: column.dtype().to_string(),
            });
        }
        let nulls = column.null_count();
        if !expected.nullable && nulls > 0 {
            issues.push(SchemaIssue::UnexpectedNulls {
                column: expected.name.clone(),
                count: nulls,
            });
        }
    }
    if schema.strict {
        let known: BTreeSet<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        for name in df.get_column_names() {
            if !known.contains(name.as_str()) {
                issues.push(SchemaIssue::UnexpectedColumn {
                    column: name.to_string(),
                });
            }
        }
    }
    issues
}

/// Compare `df` against `schema` and summarise the result as a verdict.
///
/// When the schema does not match, `required` decides between the three
/// mismatch verdicts: all required columns present, some missing, or no
/// subset supplied at all. An empty subset counts as none.
pub fn validate_schema(
    df: &DataFrame,
    schema: &ExpectedSchema,
    required: Option<&[String]>,
) -> SchemaReport {
    let issues = schema_issues(df, schema);
    if issues.is_empty() {
        return SchemaReport::matched();
    }
    for issue in &issues {
        debug!(%issue, "schema issue");
    }
    let verdict = match required {
        // An empty subset checks nothing.
        None => SchemaVerdict::MismatchedNotChecked,
        Some([]) => SchemaVerdict::MismatchedNotChecked,
        Some(columns) => {
            let missing: Vec<&str> = columns
                .iter()
                .map(String::as_str)
                .filter(|name| df.column(name).is_err())
                .collect();
            if missing.is_empty() {
                SchemaVerdict::MismatchedSubsetPresent
            } else {
                debug!(?missing, "required columns missing");
                SchemaVerdict::MismatchedSubsetMissing
            }
        }
    };
    SchemaReport { verdict, issues }
}
