//! Bronze table descriptions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight bronze tables of the loan dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Account,
    Card,
    Client,
    Disp,
    District,
    Loan,
    Order,
    Transactions,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Account,
        TableKind::Card,
        TableKind::Client,
        TableKind::Disp,
        TableKind::District,
        TableKind::Loan,
        TableKind::Order,
        TableKind::Transactions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableKind::Account => "account",
            TableKind::Card => "card",
            TableKind::Client => "client",
            TableKind::Disp => "disp",
            TableKind::District => "district",
            TableKind::Loan => "loan",
            TableKind::Order => "order",
            TableKind::Transactions => "transactions",
        }
    }

    /// District carries demographics only and skips dtype/date normalization.
    pub fn is_normalized(self) -> bool {
        self != TableKind::District
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared column type for bronze casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int")]
    Int64,
    Int32,
    #[serde(alias = "float")]
    Float64,
    #[serde(alias = "str", alias = "object")]
    String,
    #[serde(alias = "bool")]
    Boolean,
    Date,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Int32 => "int32",
            ColumnType::Float64 => "float64",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source file and schema of one bronze table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// File name relative to the project data directory.
    pub file: String,
    /// Declared column types applied before any join.
    #[serde(default)]
    pub dtypes: BTreeMap<String, ColumnType>,
    /// Column holding `date_format` strings, parsed into calendar dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_column: Option<String>,
    /// Columns inspected by the null-dropping policy (all columns when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_subset: Option<Vec<String>>,
}

impl TableSpec {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            dtypes: BTreeMap::new(),
            date_column: None,
            null_subset: None,
        }
    }

    #[must_use]
    pub fn with_dtypes(mut self, dtypes: &[(&str, ColumnType)]) -> Self {
        self.dtypes = dtypes
            .iter()
            .map(|(name, dtype)| ((*name).to_string(), *dtype))
            .collect();
        self
    }

    #[must_use]
    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_null_subset(mut self, columns: &[&str]) -> Self {
        self.null_subset = Some(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }
}

/// One [`TableSpec`] per bronze table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpecs {
    pub account: TableSpec,
    pub card: TableSpec,
    pub client: TableSpec,
    pub disp: TableSpec,
    pub district: TableSpec,
    pub loan: TableSpec,
    pub order: TableSpec,
    pub transactions: TableSpec,
}

impl TableSpecs {
    pub fn get(&self, kind: TableKind) -> &TableSpec {
        match kind {
            TableKind::Account => &self.account,
            TableKind::Card => &self.card,
            TableKind::Client => &self.client,
            TableKind::Disp => &self.disp,
            TableKind::District => &self.district,
            TableKind::Loan => &self.loan,
            TableKind::Order => &self.order,
            TableKind::Transactions => &self.transactions,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &TableSpec)> {
        TableKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

impl Default for TableSpecs {
    fn default() -> Self {
        use ColumnType::{Float64, Int64, String};

        Self {
            account: TableSpec::new("account.asc")
                .with_dtypes(&[
                    ("account_id", Int64),
                    ("district_id", Int64),
                    ("frequency", String),
                    ("date", String),
                ])
                .with_date_column("date"),
            card: TableSpec::new("card.asc").with_dtypes(&[
                ("card_id", Int64),
                ("disp_id", Int64),
                ("type", String),
                ("issued", String),
            ]),
            client: TableSpec::new("client.asc")
                .with_dtypes(&[
                    ("client_id", Int64),
                    ("birth_number", String),
                    ("district_id", Int64),
                ])
                .with_date_column("birth_number"),
            disp: TableSpec::new("disp.asc").with_dtypes(&[
                ("disp_id", Int64),
                ("client_id", Int64),
                ("account_id", Int64),
                ("type", String),
            ]),
            district: TableSpec::new("district.asc"),
            loan: TableSpec::new("loan.asc")
                .with_dtypes(&[
                    ("loan_id", Int64),
                    ("account_id", Int64),
                    ("date", String),
                    ("amount", Float64),
                    ("duration", Int64),
                    ("payments", Float64),
                    ("status", String),
                ])
                .with_date_column("date"),
            order: TableSpec::new("order.asc").with_dtypes(&[
                ("order_id", Int64),
                ("account_id", Int64),
                ("bank_to", String),
                ("account_to", Int64),
                ("amount", Float64),
                ("k_symbol", String),
            ]),
            transactions: TableSpec::new("trans.asc")
                .with_dtypes(&[
                    ("trans_id", Int64),
                    ("account_id", Int64),
                    ("date", String),
                    ("type", String),
                    ("operation", String),
                    ("amount", Float64),
                    ("balance", Float64),
                    ("k_symbol", String),
                    ("bank", String),
                    ("account", Float64),
                ])
                .with_date_column("date")
                .with_null_subset(&["trans_id", "account_id", "date", "type", "amount", "balance"]),
        }
    }
}
