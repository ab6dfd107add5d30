//! Silver table persistence.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;

use crate::csv::read_delimited;
use crate::error::{IngestError, Result};

/// Format a persisted silver table was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilverFormat {
    /// Comma-separated text.
    Csv,
    /// Arrow IPC binary.
    Ipc,
}

/// Write a table as comma-separated text, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .map_err(|e| IngestError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::debug!(path = %path.display(), rows = df.height(), "wrote csv table");
    Ok(())
}

/// Load a persisted silver table.
///
/// Comma-separated text is tried first, Arrow IPC second; the call fails only
/// when both readers reject the file.
pub fn load_silver(path: &Path) -> Result<(DataFrame, SilverFormat)> {
    let text_error = match read_delimited(path, b',') {
        Ok(df) => return Ok((df, SilverFormat::Csv)),
        Err(IngestError::FileNotFound { path }) => return Err(IngestError::FileNotFound { path }),
        Err(error) => error,
    };
    tracing::warn!(
        path = %path.display(),
        error = %text_error,
        "silver table is not delimited text; trying Arrow IPC"
    );

    let binary = File::open(path)
        .map_err(PolarsError::from)
        .and_then(|file| IpcReader::new(file).finish());
    match binary {
        Ok(df) => Ok((df, SilverFormat::Ipc)),
        Err(binary_error) => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            text: text_error.to_string(),
            binary: binary_error.to_string(),
        }),
    }
}

fn create_file(path: &Path) -> Result<File> {
    let to_write_error = |e: std::io::Error| IngestError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    File::create(path).map_err(to_write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silver() -> DataFrame {
        df!(
            "account_id" => [1i64, 2, 3],
            "status" => [Some("A"), None, Some("C")],
            "amount" => [100.5f64, 200.0, 300.25]
        )
        .unwrap()
    }

    fn write_ipc(df: &mut DataFrame, path: &Path) {
        let mut file = File::create(path).unwrap();
        IpcWriter::new(&mut file).finish(df).unwrap();
    }

    #[test]
    fn csv_round_trip_keeps_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("silver.csv");
        let mut df = silver();

        write_csv(&mut df, &path).unwrap();
        let (loaded, format) = load_silver(&path).unwrap();

        assert_eq!(format, SilverFormat::Csv);
        assert_eq!(loaded.height(), df.height());
        assert_eq!(loaded.get_column_names(), df.get_column_names());
        assert_eq!(loaded.column("status").unwrap().null_count(), 1);
    }

    #[test]
    fn ipc_is_loaded_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silver.csv");
        let mut df = silver();

        write_ipc(&mut df, &path);
        let (loaded, format) = load_silver(&path).unwrap();

        assert_eq!(format, SilverFormat::Ipc);
        assert!(loaded.equals_missing(&df));
    }

    #[test]
    fn missing_silver_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_silver(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let mut df = silver();

        let result = write_csv(&mut df, &blocker.join("silver.csv"));
        assert!(matches!(result, Err(IngestError::Write { .. })));
    }
}
