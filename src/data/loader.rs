//! CSV Data Loader Module
//! Handles CSV file loading and column inspection using Polars.

use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Free-text and date columns, always read as strings so a value past the
/// inference window is never coerced to null.
pub const TEXT_COLUMNS: [&str; 7] = [
    "title",
    "abstract",
    "authors",
    "journal",
    "publish_time",
    "source_x",
    "source",
];

/// Rows Polars samples to infer the remaining column types.
const INFER_SCHEMA_ROWS: usize = 10000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Failed to parse {} as CSV: {source}", .path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoaderError {
    /// Classify an I/O failure on `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::SourceNotFound(path.to_path_buf()),
            _ => Self::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Handles CSV file loading with Polars for high performance.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file into the raw record table.
    ///
    /// A missing path is `SourceNotFound`; anything Polars cannot turn into a
    /// table is `MalformedSource`.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::SourceNotFound(path.to_path_buf()));
        }

        let malformed = |source: PolarsError| LoaderError::MalformedSource {
            path: path.to_path_buf(),
            source,
        };

        let overrides = Self::text_overrides(path).map_err(malformed)?;

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_dtype_overwrite(Some(overrides))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(malformed)?;

        if df.width() == 0 {
            return Err(malformed(PolarsError::NoData(
                "CSV file has no columns".into(),
            )));
        }

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// String dtype overrides for the text columns present in the header.
    fn text_overrides(path: &Path) -> PolarsResult<SchemaRef> {
        let header = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect_schema()?;

        let overrides: Schema = header
            .iter_names()
            .filter(|name| TEXT_COLUMNS.contains(&name.as_str()))
            .map(|name| (name.clone(), DataType::String))
            .collect();
        Ok(Arc::new(overrides))
    }

    /// Get list of column names from a DataFrame.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get list of numeric column names.
    pub fn get_numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Column name and dtype pairs, for the dataset overview.
    pub fn get_dtypes(df: &DataFrame) -> Vec<(String, String)> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.dtype().to_string()))
            .collect()
    }
}

/// Whether a Polars dtype holds numbers.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CleaningOptions, DataCleaner, YEAR_COLUMN};
    use crate::stats::{Aggregate, FrequencyCounter};
    use std::fs;

    #[test]
    fn test_missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, LoaderError::SourceNotFound(p) if p == path));
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "").unwrap();
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedSource { .. }));
    }

    #[test]
    fn test_loads_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "title,journal,pubmed_id\nA,J1,1\nB,,2\n").unwrap();

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            DataLoader::get_columns(&df),
            vec!["title", "journal", "pubmed_id"]
        );
        assert_eq!(DataLoader::get_numeric_columns(&df), vec!["pubmed_id"]);
        // empty CSV fields are missing values
        assert_eq!(df.column("journal").unwrap().null_count(), 1);
    }

    /// Write a CSV whose `column` holds `early` for the whole inference
    /// window and `late` in the final row.
    fn write_late_value(path: &Path, column: &str, early: &str, late: &str) {
        let mut csv = format!("{},journal\n", column);
        for _ in 0..INFER_SCHEMA_ROWS {
            csv.push_str(&format!("{},J1\n", early));
        }
        csv.push_str(&format!("{},J2\n", late));
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn test_date_after_inference_window_keeps_its_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        write_late_value(&path, "publish_time", "2020", "2021-05-01");

        let raw = DataLoader::load_csv(&path).unwrap();
        assert_eq!(raw.column("publish_time").unwrap().dtype(), &DataType::String);
        assert_eq!(raw.column("publish_time").unwrap().null_count(), 0);

        let table = DataCleaner::clean(&raw, &CleaningOptions::default()).unwrap();
        assert_eq!(
            FrequencyCounter::count_by_year(&table.df, YEAR_COLUMN),
            Aggregate::Available(vec![(2020, INFER_SCHEMA_ROWS), (2021, 1)])
        );
    }

    #[test]
    fn test_title_after_inference_window_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        write_late_value(&path, "title", "42", "Spread Dynamics Of Coronavirus");

        let raw = DataLoader::load_csv(&path).unwrap();
        assert_eq!(raw.column("title").unwrap().null_count(), 0);

        let table = DataCleaner::clean(&raw, &CleaningOptions::default()).unwrap();
        assert_eq!(table.df.height(), INFER_SCHEMA_ROWS + 1);
        assert!(table
            .actions
            .iter()
            .any(|a| a == "Removed 0 rows with missing title"));
    }

    #[test]
    fn test_non_text_columns_keep_inferred_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "title,publish_time,pubmed_id\n1,2020,7\n2,2021,8\n").unwrap();

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.column("title").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("publish_time").unwrap().dtype(), &DataType::String);
        assert_eq!(DataLoader::get_numeric_columns(&df), vec!["pubmed_id"]);
    }

    #[test]
    fn test_io_errors_are_classified() {
        let path = Path::new("metadata.csv");
        let missing = LoaderError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing, LoaderError::SourceNotFound(_)));

        let denied = LoaderError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, LoaderError::Unreadable { .. }));
    }
}
