//! Filtered View Module
//! Row selection by year range / journal set, and CSV export of the view.

use crate::data::YEAR_COLUMN;
use crate::stats::has_column;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Columns written when exporting the filtered view, in order, when present.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "title",
    "abstract",
    "authors",
    "journal",
    YEAR_COLUMN,
    "abstract_word_count",
];

pub const JOURNAL_COLUMN: &str = "journal";

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// User-selected criteria for the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive year bounds; `None` disables the year filter.
    pub year_range: Option<(i32, i32)>,
    /// Keep rows without a parsed year while a year range is active.
    pub include_undated: bool,
    /// Journals to keep; empty keeps every journal.
    pub journals: Vec<String>,
}

impl FilterCriteria {
    pub fn is_unfiltered(&self) -> bool {
        self.year_range.is_none() && self.journals.is_empty()
    }
}

/// Builds filtered views of the cleaned table.
pub struct ViewFilter;

impl ViewFilter {
    /// Select the rows of `df` matching `criteria`.
    ///
    /// A criterion whose column is absent is not applied.
    pub fn apply(df: &DataFrame, criteria: &FilterCriteria) -> Result<DataFrame, FilterError> {
        if criteria.is_unfiltered() {
            return Ok(df.clone());
        }
        let df = Self::apply_year_range(df, criteria)?;
        Self::apply_journals(&df, &criteria.journals)
    }

    /// Year-range step alone; the journal choices offered to the user come
    /// from this intermediate view.
    pub fn apply_year_range(
        df: &DataFrame,
        criteria: &FilterCriteria,
    ) -> Result<DataFrame, FilterError> {
        let Some((from, to)) = criteria.year_range else {
            return Ok(df.clone());
        };
        if !has_column(df, YEAR_COLUMN) {
            return Ok(df.clone());
        }

        let years = df
            .column(YEAR_COLUMN)?
            .as_materialized_series()
            .cast(&DataType::Int32)?;
        let mask: BooleanChunked = years
            .i32()?
            .into_iter()
            .map(|year| match year {
                Some(y) => y >= from && y <= to,
                None => criteria.include_undated,
            })
            .collect();
        Ok(df.filter(&mask)?)
    }

    fn apply_journals(df: &DataFrame, journals: &[String]) -> Result<DataFrame, FilterError> {
        if journals.is_empty() || !has_column(df, JOURNAL_COLUMN) {
            return Ok(df.clone());
        }

        let values = df
            .column(JOURNAL_COLUMN)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let mask: BooleanChunked = values
            .str()?
            .into_iter()
            .map(|j| j.is_some_and(|j| journals.iter().any(|s| s == j)))
            .collect();
        Ok(df.filter(&mask)?)
    }

    /// Export-column projection of the view (only the columns present).
    pub fn export_frame(df: &DataFrame) -> Result<DataFrame, FilterError> {
        let columns: Vec<&str> = EXPORT_COLUMNS
            .iter()
            .copied()
            .filter(|c| has_column(df, c))
            .collect();
        Ok(df.select(columns)?)
    }

    /// Write the export projection of the view as CSV with a header row.
    pub fn export_csv(df: &DataFrame, path: &Path) -> Result<usize, FilterError> {
        let mut export = Self::export_frame(df)?;
        let mut file = File::create(path).map_err(|source| FilterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut export)?;
        log::info!(
            "Exported {} rows, {} columns to {}",
            export.height(),
            export.width(),
            path.display()
        );
        Ok(export.height())
    }
}

/// Distinct journals of a view in first-seen order.
pub fn journal_options(df: &DataFrame) -> Vec<String> {
    let Ok(column) = df.column(JOURNAL_COLUMN) else {
        return Vec::new();
    };
    let Ok(values) = column.as_materialized_series().cast(&DataType::String) else {
        return Vec::new();
    };
    let mut seen = std::collections::HashSet::new();
    values
        .str()
        .map(|ca| {
            ca.into_iter()
                .flatten()
                .filter(|j| seen.insert(j.to_string()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
