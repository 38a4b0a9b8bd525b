//! Data Cleaner Module
//! Fills missing values, drops untitled rows and derives year / word-count columns.

use crate::stats::has_column;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

/// Derived column holding the calendar year of the date column.
pub const YEAR_COLUMN: &str = "publication_year";
/// Text columns that receive a `<name>_word_count` column.
pub const WORD_COUNT_SOURCES: [&str; 2] = ["abstract", "title"];

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Column choices for a cleaning run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOptions {
    /// Rows missing this column are removed.
    pub mandatory_column: String,
    /// Column -> default for missing entries, applied in order.
    pub fill_defaults: Vec<(String, String)>,
    /// Column parsed into `publication_year`.
    pub date_column: String,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            mandatory_column: "title".to_string(),
            fill_defaults: vec![
                ("abstract".to_string(), String::new()),
                ("authors".to_string(), "Unknown".to_string()),
                ("journal".to_string(), "Unknown".to_string()),
            ],
            date_column: "publish_time".to_string(),
        }
    }
}

/// A cleaned table plus the log of what cleaning did to it.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub df: DataFrame,
    pub actions: Vec<String>,
}

/// Handles data cleaning and feature derivation.
pub struct DataCleaner;

impl DataCleaner {
    /// Build the cleaned record table from the raw one.
    ///
    /// Columns named in the options but absent from `raw` are skipped
    /// silently; only Polars failures surface as errors.
    pub fn clean(raw: &DataFrame, options: &CleaningOptions) -> Result<CleanedTable, CleanerError> {
        let mut actions = Vec::new();

        let fills: Vec<Expr> = options
            .fill_defaults
            .iter()
            .filter(|(column, _)| has_column(raw, column))
            .map(|(column, default)| {
                actions.push(format!("Filled missing {} with {:?}", column, default));
                col(column.as_str())
                    .cast(DataType::String)
                    .fill_null(lit(default.clone()))
            })
            .collect();

        let mut lazy = raw.clone().lazy();
        if !fills.is_empty() {
            lazy = lazy.with_columns(fills);
        }

        let mandatory = options.mandatory_column.as_str();
        let drop_untitled = has_column(raw, mandatory);
        if drop_untitled {
            lazy = lazy.filter(col(mandatory).is_not_null());
        } else {
            log::debug!("Mandatory column '{}' absent, keeping all rows", mandatory);
        }

        let mut df = lazy.collect()?;

        if drop_untitled {
            let removed = raw.height() - df.height();
            actions.push(format!("Removed {} rows with missing {}", removed, mandatory));
        }

        if has_column(&df, &options.date_column) {
            let years = Self::extract_years(&df, &options.date_column)?;
            let unparsed = years.null_count();
            df.with_column(years)?;
            actions.push(format!(
                "Extracted {} from {} ({} values unparseable)",
                YEAR_COLUMN, options.date_column, unparsed
            ));
        }

        for source in WORD_COUNT_SOURCES {
            if has_column(&df, source) {
                let counts = Self::word_count_column(&df, source)?;
                df.with_column(counts)?;
                actions.push(format!("Created {}_word_count column", source));
            }
        }

        for action in &actions {
            log::info!("{}", action);
        }

        Ok(CleanedTable { df, actions })
    }

    /// Parse every value of `date_column` into an optional calendar year.
    fn extract_years(df: &DataFrame, date_column: &str) -> Result<Column, CleanerError> {
        let text = df
            .column(date_column)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let years: Vec<Option<i32>> = text
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_year))
            .collect();
        Ok(Column::new(YEAR_COLUMN.into(), years))
    }

    /// Whitespace token counts for a text column; missing text counts as zero.
    fn word_count_column(df: &DataFrame, source: &str) -> Result<Column, CleanerError> {
        let text = df
            .column(source)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let counts: Vec<u32> = text.str()?.into_iter().map(word_count).collect();
        Ok(Column::new(format!("{}_word_count", source).into(), counts))
    }
}

/// Number of whitespace-separated tokens; `None` is zero.
pub fn word_count(text: Option<&str>) -> u32 {
    text.map(|s| s.split_whitespace().count() as u32).unwrap_or(0)
}

/// Date layouts seen in publication metadata, tried in order.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%Y %b %d",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a date-like string into its calendar year.
///
/// Unparseable input yields `None` instead of an error.
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Bare year, or year-month
    if let Some(year) = bare_year(value) {
        return Some(year);
    }
    if let Some((y, m)) = value.split_once('-') {
        if m.len() <= 2 && !m.is_empty() && m.chars().all(|c| c.is_ascii_digit()) {
            if let (Some(year), Ok(month)) = (bare_year(y), m.parse::<u32>()) {
                return (1..=12).contains(&month).then_some(year);
            }
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.year());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.year());
        }
    }
    None
}

fn bare_year(value: &str) -> Option<i32> {
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}
