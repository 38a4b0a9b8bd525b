//! Statistics Calculator Module
//! Descriptive statistics, missing-value summaries and histograms.

use crate::data::is_numeric;
use crate::stats::{has_column, Aggregate};
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Summary of the numeric values of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Summary of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub dtype: String,
    pub count: usize,
    pub missing: usize,
    pub numeric: Option<NumericSummary>,
}

/// Missing values of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSummary {
    pub column: String,
    pub missing: usize,
    pub percentage: f64,
}

/// One equal-width histogram bin; the last bin includes its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Handles statistical calculations over the record tables.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// Returns `None` for an empty slice.
    pub fn compute_descriptive_stats(values: &[f64]) -> Option<NumericSummary> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(NumericSummary {
            mean: Statistics::mean(values),
            std: Statistics::std_dev(values),
            min: Statistics::min(values),
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: Statistics::max(values),
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Non-missing values of a column as `f64`.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Vec<f64> {
        df.column(column)
            .and_then(|c| c.as_materialized_series().cast(&DataType::Float64))
            .ok()
            .map(|s| {
                s.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().filter(|v| !v.is_nan()).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Summarise the requested columns; absent columns are `Unavailable`.
    pub fn describe(df: &DataFrame, columns: &[&str]) -> Vec<Aggregate<ColumnSummary>> {
        columns
            .iter()
            .map(|&name| {
                let Ok(column) = df.column(name) else {
                    return Aggregate::unavailable(name);
                };
                let numeric = if is_numeric(column.dtype()) {
                    Self::compute_descriptive_stats(&Self::numeric_values(df, name))
                } else {
                    None
                };
                Aggregate::Available(ColumnSummary {
                    column: name.to_string(),
                    dtype: column.dtype().to_string(),
                    count: column.len() - column.null_count(),
                    missing: column.null_count(),
                    numeric,
                })
            })
            .collect()
    }

    /// Summaries of every numeric column of the table.
    pub fn describe_numeric(df: &DataFrame) -> Vec<ColumnSummary> {
        let names: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| is_numeric(c.dtype()))
            .map(|c| c.name().to_string())
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::describe(df, &refs)
            .into_iter()
            .filter_map(Aggregate::into_option)
            .collect()
    }

    /// Columns with missing values, highest percentage first.
    pub fn missing_summary(df: &DataFrame) -> Vec<MissingSummary> {
        let rows = df.height();
        let mut summary: Vec<MissingSummary> = df
            .get_columns()
            .iter()
            .filter(|c| c.null_count() > 0)
            .map(|c| MissingSummary {
                column: c.name().to_string(),
                missing: c.null_count(),
                percentage: c.null_count() as f64 / rows as f64 * 100.0,
            })
            .collect();
        summary.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        summary
    }

    /// Total missing cells across the table.
    pub fn total_missing(df: &DataFrame) -> usize {
        df.get_columns().iter().map(|c| c.null_count()).sum()
    }

    /// Mean of a numeric column; `None` inside when it has no values.
    pub fn mean(df: &DataFrame, column: &str) -> Aggregate<Option<f64>> {
        Aggregate::when_present(df, column, || {
            let values = Self::numeric_values(df, column);
            (!values.is_empty()).then(|| Statistics::mean(&values))
        })
    }

    /// Equal-width histogram of a numeric column.
    pub fn histogram(df: &DataFrame, column: &str, bins: usize) -> Aggregate<Vec<HistogramBin>> {
        if !has_column(df, column) {
            return Aggregate::unavailable(column);
        }
        Aggregate::Available(Self::bin_values(&Self::numeric_values(df, column), bins))
    }

    fn bin_values(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let mut lo = Statistics::min(values);
        let mut hi = Statistics::max(values);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;

        let mut result: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                start: lo + i as f64 * width,
                end: lo + (i + 1) as f64 * width,
                count: 0,
            })
            .collect();

        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            result[idx].count += 1;
        }
        result
    }
}
