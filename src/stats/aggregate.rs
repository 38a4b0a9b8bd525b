//! Aggregate Result Module
//! Explicit "column unavailable" contract shared by every aggregation.

use polars::prelude::DataFrame;

/// Outcome of one aggregation query.
///
/// An aggregation over a column the table does not have is not an error:
/// it yields `Unavailable` so the presenter can show an absence indicator
/// while every other analysis keeps running.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate<T> {
    Available(T),
    Unavailable { column: String },
}

impl<T> Aggregate<T> {
    /// Run `compute` only when `column` exists in `df`.
    pub fn when_present(df: &DataFrame, column: &str, compute: impl FnOnce() -> T) -> Self {
        if has_column(df, column) {
            Aggregate::Available(compute())
        } else {
            Aggregate::Unavailable {
                column: column.to_string(),
            }
        }
    }

    pub fn unavailable(column: &str) -> Self {
        Aggregate::Unavailable {
            column: column.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Aggregate::Available(_))
    }

    pub fn as_ref(&self) -> Aggregate<&T> {
        match self {
            Aggregate::Available(v) => Aggregate::Available(v),
            Aggregate::Unavailable { column } => Aggregate::Unavailable {
                column: column.clone(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Aggregate<U> {
        match self {
            Aggregate::Available(v) => Aggregate::Available(f(v)),
            Aggregate::Unavailable { column } => Aggregate::Unavailable { column },
        }
    }

    /// Drop the column name and keep only the value.
    pub fn into_option(self) -> Option<T> {
        match self {
            Aggregate::Available(v) => Some(v),
            Aggregate::Unavailable { .. } => None,
        }
    }

    /// Message for the presenter when the value is missing.
    pub fn absence_message(&self) -> Option<String> {
        match self {
            Aggregate::Available(_) => None,
            Aggregate::Unavailable { column } => {
                Some(format!("Column '{}' not available in dataset", column))
            }
        }
    }
}

/// Check whether a column exists in the DataFrame.
pub fn has_column(df: &DataFrame, column: &str) -> bool {
    df.get_column_index(column).is_some()
}
