//! Stats module - Aggregations over record tables

mod aggregate;
mod calculator;
mod frequency;

pub use aggregate::{has_column, Aggregate};
pub use calculator::{ColumnSummary, HistogramBin, MissingSummary, NumericSummary, StatsCalculator};
pub use frequency::{
    CountOrder, Counts, FrequencyCounter, WordFilter, DEFAULT_MIN_WORD_LENGTH, DEFAULT_STOP_WORDS,
};
