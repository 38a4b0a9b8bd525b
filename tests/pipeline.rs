//! Integration tests for the load -> clean -> filter -> aggregate pipeline.
//!
//! These tests run against a small slice of metadata rows in tests/fixtures.

use cord19_explorer::config::Config;
use cord19_explorer::data::{
    CleanedTable, CleaningOptions, DataCleaner, DataLoader, DatasetCache, FilterCriteria,
    LoaderError, ViewFilter, YEAR_COLUMN,
};
use cord19_explorer::gui::{ViewSettings, ViewSnapshot};
use cord19_explorer::report::{source_counts, ReportData};
use cord19_explorer::stats::{
    Aggregate, CountOrder, FrequencyCounter, StatsCalculator, WordFilter,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/metadata_sample.csv")
}

fn cleaned() -> CleanedTable {
    let raw = DataLoader::load_csv(&fixture()).expect("fixture loads");
    DataCleaner::clean(&raw, &CleaningOptions::default()).expect("fixture cleans")
}

fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Loading and Cleaning
// ============================================================================

#[test]
fn test_missing_source_is_reported() {
    let err = DataLoader::load_csv(&PathBuf::from("does/not/exist.csv")).unwrap_err();
    assert!(matches!(err, LoaderError::SourceNotFound(_)));
}

#[test]
fn test_cleaning_drops_untitled_rows_only() {
    let raw = DataLoader::load_csv(&fixture()).unwrap();
    assert_eq!(raw.height(), 6);

    let table = cleaned();
    assert_eq!(table.df.height(), 5);
    assert!(strings(&table.df, "title").iter().all(Option::is_some));
    assert!(table
        .actions
        .iter()
        .any(|a| a == "Removed 1 rows with missing title"));
}

#[test]
fn test_missing_mandatory_column_keeps_every_row() {
    let raw = DataLoader::load_csv(&fixture()).unwrap();
    let options = CleaningOptions {
        mandatory_column: "pmcid".to_string(),
        ..Default::default()
    };
    let table = DataCleaner::clean(&raw, &options).unwrap();
    assert_eq!(table.df.height(), raw.height());
}

#[test]
fn test_fill_defaults_leave_no_missing_values() {
    let df = cleaned().df;
    for column in ["abstract", "authors", "journal"] {
        assert_eq!(df.column(column).unwrap().null_count(), 0, "{}", column);
    }
    assert_eq!(strings(&df, "abstract")[1], Some(String::new()));
    assert_eq!(strings(&df, "authors")[2], Some("Unknown".to_string()));
    assert_eq!(strings(&df, "journal")[2], Some("Unknown".to_string()));
}

#[test]
fn test_derived_columns() {
    let df = cleaned().df;
    let abstract_counts: Vec<Option<u32>> = df
        .column("abstract_word_count")
        .unwrap()
        .as_materialized_series()
        .u32()
        .unwrap()
        .into_iter()
        .collect();
    // "Shedding duration was measured in a b  c" has eight tokens
    assert_eq!(
        abstract_counts,
        vec![Some(8), Some(0), Some(5), Some(7), Some(8)]
    );

    let years: Vec<Option<i32>> = df
        .column(YEAR_COLUMN)
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(years, vec![Some(2020), Some(2020), Some(2021), None, Some(2019)]);
}

// ============================================================================
// Aggregations
// ============================================================================

#[test]
fn test_papers_by_year_ascending() {
    let df = cleaned().df;
    assert_eq!(
        FrequencyCounter::count_by_year(&df, YEAR_COLUMN),
        Aggregate::Available(vec![(2019, 1), (2020, 2), (2021, 1)])
    );
}

#[test]
fn test_count_by_value_on_years() {
    let df = df!(YEAR_COLUMN => [2020i32, 2020, 2021]).unwrap();
    assert_eq!(
        FrequencyCounter::count_by(&df, YEAR_COLUMN, CountOrder::ByValue, None),
        Aggregate::Available(vec![("2020".to_string(), 2), ("2021".to_string(), 1)])
    );
}

#[test]
fn test_top_title_words() {
    let df = cleaned().df;
    let words = FrequencyCounter::top_words(&df, "title", 3, &WordFilter::default());
    assert_eq!(
        words,
        Aggregate::Available(vec![
            ("spread".to_string(), 2),
            ("patterns".to_string(), 1),
            ("dynamics".to_string(), 1),
        ])
    );
}

#[test]
fn test_top_journals_and_sources() {
    let df = cleaned().df;
    assert_eq!(
        FrequencyCounter::count_by(&df, "journal", CountOrder::ByFrequency, Some(2)),
        Aggregate::Available(vec![("Lancet".to_string(), 2), ("BMJ".to_string(), 1)])
    );
    assert_eq!(
        source_counts(&df, 10),
        Aggregate::Available(vec![
            ("PMC".to_string(), 2),
            ("Elsevier".to_string(), 1),
            ("WHO".to_string(), 1),
            ("Medline".to_string(), 1),
        ])
    );
}

#[test]
fn test_missing_column_is_unavailable_not_fatal() {
    let df = cleaned().df.drop("journal").unwrap();
    let data = ReportData::compute(&df, &Config::default());
    assert_eq!(
        data.panels.top_journals,
        Aggregate::Unavailable {
            column: "journal".to_string()
        }
    );
    assert!(data.panels.papers_by_year.is_available());
    assert!(data.panels.top_words.is_available());
}

#[test]
fn test_describe_reports_missing_columns() {
    let df = cleaned().df;
    let summaries = StatsCalculator::describe(&df, &["abstract_word_count", "pmcid"]);
    assert!(summaries[0].is_available());
    assert!(!summaries[1].is_available());
}

// ============================================================================
// Filtering and Export
// ============================================================================

#[test]
fn test_empty_filter_gives_empty_aggregates() {
    let df = cleaned().df;
    let criteria = FilterCriteria {
        year_range: Some((1990, 1999)),
        ..Default::default()
    };
    let view = ViewFilter::apply(&df, &criteria).unwrap();
    assert_eq!(view.height(), 0);

    assert_eq!(
        FrequencyCounter::count_by_year(&view, YEAR_COLUMN),
        Aggregate::Available(vec![])
    );
    assert_eq!(
        FrequencyCounter::count_by(&view, "journal", CountOrder::ByFrequency, Some(15)),
        Aggregate::Available(vec![])
    );
    assert_eq!(
        FrequencyCounter::top_words(&view, "title", 20, &WordFilter::default()),
        Aggregate::Available(vec![])
    );
}

#[test]
fn test_snapshot_with_journal_filter() {
    let df = cleaned().df;
    let criteria = FilterCriteria {
        year_range: Some((2020, 2021)),
        include_undated: true,
        journals: vec!["Lancet".to_string(), "Unknown".to_string()],
    };
    let settings = ViewSettings::from_config(&Config::default());
    let snapshot = ViewSnapshot::compute(&df, &criteria, &settings).unwrap();

    assert_eq!(snapshot.journal_choices, vec!["Lancet", "BMJ", "Unknown", "Nature"]);
    assert_eq!(snapshot.papers(), 2);
    assert_eq!(
        strings(&snapshot.view, "title"),
        vec![
            Some("Novel Coronavirus Spread Patterns".to_string()),
            Some("Hospital Capacity Planning During Outbreaks".to_string()),
        ]
    );
}

#[test]
fn test_export_then_reload_keeps_rows_and_columns() {
    let df = cleaned().df;
    let criteria = FilterCriteria {
        year_range: Some((2020, 2021)),
        ..Default::default()
    };
    let view = ViewFilter::apply(&df, &criteria).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid19_filtered_data.csv");
    let written = ViewFilter::export_csv(&view, &path).unwrap();
    assert_eq!(written, 3);

    let reloaded = DataLoader::load_csv(&path).unwrap();
    assert_eq!(reloaded.height(), view.height());
    assert_eq!(
        column_names(&reloaded),
        vec![
            "title",
            "abstract",
            "authors",
            "journal",
            YEAR_COLUMN,
            "abstract_word_count"
        ]
    );
}

#[test]
fn test_cache_serves_cleaned_table() {
    let mut cache = DatasetCache::new();
    let options = CleaningOptions::default();
    let first = cache.get_or_load(&fixture(), &options).unwrap().content_hash;
    let dataset = cache.get_or_load(&fixture(), &options).unwrap();
    assert_eq!(dataset.content_hash, first);
    assert_eq!(dataset.raw.height(), 6);
    assert_eq!(dataset.cleaned.df.height(), 5);
}
