//! Batch report: load, inspect, clean, aggregate and render the two images.

use crate::charts::{
    render_wordcloud, AnalysisPanels, StaticChartRenderer, ANALYSIS_CHART_SIZE, WORDCLOUD_SIZE,
};
use crate::config::Config;
use crate::data::{CleanedTable, DataCleaner, DataLoader, JOURNAL_COLUMN, YEAR_COLUMN};
use crate::stats::{has_column, Aggregate, CountOrder, Counts, FrequencyCounter, StatsCalculator};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::PathBuf;

/// Source columns in lookup order.
pub const SOURCE_COLUMNS: [&str; 2] = ["source_x", "source"];

/// Columns whose missing counts are highlighted in the overview.
const KEY_COLUMNS: [&str; 5] = ["title", "abstract", "publish_time", "authors", "journal"];

/// Number of leading columns listed in the overview missing counts.
const OVERVIEW_COLUMNS: usize = 10;

/// Paths written by a report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutputs {
    pub chart: PathBuf,
    pub wordcloud: Option<PathBuf>,
}

/// Paper counts per source, from `source_x` or else `source`.
pub fn source_counts(df: &DataFrame, top_n: usize) -> Aggregate<Counts<String>> {
    let column = SOURCE_COLUMNS
        .iter()
        .copied()
        .find(|c| has_column(df, c))
        .unwrap_or(SOURCE_COLUMNS[0]);
    FrequencyCounter::count_by(df, column, CountOrder::ByFrequency, Some(top_n))
}

/// Everything the report draws or logs after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub panels: AnalysisPanels,
    pub cloud_words: Aggregate<Counts<String>>,
    pub unique_journals: Aggregate<usize>,
    pub unique_authors: Aggregate<usize>,
    pub avg_abstract_words: Aggregate<Option<f64>>,
}

impl ReportData {
    pub fn compute(df: &DataFrame, config: &Config) -> Self {
        let filter = config.word_filter();
        let panels = AnalysisPanels {
            papers_by_year: FrequencyCounter::count_by_year(df, YEAR_COLUMN),
            top_journals: FrequencyCounter::count_by(
                df,
                JOURNAL_COLUMN,
                CountOrder::ByFrequency,
                Some(config.report.top_journals),
            ),
            top_words: FrequencyCounter::top_words(df, "title", config.words.top_n, &filter),
            top_sources: source_counts(df, config.report.top_sources),
        };

        Self {
            panels,
            cloud_words: FrequencyCounter::top_words(
                df,
                "title",
                config.report.wordcloud_max_words,
                &filter,
            ),
            unique_journals: FrequencyCounter::n_unique(df, JOURNAL_COLUMN),
            unique_authors: FrequencyCounter::n_unique(df, "authors"),
            avg_abstract_words: StatsCalculator::mean(df, "abstract_word_count"),
        }
    }

    /// First and last year with publications.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        match &self.panels.papers_by_year {
            Aggregate::Available(counts) => Some((counts.first()?.0, counts.last()?.0)),
            Aggregate::Unavailable { .. } => None,
        }
    }

    fn log_summary(&self) {
        log::info!("=== Analysis ===");
        match &self.panels.papers_by_year {
            Aggregate::Available(counts) => {
                for (year, count) in counts {
                    log::info!("  {}: {} papers", year, count);
                }
                if let Some((first, last)) = self.year_span() {
                    log::info!("Publication years range from {} to {}", first, last);
                }
            }
            Aggregate::Unavailable { column } => {
                log::warn!("Skipping yearly counts: column '{}' not available", column)
            }
        }

        match &self.panels.top_journals {
            Aggregate::Available(counts) => {
                log::info!("Top {} journals:", counts.len());
                let shares = FrequencyCounter::shares(counts);
                for ((journal, count), share) in counts.iter().zip(shares) {
                    log::info!("  {}: {} papers ({:.2}%)", journal, count, share);
                }
            }
            Aggregate::Unavailable { column } => {
                log::warn!("Skipping journal counts: column '{}' not available", column)
            }
        }

        match &self.panels.top_words {
            Aggregate::Available(counts) => {
                log::info!("Top {} title words:", counts.len());
                for (word, count) in counts {
                    log::info!("  {}: {}", word, count);
                }
            }
            Aggregate::Unavailable { column } => {
                log::warn!("Skipping word frequencies: column '{}' not available", column)
            }
        }

        match &self.panels.top_sources {
            Aggregate::Available(counts) => {
                log::info!("Papers by source:");
                for (source, count) in counts {
                    log::info!("  {}: {}", source, count);
                }
            }
            Aggregate::Unavailable { .. } => log::warn!("Source column not available in dataset"),
        }

        if let Aggregate::Available(n) = self.unique_journals {
            log::info!("Unique journals: {}", n);
        }
        if let Aggregate::Available(n) = self.unique_authors {
            log::info!("Unique author lists: {}", n);
        }
        if let Aggregate::Available(Some(mean)) = self.avg_abstract_words {
            log::info!("Average abstract length: {:.1} words", mean);
        }
    }
}

/// Log shape, dtypes, first rows, missing values and numeric summaries.
pub fn log_overview(raw: &DataFrame) {
    log::info!("=== Dataset overview ===");
    log::info!("Shape: {} rows x {} columns", raw.height(), raw.width());
    for (column, dtype) in DataLoader::get_dtypes(raw) {
        log::debug!("  {}: {}", column, dtype);
    }
    log::info!("First rows:\n{}", raw.head(Some(5)));

    log::info!("Missing values in the first {} columns:", OVERVIEW_COLUMNS);
    for column in raw.get_columns().iter().take(OVERVIEW_COLUMNS) {
        log::info!("  {}: {}", column.name(), column.null_count());
    }
    for column in KEY_COLUMNS {
        if let Ok(c) = raw.column(column) {
            log::info!("  missing {}: {}", column, c.null_count());
        }
    }

    let missing = StatsCalculator::missing_summary(raw);
    if missing.is_empty() {
        log::info!("No missing values");
    } else {
        log::info!("Columns with missing values:");
        for entry in &missing {
            log::info!("  {}: {} ({:.2}%)", entry.column, entry.missing, entry.percentage);
        }
    }

    for summary in StatsCalculator::describe_numeric(raw) {
        if let Some(n) = &summary.numeric {
            log::info!(
                "  {}: count={} mean={:.2} std={:.2} min={:.2} median={:.2} max={:.2}",
                summary.column,
                summary.count,
                n.mean,
                n.std,
                n.min,
                n.median,
                n.max
            );
        }
    }
}

fn log_cleaning(raw: &DataFrame, cleaned: &CleanedTable) {
    log::info!("=== Cleaning ===");
    for action in &cleaned.actions {
        log::info!("  {}", action);
    }
    log::info!("Shape before cleaning: {} x {}", raw.height(), raw.width());
    log::info!("Shape after cleaning: {} x {}", cleaned.df.height(), cleaned.df.width());
    log::info!(
        "Remaining missing values: {}",
        StatsCalculator::total_missing(&cleaned.df)
    );
}

/// Run the whole batch report.
pub fn run(config: &Config) -> Result<ReportOutputs> {
    let path = &config.data.path;
    log::info!("Loading {}", path.display());
    let raw = DataLoader::load_csv(path).context("Failed to load dataset")?;
    log_overview(&raw);

    let cleaned = DataCleaner::clean(&raw, &config.cleaning_options())
        .context("Failed to clean dataset")?;
    log_cleaning(&raw, &cleaned);

    let data = ReportData::compute(&cleaned.df, config);
    data.log_summary();

    std::fs::create_dir_all(&config.report.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.report.output_dir.display()
        )
    })?;

    let chart = config.chart_path();
    let buffer = StaticChartRenderer::render_analysis_chart(&data.panels, ANALYSIS_CHART_SIZE)
        .context("Failed to render analysis chart")?;
    StaticChartRenderer::save_png(buffer, ANALYSIS_CHART_SIZE, &chart)?;

    let wordcloud = match &data.cloud_words {
        Aggregate::Available(words) if !words.is_empty() => {
            let path = config.wordcloud_path();
            let buffer = render_wordcloud(
                words,
                WORDCLOUD_SIZE,
                Some("Word Cloud of COVID-19 Paper Titles"),
            )
            .context("Failed to render word cloud")?;
            StaticChartRenderer::save_png(buffer, WORDCLOUD_SIZE, &path)?;
            Some(path)
        }
        Aggregate::Available(_) => {
            log::warn!("No title words left after filtering, skipping word cloud");
            None
        }
        Aggregate::Unavailable { column } => {
            log::warn!("Skipping word cloud: column '{}' not available", column);
            None
        }
    };

    let outputs = ReportOutputs { chart, wordcloud };
    if config.report.open_outputs {
        for path in std::iter::once(&outputs.chart).chain(outputs.wordcloud.as_ref()) {
            if let Err(e) = open::that(path) {
                log::warn!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    log::info!("Analysis complete");
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_counts_prefers_source_x() {
        let df = df!(
            "source" => ["a", "b", "b"],
            "source_x" => ["PMC", "PMC", "WHO"],
        )
        .unwrap();
        assert_eq!(
            source_counts(&df, 10),
            Aggregate::Available(vec![("PMC".to_string(), 2), ("WHO".to_string(), 1)])
        );
    }

    #[test]
    fn test_source_counts_falls_back_to_source() {
        let df = df!("source" => ["a", "b", "b"]).unwrap();
        assert_eq!(
            source_counts(&df, 1),
            Aggregate::Available(vec![("b".to_string(), 2)])
        );
    }

    #[test]
    fn test_source_counts_unavailable() {
        let df = df!("title" => ["x"]).unwrap();
        assert!(!source_counts(&df, 10).is_available());
    }

    #[test]
    fn test_report_data_year_span() {
        let df = df!(
            "title" => ["Spread of infection", "Vaccine trial results", "Spread modelling"],
            "journal" => ["Lancet", "BMJ", "Lancet"],
            YEAR_COLUMN => [Some(2021i32), Some(2019), None],
        )
        .unwrap();
        let data = ReportData::compute(&df, &Config::default());
        assert_eq!(data.year_span(), Some((2019, 2021)));
        assert_eq!(
            data.panels.top_journals,
            Aggregate::Available(vec![("Lancet".to_string(), 2), ("BMJ".to_string(), 1)])
        );
        assert!(!data.panels.top_sources.is_available());
        assert!(!data.avg_abstract_words.is_available());
    }

    #[test]
    fn test_run_fails_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.path = dir.path().join("missing.csv");
        config.report.output_dir = dir.path().to_path_buf();
        assert!(run(&config).is_err());
    }
}
