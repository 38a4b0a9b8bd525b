//! View Snapshot
//! The filtered view of the cleaned table and every aggregate the dashboard
//! shows for it, recomputed on each filter or setting change.

use crate::config::Config;
use crate::data::{
    journal_options, FilterCriteria, FilterError, ViewFilter, JOURNAL_COLUMN, YEAR_COLUMN,
};
use crate::stats::{
    Aggregate, CountOrder, Counts, FrequencyCounter, HistogramBin, StatsCalculator, WordFilter,
};
use polars::prelude::*;
use std::ops::RangeInclusive;

pub const JOURNAL_SLIDER: RangeInclusive<usize> = 5..=30;
pub const WORD_SLIDER: RangeInclusive<usize> = 10..=50;

pub const ABSTRACT_BINS: usize = 50;
pub const TITLE_BINS: usize = 30;

/// Rows shown in the data tab.
pub const PREVIEW_ROWS: usize = 100;

/// Dashboard settings that shape the aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub top_journals: usize,
    pub top_words: usize,
    pub wordcloud_words: usize,
    pub word_filter: WordFilter,
}

impl ViewSettings {
    /// Slider values start from the configured counts, clamped to the
    /// slider ranges.
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_journals: config
                .report
                .top_journals
                .clamp(*JOURNAL_SLIDER.start(), *JOURNAL_SLIDER.end()),
            top_words: config
                .words
                .top_n
                .clamp(*WORD_SLIDER.start(), *WORD_SLIDER.end()),
            wordcloud_words: config.report.wordcloud_max_words,
            word_filter: config.word_filter(),
        }
    }
}

/// Aggregates of one filtered view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub view: DataFrame,
    /// Journals offered by the sidebar, from the year-filtered view
    pub journal_choices: Vec<String>,
    pub papers_by_year: Aggregate<Counts<i32>>,
    pub top_journals: Aggregate<Counts<String>>,
    pub journal_shares: Vec<f64>,
    pub top_words: Aggregate<Counts<String>>,
    pub cloud_words: Aggregate<Counts<String>>,
    pub unique_journals: Aggregate<usize>,
    pub unique_authors: Aggregate<usize>,
    pub avg_abstract_words: Aggregate<Option<f64>>,
    pub abstract_hist: Aggregate<Vec<HistogramBin>>,
    pub title_hist: Aggregate<Vec<HistogramBin>>,
}

impl ViewSnapshot {
    pub fn compute(
        cleaned: &DataFrame,
        criteria: &FilterCriteria,
        settings: &ViewSettings,
    ) -> Result<Self, FilterError> {
        let year_view = ViewFilter::apply_year_range(cleaned, criteria)?;
        let journal_choices = journal_options(&year_view);
        let view = ViewFilter::apply(cleaned, criteria)?;
        log::debug!("Filtered view: {} of {} rows", view.height(), cleaned.height());

        let top_journals = FrequencyCounter::count_by(
            &view,
            JOURNAL_COLUMN,
            CountOrder::ByFrequency,
            Some(settings.top_journals),
        );
        let journal_shares = match &top_journals {
            Aggregate::Available(counts) => FrequencyCounter::shares(counts),
            Aggregate::Unavailable { .. } => Vec::new(),
        };

        Ok(Self {
            journal_choices,
            papers_by_year: FrequencyCounter::count_by_year(&view, YEAR_COLUMN),
            top_journals,
            journal_shares,
            top_words: FrequencyCounter::top_words(
                &view,
                "title",
                settings.top_words,
                &settings.word_filter,
            ),
            cloud_words: FrequencyCounter::top_words(
                &view,
                "title",
                settings.wordcloud_words,
                &settings.word_filter,
            ),
            unique_journals: FrequencyCounter::n_unique(&view, JOURNAL_COLUMN),
            unique_authors: FrequencyCounter::n_unique(&view, "authors"),
            avg_abstract_words: StatsCalculator::mean(&view, "abstract_word_count"),
            abstract_hist: StatsCalculator::histogram(&view, "abstract_word_count", ABSTRACT_BINS),
            title_hist: StatsCalculator::histogram(&view, "title_word_count", TITLE_BINS),
            view,
        })
    }

    pub fn papers(&self) -> usize {
        self.view.height()
    }

    /// First and last publication year in the view.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        match &self.papers_by_year {
            Aggregate::Available(counts) => Some((counts.first()?.0, counts.last()?.0)),
            Aggregate::Unavailable { .. } => None,
        }
    }
}

/// Year slider bounds of the cleaned table.
pub fn year_bounds(cleaned: &DataFrame) -> Option<(i32, i32)> {
    let counts = FrequencyCounter::count_by_year(cleaned, YEAR_COLUMN).into_option()?;
    Some((counts.first()?.0, counts.last()?.0))
}

/// Text cells of the export columns, for the data tab grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn preview_table(view: &DataFrame, limit: usize) -> Result<PreviewTable, FilterError> {
    let export = ViewFilter::export_frame(view)?.head(Some(limit));

    let mut columns = Vec::with_capacity(export.width());
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(export.width());
    for column in export.get_columns() {
        columns.push(column.name().to_string());
        let text = column.as_materialized_series().cast(&DataType::String)?;
        cells.push(
            text.str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
        );
    }

    let rows = (0..export.height())
        .map(|i| cells.iter().map(|col| col[i].clone()).collect())
        .collect();
    Ok(PreviewTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cleaned() -> DataFrame {
        df!(
            "title" => [
                "Novel Coronavirus Spread Patterns",
                "Spread Dynamics Of Coronavirus",
                "Vaccine Trial Outcomes",
                "Hospital Capacity Planning",
            ],
            "abstract" => ["a b c", "", "d e", "f"],
            "journal" => ["Lancet", "BMJ", "Lancet", "Nature"],
            YEAR_COLUMN => [Some(2020i32), Some(2020), Some(2021), None],
            "abstract_word_count" => [3u32, 0, 2, 1],
            "title_word_count" => [4u32, 4, 3, 3],
        )
        .unwrap()
    }

    fn settings() -> ViewSettings {
        ViewSettings::from_config(&Config::default())
    }

    #[test]
    fn test_settings_follow_config() {
        let defaults = settings();
        assert_eq!((defaults.top_journals, defaults.top_words), (15, 20));

        let mut config = Config::default();
        config.report.top_journals = 8;
        config.words.top_n = 35;
        let custom = ViewSettings::from_config(&config);
        assert_eq!((custom.top_journals, custom.top_words), (8, 35));

        config.report.top_journals = 100;
        config.words.top_n = 3;
        let clamped = ViewSettings::from_config(&config);
        assert_eq!((clamped.top_journals, clamped.top_words), (30, 10));
    }

    #[test]
    fn test_unfiltered_snapshot() {
        let snap =
            ViewSnapshot::compute(&cleaned(), &FilterCriteria::default(), &settings()).unwrap();
        assert_eq!(snap.papers(), 4);
        assert_eq!(snap.year_span(), Some((2020, 2021)));
        assert_eq!(snap.journal_choices, vec!["Lancet", "BMJ", "Nature"]);
        assert_eq!(
            snap.top_journals,
            Aggregate::Available(vec![
                ("Lancet".to_string(), 2),
                ("BMJ".to_string(), 1),
                ("Nature".to_string(), 1),
            ])
        );
        assert_eq!(snap.journal_shares, vec![50.0, 25.0, 25.0]);
        assert_eq!(snap.avg_abstract_words, Aggregate::Available(Some(1.5)));
        assert!(!snap.unique_authors.is_available());
    }

    #[test]
    fn test_journal_choices_follow_year_filter() {
        let criteria = FilterCriteria {
            year_range: Some((2020, 2020)),
            journals: vec!["BMJ".to_string()],
            include_undated: false,
        };
        let snap = ViewSnapshot::compute(&cleaned(), &criteria, &settings()).unwrap();
        assert_eq!(snap.journal_choices, vec!["Lancet", "BMJ"]);
        assert_eq!(snap.papers(), 1);
        assert_eq!(
            snap.top_words,
            Aggregate::Available(vec![("spread".to_string(), 1), ("dynamics".to_string(), 1)])
        );
    }

    #[test]
    fn test_empty_view_gives_empty_aggregates() {
        let criteria = FilterCriteria {
            year_range: Some((1990, 1991)),
            ..Default::default()
        };
        let snap = ViewSnapshot::compute(&cleaned(), &criteria, &settings()).unwrap();
        assert_eq!(snap.papers(), 0);
        assert_eq!(snap.papers_by_year, Aggregate::Available(vec![]));
        assert_eq!(snap.top_journals, Aggregate::Available(vec![]));
        assert_eq!(snap.top_words, Aggregate::Available(vec![]));
        assert_eq!(snap.avg_abstract_words, Aggregate::Available(None));
        assert_eq!(snap.abstract_hist, Aggregate::Available(vec![]));
        assert_eq!(snap.year_span(), None);
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_bounds(&cleaned()), Some((2020, 2021)));
        assert_eq!(year_bounds(&df!("title" => ["x"]).unwrap()), None);
    }

    #[test]
    fn test_preview_table_uses_export_columns() {
        let table = preview_table(&cleaned(), 2).unwrap();
        assert_eq!(
            table.columns,
            vec!["title", "abstract", "journal", YEAR_COLUMN, "abstract_word_count"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], "");
        assert_eq!(table.rows[0][3], "2020");
    }
}
