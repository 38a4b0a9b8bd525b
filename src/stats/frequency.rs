//! Frequency Counting Module
//! Value counts for time series and rankings, plus title word frequencies.

use crate::data::is_numeric;
use crate::stats::Aggregate;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Ordered (key, count) pairs.
pub type Counts<K> = Vec<(K, usize)>;

/// Default stop words: common English function words plus corpus noise terms.
pub const DEFAULT_STOP_WORDS: [&str; 35] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "be", "been", "covid", "19", "coronavirus", "sars", "cov",
    "covid-19", "novel", "new", "study", "research", "analysis", "case", "effect", "related",
];

/// Minimum token length kept by `top_words` unless configured otherwise.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 4;

/// How `count_by` orders its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOrder {
    /// Ascending by value (numeric-aware), for time series
    ByValue,
    /// Descending by count, ties in first-seen order, for rankings
    ByFrequency,
}

/// Token filter for word frequency counting.
#[derive(Debug, Clone, PartialEq)]
pub struct WordFilter {
    pub stop_words: HashSet<String>,
    pub min_length: usize,
}

impl Default for WordFilter {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_length: DEFAULT_MIN_WORD_LENGTH,
        }
    }
}

impl WordFilter {
    /// Whether a lower-cased token is counted.
    pub fn accepts(&self, token: &str) -> bool {
        !token.is_empty()
            && token.chars().all(char::is_alphabetic)
            && token.chars().count() >= self.min_length
            && !self.stop_words.contains(token)
    }
}

/// Stateless frequency computations over a table.
pub struct FrequencyCounter;

impl FrequencyCounter {
    /// Count occurrences of each non-missing value of `column`.
    pub fn count_by(
        df: &DataFrame,
        column: &str,
        order: CountOrder,
        top_n: Option<usize>,
    ) -> Aggregate<Counts<String>> {
        Aggregate::when_present(df, column, || {
            let Ok(series) = df.column(column) else {
                return Vec::new();
            };
            let numeric = is_numeric(series.dtype());
            let values = string_values(series.as_materialized_series());

            let mut counts = match order {
                CountOrder::ByFrequency => rank_by_frequency(values),
                CountOrder::ByValue => {
                    let mut counts = rank_by_frequency(values);
                    if numeric {
                        counts.sort_by(|(a, _), (b, _)| {
                            let a = a.parse::<f64>().unwrap_or(f64::NAN);
                            let b = b.parse::<f64>().unwrap_or(f64::NAN);
                            a.total_cmp(&b)
                        });
                    } else {
                        counts.sort_by(|(a, _), (b, _)| a.cmp(b));
                    }
                    counts
                }
            };

            if let Some(n) = top_n {
                counts.truncate(n);
            }
            counts
        })
    }

    /// Count rows per year, ascending by year; missing years are left out.
    pub fn count_by_year(df: &DataFrame, column: &str) -> Aggregate<Counts<i32>> {
        Aggregate::when_present(df, column, || {
            let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
            let years = df
                .column(column)
                .and_then(|c| c.as_materialized_series().cast(&DataType::Int32));
            if let Ok(years) = years {
                if let Ok(ca) = years.i32() {
                    for year in ca.into_iter().flatten() {
                        *by_year.entry(year).or_default() += 1;
                    }
                }
            }
            by_year.into_iter().collect()
        })
    }

    /// The `n` most frequent accepted words across all values of `text_column`.
    ///
    /// Tokens are lower-cased and split on whitespace; ties keep the order in
    /// which words first appear in the concatenated text.
    pub fn top_words(
        df: &DataFrame,
        text_column: &str,
        n: usize,
        filter: &WordFilter,
    ) -> Aggregate<Counts<String>> {
        Aggregate::when_present(df, text_column, || {
            let Ok(series) = df.column(text_column) else {
                return Vec::new();
            };
            let texts = string_values(series.as_materialized_series());

            let words = texts.iter().flat_map(|text| {
                text.split_whitespace()
                    .map(str::to_lowercase)
                    .filter(|token| filter.accepts(token))
                    .collect::<Vec<_>>()
            });

            let mut counts = rank_by_frequency(words);
            counts.truncate(n);
            counts
        })
    }

    /// Number of distinct non-missing values in `column`.
    pub fn n_unique(df: &DataFrame, column: &str) -> Aggregate<usize> {
        Aggregate::when_present(df, column, || {
            df.column(column)
                .map(|c| {
                    let values = string_values(c.as_materialized_series());
                    values.into_iter().collect::<HashSet<_>>().len()
                })
                .unwrap_or(0)
        })
    }

    /// Percentage share of each entry within the listed counts.
    pub fn shares(counts: &[(String, usize)]) -> Vec<f64> {
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        counts
            .iter()
            .map(|(_, c)| {
                if total == 0 {
                    0.0
                } else {
                    (*c as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
                }
            })
            .collect()
    }
}

/// Non-missing values of a series rendered as strings, in row order.
pub(crate) fn string_values(series: &Series) -> Vec<String> {
    let Ok(text) = series.cast(&DataType::String) else {
        return Vec::new();
    };
    text.str()
        .map(|ca| ca.into_iter().flatten().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Count items; order by count descending, ties by first occurrence.
fn rank_by_frequency(items: impl IntoIterator<Item = String>) -> Counts<String> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for item in items {
        match first_seen.get(&item) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                first_seen.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, usize)]) -> Counts<String> {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_top_words_filters_stop_words_and_short_tokens() {
        let df = df!("title" => [
            "Novel Coronavirus Spread Patterns",
            "Spread Dynamics Of Coronavirus",
        ])
        .unwrap();

        let words = FrequencyCounter::top_words(&df, "title", 20, &WordFilter::default());
        assert_eq!(
            words,
            Aggregate::Available(pairs(&[("spread", 2), ("patterns", 1), ("dynamics", 1)]))
        );
    }

    #[test]
    fn test_top_words_truncates_and_skips_non_alphabetic() {
        let df = df!("title" => [
            Some("alpha beta gamma covid-19 2020 alpha"),
            None,
            Some("beta delta"),
        ])
        .unwrap();

        let words = FrequencyCounter::top_words(&df, "title", 2, &WordFilter::default());
        assert_eq!(words, Aggregate::Available(pairs(&[("alpha", 2), ("beta", 2)])));
    }

    #[test]
    fn test_top_words_uses_configured_filter() {
        let df = df!("title" => ["Viral load in children", "Viral shedding"]).unwrap();
        let filter = WordFilter {
            stop_words: ["viral".to_string()].into_iter().collect(),
            min_length: 2,
        };

        let words = FrequencyCounter::top_words(&df, "title", 10, &filter);
        assert_eq!(
            words,
            Aggregate::Available(pairs(&[
                ("load", 1),
                ("in", 1),
                ("children", 1),
                ("shedding", 1)
            ]))
        );
    }

    #[test]
    fn test_top_words_missing_column_is_unavailable() {
        let df = df!("journal" => ["J"]).unwrap();
        let words = FrequencyCounter::top_words(&df, "title", 5, &WordFilter::default());
        assert!(!words.is_available());
    }

    #[test]
    fn test_count_by_year_ascending() {
        let df = df!("publication_year" => [Some(2021i32), Some(2020), None, Some(2020)]).unwrap();
        let counts = FrequencyCounter::count_by_year(&df, "publication_year");
        assert_eq!(counts, Aggregate::Available(vec![(2020, 2), (2021, 1)]));
    }

    #[test]
    fn test_count_by_value_orders_numbers_numerically() {
        let df = df!("publication_year" => [2020i32, 2020, 2021, 998]).unwrap();
        let counts =
            FrequencyCounter::count_by(&df, "publication_year", CountOrder::ByValue, None);
        assert_eq!(
            counts,
            Aggregate::Available(pairs(&[("998", 1), ("2020", 2), ("2021", 1)]))
        );
    }

    #[test]
    fn test_count_by_frequency_breaks_ties_by_first_seen() {
        let df = df!("journal" => [
            Some("BMJ"),
            Some("Lancet"),
            Some("Nature"),
            Some("Lancet"),
            None,
            Some("Nature"),
        ])
        .unwrap();

        let counts = FrequencyCounter::count_by(&df, "journal", CountOrder::ByFrequency, Some(2));
        assert_eq!(counts, Aggregate::Available(pairs(&[("Lancet", 2), ("Nature", 2)])));
    }

    #[test]
    fn test_count_by_empty_table_is_empty() {
        let df = df!("journal" => Vec::<String>::new()).unwrap();
        let counts = FrequencyCounter::count_by(&df, "journal", CountOrder::ByFrequency, None);
        assert_eq!(counts, Aggregate::Available(Vec::new()));
    }

    #[test]
    fn test_n_unique_and_shares() {
        let df = df!("authors" => ["A", "B", "A"]).unwrap();
        assert_eq!(
            FrequencyCounter::n_unique(&df, "authors"),
            Aggregate::Available(2)
        );
        assert_eq!(
            FrequencyCounter::shares(&pairs(&[("x", 3), ("y", 1)])),
            vec![75.0, 25.0]
        );
    }
}
