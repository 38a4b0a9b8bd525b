//! Configuration loading from TOML files

use crate::data::CleaningOptions;
use crate::stats::{WordFilter, DEFAULT_MIN_WORD_LENGTH, DEFAULT_STOP_WORDS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cord19-explorer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Global configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub cleaning: CleaningConfig,
    pub words: WordsConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("metadata.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningConfig {
    pub mandatory_column: String,
    pub date_column: String,
    pub fill_defaults: BTreeMap<String, String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        let options = CleaningOptions::default();
        Self {
            mandatory_column: options.mandatory_column,
            date_column: options.date_column,
            fill_defaults: options.fill_defaults.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordsConfig {
    pub min_length: usize,
    pub top_n: usize,
    /// Replaces the built-in stop words when set
    pub stop_words: Option<Vec<String>>,
    pub extra_stop_words: Vec<String>,
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_WORD_LENGTH,
            top_n: 20,
            stop_words: None,
            extra_stop_words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub chart_file: String,
    pub wordcloud_file: String,
    pub top_journals: usize,
    pub top_sources: usize,
    pub wordcloud_max_words: usize,
    pub open_outputs: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_file: "covid19_analysis_visualizations.png".to_string(),
            wordcloud_file: "covid19_wordcloud.png".to_string(),
            top_journals: 15,
            top_sources: 10,
            wordcloud_max_words: 100,
            open_outputs: false,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path or the default location.
    ///
    /// Search order:
    /// 1. `explicit` (must exist)
    /// 2. ./cord19-explorer.toml
    ///
    /// If no config file is found, returns the default config.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Cleaning options derived from the `[cleaning]` section.
    pub fn cleaning_options(&self) -> CleaningOptions {
        CleaningOptions {
            mandatory_column: self.cleaning.mandatory_column.clone(),
            fill_defaults: self
                .cleaning
                .fill_defaults
                .iter()
                .map(|(column, default)| (column.clone(), default.clone()))
                .collect(),
            date_column: self.cleaning.date_column.clone(),
        }
    }

    /// Word filter derived from the `[words]` section.
    pub fn word_filter(&self) -> WordFilter {
        let base: Vec<String> = match &self.words.stop_words {
            Some(words) => words.clone(),
            None => DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        };
        WordFilter {
            stop_words: base
                .into_iter()
                .chain(self.words.extra_stop_words.iter().cloned())
                .map(|w| w.to_lowercase())
                .collect(),
            min_length: self.words.min_length,
        }
    }

    pub fn chart_path(&self) -> PathBuf {
        self.report.output_dir.join(&self.report.chart_file)
    }

    pub fn wordcloud_path(&self) -> PathBuf {
        self.report.output_dir.join(&self.report.wordcloud_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cleaning_options(), CleaningOptions::default());
        assert_eq!(config.word_filter(), WordFilter::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = Config::from_toml(
            r#"
            [data]
            path = "data/metadata.csv"

            [words]
            min_length = 5
            extra_stop_words = ["Patients"]

            [report]
            top_journals = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.data.path, PathBuf::from("data/metadata.csv"));
        assert_eq!(config.report.top_journals, 10);
        assert_eq!(config.report.top_sources, 10);

        let filter = config.word_filter();
        assert_eq!(filter.min_length, 5);
        assert!(filter.stop_words.contains("patients"));
        assert!(filter.stop_words.contains("coronavirus"));
    }

    #[test]
    fn test_stop_words_replace_defaults() {
        let config = Config::from_toml("[words]\nstop_words = [\"spread\"]\n").unwrap();
        let filter = config.word_filter();
        assert_eq!(filter.stop_words.len(), 1);
        assert!(!filter.stop_words.contains("coronavirus"));
    }

    #[test]
    fn test_fill_defaults_table() {
        let config = Config::from_toml(
            "[cleaning]\nfill_defaults = { journal = \"n/a\" }\nmandatory_column = \"doi\"\n",
        )
        .unwrap();
        let options = config.cleaning_options();
        assert_eq!(options.mandatory_column, "doi");
        assert_eq!(
            options.fill_defaults,
            vec![("journal".to_string(), "n/a".to_string())]
        );
        assert_eq!(options.date_column, "publish_time");
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
