//! Data module - CSV loading, cleaning and filtering

mod cache;
mod cleaner;
mod filter;
mod loader;

pub use cache::{hash_file, Dataset, DatasetCache, DatasetError};
pub use cleaner::{
    parse_year, word_count, CleanedTable, CleanerError, CleaningOptions, DataCleaner,
    WORD_COUNT_SOURCES, YEAR_COLUMN,
};
pub use filter::{
    journal_options, FilterCriteria, FilterError, ViewFilter, EXPORT_COLUMNS, JOURNAL_COLUMN,
};
pub use loader::{is_numeric, DataLoader, LoaderError};
