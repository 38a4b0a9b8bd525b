//! Dataset Cache Module
//! Holds the raw and cleaned tables for one source, keyed by its content hash.

use crate::data::{CleanedTable, CleanerError, CleaningOptions, DataCleaner, DataLoader, LoaderError};
use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Clean(#[from] CleanerError),
}

/// Hash a file's contents with blake3.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize())
}

/// Raw and cleaned tables built from one version of a source file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub content_hash: blake3::Hash,
    pub raw: DataFrame,
    pub cleaned: CleanedTable,
}

impl Dataset {
    /// Load and clean `path` without caching.
    pub fn build(path: &Path, options: &CleaningOptions) -> Result<Self, DatasetError> {
        let content_hash = hash_file(path).map_err(|e| LoaderError::from_io(path, e))?;
        let raw = DataLoader::load_csv(path)?;
        let cleaned = DataCleaner::clean(&raw, options)?;
        Ok(Self {
            path: path.to_path_buf(),
            content_hash,
            raw,
            cleaned,
        })
    }
}

/// Memoises the cleaned table of a source file.
///
/// An entry is reused only while path, cleaning options and content hash all
/// match; any change rebuilds it.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<(CleaningOptions, Dataset)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, rebuilding it when stale.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &CleaningOptions,
    ) -> Result<&Dataset, DatasetError> {
        if !path.is_file() {
            self.invalidate();
            return Err(LoaderError::SourceNotFound(path.to_path_buf()).into());
        }

        let fresh = match &self.entry {
            Some((cached_options, dataset)) => {
                cached_options == options
                    && dataset.path == path
                    && hash_file(path).is_ok_and(|hash| hash == dataset.content_hash)
            }
            None => false,
        };

        if fresh {
            log::debug!("Reusing cleaned table for {}", path.display());
        } else {
            log::info!("Loading and cleaning {}", path.display());
            self.entry = None;
            let dataset = Dataset::build(path, options)?;
            self.entry = Some((options.clone(), dataset));
        }

        match &self.entry {
            Some((_, dataset)) => Ok(dataset),
            None => Err(LoaderError::SourceNotFound(path.to_path_buf()).into()),
        }
    }

    /// The currently cached dataset, if any.
    pub fn current(&self) -> Option<&Dataset> {
        self.entry.as_ref().map(|(_, dataset)| dataset)
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hash_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, b"title\nA\n").unwrap();
        assert_eq!(hash_file(&path).unwrap(), blake3::hash(b"title\nA\n"));
    }

    #[test]
    fn test_cache_reuses_until_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "title,journal\nA,J1\nB,\n").unwrap();
        let options = CleaningOptions::default();
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&path, &options).unwrap().content_hash;
        let second = cache.get_or_load(&path, &options).unwrap().content_hash;
        assert_eq!(first, second);

        fs::write(&path, "title,journal\nA,J1\nB,\nC,J2\n").unwrap();
        let reloaded = cache.get_or_load(&path, &options).unwrap();
        assert_ne!(reloaded.content_hash, first);
        assert_eq!(reloaded.cleaned.df.height(), 3);
    }

    #[test]
    fn test_cache_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(&dir.path().join("absent.csv"), &CleaningOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Load(LoaderError::SourceNotFound(_))));
        assert!(cache.current().is_none());
    }
}
