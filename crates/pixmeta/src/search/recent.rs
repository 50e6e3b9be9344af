//! Recent search terms, most recent first, optionally persisted as a JSON
//! array.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::SearchHistoryError;

pub const MAX_RECENT_SEARCHES: usize = 10;

const HISTORY_FILE: &str = "recent-searches.json";

#[derive(Debug, Clone, Default)]
pub struct RecentSearches {
    terms: Vec<String>,
    path: Option<PathBuf>,
}

impl RecentSearches {
    /// History that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<data dir>/pixmeta/recent-searches.json`, if the platform has a data
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("pixmeta").join(HISTORY_FILE))
    }

    /// Loads history from `path`; every later change is written back to it.
    /// A missing file starts an empty history.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SearchHistoryError> {
        let path = path.as_ref().to_path_buf();

        let terms = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => {
                let mut terms: Vec<String> = serde_json::from_str(&content)?;
                terms.retain(|t| !t.trim().is_empty());
                let mut seen = HashSet::new();
                terms.retain(|t| seen.insert(t.clone()));
                terms.truncate(MAX_RECENT_SEARCHES);
                terms
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(SearchHistoryError::Read { path, source: e }),
        };

        log::debug!("Loaded {} recent searches from {}", terms.len(), path.display());
        Ok(Self {
            terms,
            path: Some(path),
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records a term. A repeated term moves to the front; blank terms are
    /// ignored.
    pub fn add(&mut self, term: &str) -> Result<(), SearchHistoryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        self.terms.retain(|t| t != term);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(MAX_RECENT_SEARCHES);
        self.save()
    }

    pub fn remove(&mut self, term: &str) -> Result<(), SearchHistoryError> {
        self.terms.retain(|t| t != term);
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), SearchHistoryError> {
        self.terms.clear();
        self.save()
    }

    fn save(&self) -> Result<(), SearchHistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let write_err = |source| SearchHistoryError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&self.terms)?;
        std::fs::write(path, json).map_err(write_err)
    }
}
