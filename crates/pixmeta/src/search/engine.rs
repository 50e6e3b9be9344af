use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::search::filter::FilterOptions;
use crate::search::query::ParsedQuery;
use crate::search::sort::SortOptions;
use crate::search::suggest::{self, Suggestion};
use crate::store::{FileRecord, StateStore};

/// Everything that determines a result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub term: String,
    pub filters: FilterOptions,
    pub sort: Option<SortOptions>,
}

impl SearchCriteria {
    pub fn term(term: &str) -> Self {
        Self {
            term: term.to_string(),
            ..Default::default()
        }
    }
}

/// Distinct values present across all files, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValues {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

/// Derives result lists and suggestions from the current store snapshot.
/// Nothing is cached; every call recomputes from the file list.
pub struct SearchEngine {
    store: Arc<dyn StateStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Vec<FileRecord> {
        let files = self.store.snapshot().files;
        let mut results = filter_files(&files, &criteria.term, &criteria.filters);
        if let Some(sort) = &criteria.sort {
            sort.apply(&mut results);
        }
        debug!(
            term = %criteria.term,
            matched = results.len(),
            total = files.len(),
            "Search"
        );
        results
    }

    pub fn suggestions(&self, term: &str) -> Vec<Suggestion> {
        suggest::suggestions(&self.store.snapshot().files, term)
    }

    pub fn facet_values(&self) -> FacetValues {
        let files = self.store.snapshot().files;

        let mut categories = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut keywords = BTreeSet::new();
        for file in &files {
            if !file.adobe_category.is_empty() {
                categories.insert(file.adobe_category.clone());
            }
            tags.extend(file.tags.iter().cloned());
            keywords.extend(file.keywords.iter().chain(file.adobe_keys.iter()).cloned());
        }

        FacetValues {
            categories: categories.into_iter().collect(),
            tags: tags.into_iter().collect(),
            keywords: keywords.into_iter().collect(),
        }
    }
}

/// Files matching the term's `key:value` filters, its free text and the
/// structured filters, in list order.
pub fn filter_files(files: &[FileRecord], term: &str, filters: &FilterOptions) -> Vec<FileRecord> {
    let query = ParsedQuery::parse(term);
    let needle = query.needle();

    files
        .iter()
        .filter(|file| {
            query
                .status
                .as_deref()
                .map_or(true, |status| file.status.as_str() == status)
        })
        .filter(|file| {
            query
                .category
                .as_deref()
                .map_or(true, |category| file.adobe_category == category)
        })
        .filter(|file| needle.as_deref().map_or(true, |n| text_matches(file, n)))
        .filter(|file| filters.matches(file))
        .cloned()
        .collect()
}

/// `needle` must already be lowercase.
fn text_matches(file: &FileRecord, needle: &str) -> bool {
    let contains = |value: &String| value.to_lowercase().contains(needle);

    contains(&file.filename)
        || contains(&file.name)
        || contains(&file.adobe_title)
        || contains(&file.description)
        || file.keywords.iter().any(contains)
        || file.adobe_keys.iter().any(contains)
        || file.tags.iter().any(contains)
        || contains(&file.adobe_category)
        || contains(&file.notes)
}
