use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::FileRecord;

pub const MAX_SUGGESTIONS: usize = 10;

/// Description words this short are not suggested.
const MIN_WORD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Filename,
    Tag,
    Keyword,
    Category,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

/// Counts facet values containing `term` and returns the most frequent.
///
/// Ties keep the order in which values were first seen. An empty term
/// yields nothing.
pub fn suggestions(files: &[FileRecord], term: &str) -> Vec<Suggestion> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut found: Vec<Suggestion> = Vec::new();
    let mut index: HashMap<(SuggestionKind, String), usize> = HashMap::new();

    let mut record = |kind: SuggestionKind, value: &str| {
        if value.is_empty() || !value.to_lowercase().contains(&needle) {
            return;
        }
        match index.get(&(kind, value.to_string())) {
            Some(&i) => found[i].count += 1,
            None => {
                index.insert((kind, value.to_string()), found.len());
                found.push(Suggestion {
                    value: value.to_string(),
                    count: 1,
                    kind,
                });
            }
        }
    };

    for file in files {
        record(SuggestionKind::Filename, &file.filename);
        for tag in &file.tags {
            record(SuggestionKind::Tag, tag);
        }
        for keyword in &file.keywords {
            record(SuggestionKind::Keyword, keyword);
        }
        record(SuggestionKind::Category, &file.adobe_category);
        for word in description_words(&file.description) {
            record(SuggestionKind::Description, word);
        }
    }

    found.sort_by(|a, b| b.count.cmp(&a.count));
    found.truncate(MAX_SUGGESTIONS);
    found
}

fn description_words(description: &str) -> impl Iterator<Item = &str> {
    description
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
}
