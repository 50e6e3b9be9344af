//! Structured filters. Every filter is a no-op when empty and all filters
//! are AND-combined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{FileRecord, FileStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Inclusive at both ends.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }

    fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Size bounds in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SizeRange {
    pub fn contains(&self, megabytes: f64) -> bool {
        self.min.map_or(true, |min| megabytes >= min) && self.max.map_or(true, |max| megabytes <= max)
    }

    fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub status: Vec<FileStatus>,
    pub date_range: Option<DateRange>,
    pub adobe_categories: Vec<String>,
    /// Matches files sharing at least one tag.
    pub tags: Vec<String>,
    /// Matches files sharing at least one value across keywords and Adobe keys.
    pub keywords: Vec<String>,
    pub size_range: Option<SizeRange>,
    pub has_description: Option<bool>,
    pub has_keywords: Option<bool>,
    pub has_adobe_keys: Option<bool>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        *self == FilterOptions::default()
    }

    pub fn matches(&self, file: &FileRecord) -> bool {
        if !self.status.is_empty() && !self.status.contains(&file.status) {
            return false;
        }

        if let Some(range) = self.date_range.filter(|r| !r.is_empty()) {
            if !range.contains(file.uploaded) {
                return false;
            }
        }

        if !self.adobe_categories.is_empty() && !self.adobe_categories.contains(&file.adobe_category)
        {
            return false;
        }

        if !self.tags.is_empty() && !file.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        if !self.keywords.is_empty()
            && !file
                .keywords
                .iter()
                .chain(file.adobe_keys.iter())
                .any(|k| self.keywords.contains(k))
        {
            return false;
        }

        if let Some(range) = self.size_range.filter(|r| !r.is_empty()) {
            match parse_size_mb(&file.size) {
                Some(megabytes) if range.contains(megabytes) => {}
                _ => return false,
            }
        }

        presence_matches(self.has_description, file.has_description())
            && presence_matches(self.has_keywords, file.has_keywords())
            && presence_matches(self.has_adobe_keys, file.has_adobe_keys())
    }
}

fn presence_matches(wanted: Option<bool>, present: bool) -> bool {
    wanted.map_or(true, |wanted| wanted == present)
}

/// Parses a display size such as `"2.4 MB"` into megabytes.
///
/// Accepts `B`, `KB`, `MB` and `GB` in any case, with or without a space
/// before the unit. A bare number is taken as megabytes.
pub fn parse_size_mb(size: &str) -> Option<f64> {
    let size = size.trim();
    let split = size
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(size.len());
    let (number, unit) = size.split_at(split);

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let factor = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "MB" => 1.0,
        "B" => 1.0 / (1024.0 * 1024.0),
        "KB" => 1.0 / 1024.0,
        "GB" => 1024.0,
        _ => return None,
    };
    Some(value * factor)
}
