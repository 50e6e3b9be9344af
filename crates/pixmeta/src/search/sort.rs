use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::search::filter::parse_size_mb;
use crate::store::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Uploaded,
    Filename,
    Name,
    Size,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOptions {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Stable sort; equal elements keep their list order in both directions.
    pub fn apply(&self, files: &mut [FileRecord]) {
        files.sort_by(|a, b| {
            let ordering = compare(self.field, a, b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

fn compare(field: SortField, a: &FileRecord, b: &FileRecord) -> Ordering {
    match field {
        SortField::Uploaded => a.uploaded.cmp(&b.uploaded),
        SortField::Filename => a.filename.to_lowercase().cmp(&b.filename.to_lowercase()),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        // Unparseable sizes sort before every parseable one.
        SortField::Size => {
            let (a, b) = (parse_size_mb(&a.size), parse_size_mb(&b.size));
            match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        SortField::Status => a.status.cmp(&b.status),
    }
}
