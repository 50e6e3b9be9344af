//! Domain records held by the state store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type FileId = i64;
pub type ProjectId = i64;

/// Processing status of a file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Queued => "queued",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded image and everything known about it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,
    pub project_id: ProjectId,
    pub filename: String,
    /// User-assigned display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub adobe_title: String,
    /// Human-readable size, e.g. `"2.4 MB"`.
    pub size: String,
    pub uploaded: DateTime<Utc>,
    pub status: FileStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Prompt override for this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub adobe_keys: Vec<String>,
    #[serde(default)]
    pub adobe_category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attempts: u32,
    /// Seconds spent in the processing call, one decimal place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileRecord {
    /// A freshly uploaded file: queued, no attempts yet.
    pub fn new(id: FileId, project_id: ProjectId, filename: &str, size: &str) -> Self {
        Self {
            id,
            project_id,
            filename: filename.to_string(),
            name: filename.to_string(),
            adobe_title: String::new(),
            size: size.to_string(),
            uploaded: Utc::now(),
            status: FileStatus::Queued,
            description: String::new(),
            keywords: vec![],
            prompt: None,
            adobe_keys: vec![],
            adobe_category: String::new(),
            tags: vec![],
            notes: String::new(),
            attempts: 0,
            processing_time: None,
            error: None,
        }
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn has_adobe_keys(&self) -> bool {
        !self.adobe_keys.is_empty()
    }
}

/// Partial update of a [`FileRecord`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub status: Option<FileStatus>,
    pub attempts: Option<u32>,
    pub name: Option<String>,
    pub adobe_title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub adobe_keys: Option<Vec<String>>,
    pub adobe_category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub prompt: Option<Option<String>>,
    pub processing_time: Option<Option<String>>,
    pub error: Option<Option<String>>,
}

impl FilePatch {
    pub fn status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn adobe_title(mut self, title: &str) -> Self {
        self.adobe_title = Some(title.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn adobe_keys(mut self, keys: Vec<String>) -> Self {
        self.adobe_keys = Some(keys);
        self
    }

    pub fn adobe_category(mut self, category: &str) -> Self {
        self.adobe_category = Some(category.to_string());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn processing_time(mut self, seconds: String) -> Self {
        self.processing_time = Some(Some(seconds));
        self
    }

    pub fn error(mut self, message: &str) -> Self {
        self.error = Some(Some(message.to_string()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn apply(self, file: &mut FileRecord) {
        if let Some(status) = self.status {
            file.status = status;
        }
        if let Some(attempts) = self.attempts {
            file.attempts = attempts;
        }
        if let Some(name) = self.name {
            file.name = name;
        }
        if let Some(title) = self.adobe_title {
            file.adobe_title = title;
        }
        if let Some(description) = self.description {
            file.description = description;
        }
        if let Some(keywords) = self.keywords {
            file.keywords = keywords;
        }
        if let Some(keys) = self.adobe_keys {
            file.adobe_keys = keys;
        }
        if let Some(category) = self.adobe_category {
            file.adobe_category = category;
        }
        if let Some(tags) = self.tags {
            file.tags = tags;
        }
        if let Some(notes) = self.notes {
            file.notes = notes;
        }
        if let Some(prompt) = self.prompt {
            file.prompt = prompt;
        }
        if let Some(processing_time) = self.processing_time {
            file.processing_time = processing_time;
        }
        if let Some(error) = self.error {
            file.error = error;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
    /// Files that finished processing successfully.
    #[serde(default)]
    pub processed: u32,
    /// Files that failed terminally.
    #[serde(default)]
    pub errors: u32,
}

impl Project {
    pub fn new(id: ProjectId, name: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created: Utc::now(),
            processed: 0,
            errors: 0,
        }
    }
}

/// Partial update of a [`Project`]. Counter fields are increments so that
/// concurrent outcomes never overwrite each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub processed_delta: u32,
    pub errors_delta: u32,
}

impl ProjectPatch {
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn increment_processed(mut self) -> Self {
        self.processed_delta += 1;
        self
    }

    pub fn increment_errors(mut self) -> Self {
        self.errors_delta += 1;
        self
    }

    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        project.processed = project.processed.saturating_add(self.processed_delta);
        project.errors = project.errors.saturating_add(self.errors_delta);
    }
}

/// A reusable analysis prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: i64,
    pub name: String,
    pub prompt: String,
    #[serde(default)]
    pub is_default: bool,
}
