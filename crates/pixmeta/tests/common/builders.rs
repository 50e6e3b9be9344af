//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pixmeta::config::Settings;
use pixmeta::store::{FileRecord, FileStatus, MemoryStore, ProjectId};

/// Builder for `Settings` with fast timings suited to a paused clock.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Create a new builder with sensible defaults for testing.
    pub fn new() -> Self {
        let mut settings = Settings::default();
        settings.queue.concurrent_processing = 2;
        settings.queue.queue_check_interval = 1;
        settings.queue.max_retries = 2;
        settings.queue.retry_delay = 1;
        settings.ai.timeout = 60;
        settings.ai.image_base_url = "http://images.test/uploads".to_string();
        Self { settings }
    }

    pub fn concurrency(mut self, count: usize) -> Self {
        self.settings.queue.concurrent_processing = count;
        self
    }

    pub fn interval(mut self, seconds: u64) -> Self {
        self.settings.queue.queue_check_interval = seconds;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.settings.queue.max_retries = retries;
        self
    }

    pub fn retry_delay(mut self, seconds: u64) -> Self {
        self.settings.queue.retry_delay = seconds;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.settings.ai.timeout = seconds;
        self
    }

    pub fn default_prompt(mut self, prompt: &str) -> Self {
        self.settings.ai.default_prompt = prompt.to_string();
        self
    }

    pub fn notify_completion(mut self, enabled: bool) -> Self {
        self.settings.notifications.project_completion = enabled;
        self
    }

    pub fn notify_errors(mut self, enabled: bool) -> Self {
        self.settings.notifications.errors = enabled;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `FileRecord` instances used by search tests.
pub struct FileBuilder {
    file: FileRecord,
}

impl FileBuilder {
    pub fn new(id: i64, filename: &str) -> Self {
        Self {
            file: FileRecord::new(id, 1, filename, "1.0 MB"),
        }
    }

    pub fn project(mut self, project_id: ProjectId) -> Self {
        self.file.project_id = project_id;
        self
    }

    pub fn status(mut self, status: FileStatus) -> Self {
        self.file.status = status;
        self
    }

    pub fn size(mut self, size: &str) -> Self {
        self.file.size = size.to_string();
        self
    }

    pub fn uploaded(mut self, at: DateTime<Utc>) -> Self {
        self.file.uploaded = at;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.file.description = description.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.file.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.file.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn adobe_keys(mut self, keys: &[&str]) -> Self {
        self.file.adobe_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.file.adobe_category = category.to_string();
        self
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.file.prompt = Some(prompt.to_string());
        self
    }

    pub fn build(self) -> FileRecord {
        self.file
    }
}

/// A store holding one project with `count` queued files named
/// `image1.jpg`, `image2.jpg`, ...
pub fn store_with_queued_files(settings: Settings, count: usize) -> (Arc<MemoryStore>, ProjectId) {
    let store = Arc::new(MemoryStore::new(settings));
    let project = store.add_project("Test project", "");
    for i in 1..=count {
        store
            .add_file(project.id, &format!("image{}.jpg", i), "1.0 MB")
            .expect("project exists");
    }
    (store, project.id)
}

/// A store seeded with fully formed records.
pub fn store_with_files(files: Vec<FileRecord>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.add_project("Test project", "");
    for file in files {
        store.insert_file(file);
    }
    store
}
