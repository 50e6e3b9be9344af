use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::notifications::NotificationLog;
use crate::store::records::{FileId, FileRecord, Project, ProjectId, PromptTemplate};

/// Everything the store holds. Snapshots are plain clones of this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub projects: Vec<Project>,
    pub files: Vec<FileRecord>,
    pub templates: Vec<PromptTemplate>,
    pub notifications: NotificationLog,
    pub settings: Settings,
}

impl AppState {
    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn files_in_project(&self, project_id: ProjectId) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(move |f| f.project_id == project_id)
    }

    pub fn default_template(&self) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.is_default)
    }

    /// Prompt used for a file: its own override, then the default template,
    /// then the configured fallback.
    pub fn prompt_for(&self, file: &FileRecord) -> String {
        if let Some(prompt) = file.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            return prompt.to_string();
        }
        if let Some(template) = self.default_template() {
            return template.prompt.clone();
        }
        self.settings.ai.default_prompt.clone()
    }
}

/// Change notifications published by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    FileAdded { id: FileId },
    FileUpdated { id: FileId },
    FileRemoved { id: FileId },
    ProjectAdded { id: ProjectId },
    ProjectUpdated { id: ProjectId },
    ProjectRemoved { id: ProjectId },
    TemplatesChanged,
    NotificationsChanged,
    SettingsChanged,
}
