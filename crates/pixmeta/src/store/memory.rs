//! In-memory state store with change broadcasting.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::config::{validate_settings, Settings};
use crate::error::ConfigError;
use crate::notifications::{NewNotification, Notification};
use crate::store::records::{
    FileId, FilePatch, FileRecord, Project, ProjectId, ProjectPatch, PromptTemplate,
};
use crate::store::state::{AppState, StoreEvent};
use crate::store::StateStore;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lock-protected [`AppState`]. Every mutation is a single write-locked
/// operation followed by a [`StoreEvent`] broadcast.
pub struct MemoryStore {
    state: RwLock<AppState>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self::from_state(AppState {
            settings,
            ..Default::default()
        })
    }

    pub fn from_state(state: AppState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(state),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("State store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("State store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn publish(&self, event: StoreEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.events.send(event);
    }

    // ─── Projects ───────────────────────────────────────────────────────────

    pub fn add_project(&self, name: &str, description: &str) -> Project {
        let project = {
            let mut state = self.write();
            let id = state.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let project = Project::new(id, name, description);
            state.projects.push(project.clone());
            project
        };
        log::info!("Created project {} ({})", project.id, project.name);
        self.publish(StoreEvent::ProjectAdded { id: project.id });
        project
    }

    /// Removes the project and every file that belongs to it.
    pub fn remove_project(&self, id: ProjectId) -> bool {
        let removed_files: Vec<FileId> = {
            let mut state = self.write();
            let before = state.projects.len();
            state.projects.retain(|p| p.id != id);
            if state.projects.len() == before {
                return false;
            }
            let removed = state
                .files
                .iter()
                .filter(|f| f.project_id == id)
                .map(|f| f.id)
                .collect();
            state.files.retain(|f| f.project_id != id);
            removed
        };

        log::info!(
            "Removed project {} and {} of its files",
            id,
            removed_files.len()
        );
        for file_id in removed_files {
            self.publish(StoreEvent::FileRemoved { id: file_id });
        }
        self.publish(StoreEvent::ProjectRemoved { id });
        true
    }

    pub fn project(&self, id: ProjectId) -> Option<Project> {
        self.read().project(id).cloned()
    }

    // ─── Files ──────────────────────────────────────────────────────────────

    /// Registers an uploaded file. It enters the queue immediately.
    /// Returns `None` if the project does not exist.
    pub fn add_file(&self, project_id: ProjectId, filename: &str, size: &str) -> Option<FileRecord> {
        let file = {
            let mut state = self.write();
            state.project(project_id)?;
            let id = state.files.iter().map(|f| f.id).max().unwrap_or(0) + 1;
            let file = FileRecord::new(id, project_id, filename, size);
            state.files.push(file.clone());
            file
        };
        log::debug!("Queued file {} ({})", file.id, file.filename);
        self.publish(StoreEvent::FileAdded { id: file.id });
        Some(file)
    }

    /// Inserts a fully formed record, replacing any file with the same id.
    pub fn insert_file(&self, file: FileRecord) {
        let id = file.id;
        {
            let mut state = self.write();
            match state.files.iter_mut().find(|f| f.id == id) {
                Some(existing) => *existing = file,
                None => state.files.push(file),
            }
        }
        self.publish(StoreEvent::FileAdded { id });
    }

    /// Applies a user edit. Edits go through the same path as queue updates,
    /// so an edit that moves a file back to `queued` re-enters it into the
    /// queue on the next poll.
    pub fn edit_file(&self, id: FileId, patch: FilePatch) -> Option<FileRecord> {
        let updated = self.update_file(id, patch);
        if updated.is_none() {
            log::debug!("Edit ignored: file {} does not exist", id);
        }
        updated
    }

    pub fn remove_file(&self, id: FileId) -> bool {
        let removed = {
            let mut state = self.write();
            let before = state.files.len();
            state.files.retain(|f| f.id != id);
            state.files.len() != before
        };
        if removed {
            self.publish(StoreEvent::FileRemoved { id });
        }
        removed
    }

    pub fn file(&self, id: FileId) -> Option<FileRecord> {
        self.read().file(id).cloned()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.read().files.clone()
    }

    // ─── Templates ──────────────────────────────────────────────────────────

    /// Adds a prompt template. A new default template demotes the old one.
    pub fn add_template(&self, name: &str, prompt: &str, is_default: bool) -> PromptTemplate {
        let template = {
            let mut state = self.write();
            let id = state.templates.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            if is_default {
                for existing in state.templates.iter_mut() {
                    existing.is_default = false;
                }
            }
            let template = PromptTemplate {
                id,
                name: name.to_string(),
                prompt: prompt.to_string(),
                is_default,
            };
            state.templates.push(template.clone());
            template
        };
        self.publish(StoreEvent::TemplatesChanged);
        template
    }

    pub fn remove_template(&self, id: i64) -> bool {
        let removed = {
            let mut state = self.write();
            let before = state.templates.len();
            state.templates.retain(|t| t.id != id);
            state.templates.len() != before
        };
        if removed {
            self.publish(StoreEvent::TemplatesChanged);
        }
        removed
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.read().settings.clone()
    }

    /// Replaces the settings. Running queues pick them up on their next poll.
    pub fn update_settings(&self, settings: Settings) -> Result<(), ConfigError> {
        validate_settings(&settings)?;
        self.write().settings = settings;
        log::info!("Settings updated");
        self.publish(StoreEvent::SettingsChanged);
        Ok(())
    }

    // ─── Notifications ──────────────────────────────────────────────────────

    pub fn notifications(&self) -> Vec<Notification> {
        self.read().notifications.list()
    }

    pub fn unread_notifications(&self) -> usize {
        self.read().notifications.unread_count()
    }

    pub fn mark_notification_read(&self, id: &str) -> bool {
        let changed = self.write().notifications.mark_read(id);
        if changed {
            self.publish(StoreEvent::NotificationsChanged);
        }
        changed
    }

    pub fn mark_all_notifications_read(&self) {
        self.write().notifications.mark_all_read();
        self.publish(StoreEvent::NotificationsChanged);
    }

    pub fn archive_notification(&self, id: &str) -> bool {
        let changed = self.write().notifications.archive(id);
        if changed {
            self.publish(StoreEvent::NotificationsChanged);
        }
        changed
    }

    pub fn delete_notification(&self, id: &str) -> bool {
        let changed = self.write().notifications.delete(id);
        if changed {
            self.publish(StoreEvent::NotificationsChanged);
        }
        changed
    }

    pub fn clear_notifications(&self) {
        self.write().notifications.clear_all();
        self.publish(StoreEvent::NotificationsChanged);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl StateStore for MemoryStore {
    fn snapshot(&self) -> AppState {
        self.read().clone()
    }

    fn update_file(&self, id: FileId, patch: FilePatch) -> Option<FileRecord> {
        let updated = {
            let mut state = self.write();
            let file = state.files.iter_mut().find(|f| f.id == id)?;
            patch.apply(file);
            file.clone()
        };
        self.publish(StoreEvent::FileUpdated { id });
        Some(updated)
    }

    fn update_project(&self, id: ProjectId, patch: ProjectPatch) -> Option<Project> {
        let updated = {
            let mut state = self.write();
            let project = state.projects.iter_mut().find(|p| p.id == id)?;
            patch.apply(project);
            project.clone()
        };
        self.publish(StoreEvent::ProjectUpdated { id });
        Some(updated)
    }

    fn add_notification(&self, notification: NewNotification) -> Notification {
        let added = self.write().notifications.add(notification);
        self.publish(StoreEvent::NotificationsChanged);
        added
    }
}
