//! Shared state: projects, files, templates, notifications and settings.

pub mod memory;
pub mod records;
pub mod state;

pub use memory::MemoryStore;
pub use records::{
    FileId, FilePatch, FileRecord, FileStatus, Project, ProjectId, ProjectPatch, PromptTemplate,
};
pub use state::{AppState, StoreEvent};

use crate::notifications::{NewNotification, Notification};

/// The contract the queue and search engine work against.
///
/// Implementations must give synchronous read-after-write: a snapshot taken
/// after an update returns the updated value.
pub trait StateStore: Send + Sync {
    fn snapshot(&self) -> AppState;

    /// Applies a partial update. Returns the updated record, or `None` if the
    /// file no longer exists.
    fn update_file(&self, id: FileId, patch: FilePatch) -> Option<FileRecord>;

    fn update_project(&self, id: ProjectId, patch: ProjectPatch) -> Option<Project>;

    fn add_notification(&self, notification: NewNotification) -> Notification;
}
