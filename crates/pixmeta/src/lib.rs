pub mod ai;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod queue;
pub mod search;
pub mod store;

pub use ai::{AnalyzeRequest, Analysis, Analyzer, VisionClient};
pub use config::{load_settings, Settings};
pub use error::{
    AnalyzeError, ConfigError, NotifyError, PixmetaError, Result, SearchHistoryError,
};
pub use logging::{init_logging, LogFormat};
pub use notifications::{
    ExternalNotifier, NewNotification, Notification, NotificationLog, WebhookNotifier,
};
pub use queue::{QueueManager, QueueStats, QueueStatus};
pub use search::{FilterOptions, RecentSearches, SearchCriteria, SearchEngine, SortOptions};
pub use store::{FileRecord, FileStatus, MemoryStore, StateStore};
