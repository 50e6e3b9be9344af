pub mod loader;
pub mod schema;

pub use loader::{load_settings, load_settings_from_str, load_settings_from_yaml, validate_settings};
pub use schema::{AiSettings, NotificationSettings, QueueSettings, Settings};
