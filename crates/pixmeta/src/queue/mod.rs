//! Queue manager: polls the store for queued files and runs them through
//! the analyzer with bounded concurrency.

pub mod manager;
pub mod stats;

pub use manager::QueueManager;
pub use stats::{QueueStats, QueueStatus};
