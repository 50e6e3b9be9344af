use serde::{Deserialize, Serialize};

use crate::store::{FileRecord, FileStatus};

/// Lifecycle state of the queue manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Running,
    Paused,
    Stopped,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Running => write!(f, "running"),
            QueueStatus::Paused => write!(f, "paused"),
            QueueStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Aggregate view of the file list, republished every poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub queued: usize,
    /// Files whose status is `processing`, including those waiting out a
    /// retry delay.
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    /// Claimed files with a processing call outstanding.
    pub in_flight: usize,
    /// Mean seconds per completed file.
    pub average_time: f64,
    /// Seconds until the current queue drains at the configured concurrency.
    pub estimated_time_remaining: f64,
}

impl QueueStats {
    pub fn compute(files: &[FileRecord], in_flight: usize, concurrency: usize) -> Self {
        let mut stats = QueueStats {
            in_flight,
            ..Default::default()
        };

        let mut total_time = 0.0;
        let mut timed = 0usize;

        for file in files {
            match file.status {
                FileStatus::Queued => stats.queued += 1,
                FileStatus::Processing => stats.processing += 1,
                FileStatus::Completed => {
                    stats.completed += 1;
                    if let Some(seconds) = file
                        .processing_time
                        .as_deref()
                        .and_then(|t| t.trim().parse::<f64>().ok())
                    {
                        total_time += seconds;
                        timed += 1;
                    }
                }
                FileStatus::Error => stats.failed += 1,
            }
        }

        if timed > 0 {
            stats.average_time = total_time / timed as f64;
        }
        stats.estimated_time_remaining =
            stats.average_time * stats.queued as f64 / concurrency.max(1) as f64;

        stats
    }
}
