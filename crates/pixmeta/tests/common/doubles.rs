//! Scripted stand-ins for the analyzer and external notifier.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pixmeta::ai::{AnalyzeRequest, Analysis, Analyzer};
use pixmeta::error::{AnalyzeError, NotifyError};
use pixmeta::notifications::ExternalNotifier;
use pixmeta::store::FileId;

/// Analyzer that sleeps for a fixed delay and fails a scripted number of
/// times per file before succeeding. Tracks peak concurrency.
pub struct ScriptedAnalyzer {
    delay: Duration,
    failures: Mutex<HashMap<FileId, u32>>,
    fail_everything: bool,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    requests: Mutex<Vec<AnalyzeRequest>>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            failures: Mutex::new(HashMap::new()),
            fail_everything: false,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The next `times` calls for `file_id` fail.
    pub fn failing(self, file_id: FileId, times: u32) -> Self {
        self.failures.lock().unwrap().insert(file_id, times);
        self
    }

    pub fn always_failing(mut self) -> Self {
        self.fail_everything = true;
        self
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AnalyzeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(&self, request: AnalyzeRequest) -> Result<Analysis, AnalyzeError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_everything {
            return Err(AnalyzeError::Failed("model unavailable".to_string()));
        }

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&request.file_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(AnalyzeError::Failed("scripted failure".to_string()));
                }
            }
        }

        Ok(Analysis {
            description: format!("Analysis of {}", request.image_url),
            keywords: vec!["test".to_string(), format!("file{}", request.file_id)],
        })
    }
}

/// Notifier that records every message it is asked to deliver.
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Records messages but reports every delivery as failed.
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExternalNotifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(NotifyError::Status {
                url: "http://hooks.test".to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}
