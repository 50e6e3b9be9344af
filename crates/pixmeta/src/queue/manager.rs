//! Polling queue manager with bounded concurrency and retry.
//!
//! Every poll cycle claims queued files, in list order, up to
//! `concurrentProcessing` minus the files already claimed, and spawns one
//! processing task per claim. A claim is released once the outcome has been
//! written back to the store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::ai::{image_url, AnalyzeRequest, Analysis, Analyzer};
use crate::config::Settings;
use crate::error::AnalyzeError;
use crate::notifications::{deliver_detached, ExternalNotifier, NewNotification, NotificationCategory};
use crate::queue::stats::{QueueStats, QueueStatus};
use crate::store::{FileId, FilePatch, FileRecord, FileStatus, ProjectId, ProjectPatch, StateStore};

/// One claimed file on its way to the processing call.
struct Dispatch {
    file_id: FileId,
    project_id: ProjectId,
    filename: String,
    attempt: u32,
    epoch: u64,
    request: AnalyzeRequest,
    settings: Settings,
}

pub struct QueueManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn StateStore>,
    analyzer: Arc<dyn Analyzer>,
    notifier: Option<Arc<dyn ExternalNotifier>>,
    /// Files with a processing call outstanding. The only concurrency gate.
    claimed: Mutex<HashSet<FileId>>,
    /// Files waiting out their retry delay.
    retry_pending: Mutex<HashSet<FileId>>,
    /// Advanced by `stop()`; outcomes from an older epoch are discarded.
    epoch: AtomicU64,
    status: watch::Sender<QueueStatus>,
    stats: watch::Sender<QueueStats>,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Queue {} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

impl QueueManager {
    pub fn new(store: Arc<dyn StateStore>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self::with_notifier(store, analyzer, None)
    }

    /// Creates a manager that also forwards processing messages to an
    /// external notifier. Delivery failures are logged, never propagated.
    pub fn with_notifier(
        store: Arc<dyn StateStore>,
        analyzer: Arc<dyn Analyzer>,
        notifier: Option<Arc<dyn ExternalNotifier>>,
    ) -> Self {
        let (status, _) = watch::channel(QueueStatus::Stopped);
        let (stats, _) = watch::channel(QueueStats::default());

        Self {
            inner: Arc::new(Inner {
                store,
                analyzer,
                notifier,
                claimed: Mutex::new(HashSet::new()),
                retry_pending: Mutex::new(HashSet::new()),
                epoch: AtomicU64::new(0),
                status,
                stats,
                shutdown_tx: Mutex::new(None),
            }),
        }
    }

    /// Starts polling. Calling it while already running does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut shutdown = lock(&self.inner.shutdown_tx, "shutdown");
        if shutdown.is_some() {
            debug!("Queue already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        *shutdown = Some(shutdown_tx);
        drop(shutdown);

        self.inner.status.send_replace(QueueStatus::Running);
        info!("Queue started");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                inner.poll_once();

                // Re-read so interval changes apply from the next cycle.
                let interval = inner
                    .store
                    .snapshot()
                    .settings
                    .queue
                    .queue_check_interval
                    .max(1);

                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
                }
            }
            debug!("Queue poll loop exited");
        });
    }

    /// Stops polling. Files already dispatched run to completion and their
    /// outcomes are applied.
    pub fn pause(&self) {
        self.halt_polling();
        self.inner.status.send_replace(QueueStatus::Paused);
        info!("Queue paused");
    }

    /// Stops polling and forgets every claim. Outcomes of calls dispatched
    /// before the stop are discarded; their files stay `processing` until
    /// [`requeue_stalled`](Self::requeue_stalled) or a user edit.
    pub fn stop(&self) {
        self.halt_polling();
        let released = {
            // Advanced under the claim lock so an in-flight outcome is either
            // written before the stop or discarded after it.
            let mut claimed = lock(&self.inner.claimed, "claim");
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            let released = claimed.len();
            claimed.clear();
            released
        };
        self.inner.status.send_replace(QueueStatus::Stopped);
        self.inner.publish_stats();
        info!("Queue stopped ({} claims released)", released);
    }

    fn halt_polling(&self) {
        if let Some(tx) = lock(&self.inner.shutdown_tx, "shutdown").take() {
            let _ = tx.try_send(());
        }
    }

    /// Runs one poll cycle now and returns the ids it claimed. Claims only
    /// happen while the manager is running; stats are always republished.
    pub fn poll_once(&self) -> Vec<FileId> {
        self.inner.poll_once()
    }

    /// Sends failed files back to the queue with a fresh attempt budget.
    /// `None` resets every failed file. Returns the number reset.
    pub fn retry_failed_files(&self, ids: Option<&[FileId]>) -> usize {
        let snapshot = self.inner.store.snapshot();
        let mut reset = 0;

        for file in snapshot.files.iter().filter(|f| f.status == FileStatus::Error) {
            if let Some(ids) = ids {
                if !ids.contains(&file.id) {
                    continue;
                }
            }
            let patch = FilePatch::default()
                .status(FileStatus::Queued)
                .attempts(0)
                .clear_error();
            if self.inner.store.update_file(file.id, patch).is_some() {
                reset += 1;
            }
        }

        info!("Re-queued {} failed files", reset);
        self.inner.publish_stats();
        reset
    }

    /// Returns files stuck in `processing` with no outstanding call and no
    /// pending retry (typically left behind by [`stop`](Self::stop)) to the
    /// queue. The interrupted attempt never produced an outcome, so it is
    /// given back and the file keeps its full retry allowance.
    pub fn requeue_stalled(&self) -> usize {
        let claimed = lock(&self.inner.claimed, "claim");
        let pending = lock(&self.inner.retry_pending, "retry").clone();
        let snapshot = self.inner.store.snapshot();

        let mut reset = 0;
        for file in snapshot.files.iter().filter(|f| {
            f.status == FileStatus::Processing
                && !claimed.contains(&f.id)
                && !pending.contains(&f.id)
        }) {
            let patch = FilePatch::default()
                .status(FileStatus::Queued)
                .attempts(file.attempts.saturating_sub(1));
            if self.inner.store.update_file(file.id, patch).is_some() {
                reset += 1;
            }
        }
        drop(claimed);

        if reset > 0 {
            info!("Re-queued {} stalled files", reset);
        }
        self.inner.publish_stats();
        reset
    }

    pub fn status(&self) -> QueueStatus {
        *self.inner.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<QueueStatus> {
        self.inner.status.subscribe()
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.stats.borrow().clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<QueueStats> {
        self.inner.stats.subscribe()
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.inner.claimed, "claim").len()
    }

    pub fn claimed_ids(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = lock(&self.inner.claimed, "claim").iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Drop for QueueManager {
    fn drop(&mut self) {
        self.halt_polling();
    }
}

impl Inner {
    fn is_running(&self) -> bool {
        *self.status.borrow() == QueueStatus::Running
    }

    fn poll_once(self: &Arc<Self>) -> Vec<FileId> {
        let mut dispatches = Vec::new();

        if self.is_running() {
            let epoch = self.epoch.load(Ordering::SeqCst);

            // The snapshot is taken and the claims recorded under the claim
            // lock so that overlapping polls never see a stale queue.
            let mut claimed = lock(&self.claimed, "claim");
            let snapshot = self.store.snapshot();
            let settings = &snapshot.settings;
            let available = settings
                .queue
                .concurrent_processing
                .saturating_sub(claimed.len());

            let selected: Vec<&FileRecord> = snapshot
                .files
                .iter()
                .filter(|f| f.status == FileStatus::Queued && !claimed.contains(&f.id))
                .take(available)
                .collect();

            for file in selected {
                let attempt = file.attempts + 1;
                let patch = FilePatch::default()
                    .status(FileStatus::Processing)
                    .attempts(attempt);
                if self.store.update_file(file.id, patch).is_none() {
                    continue;
                }
                claimed.insert(file.id);

                dispatches.push(Dispatch {
                    file_id: file.id,
                    project_id: file.project_id,
                    filename: file.filename.clone(),
                    attempt,
                    epoch,
                    request: AnalyzeRequest {
                        file_id: file.id,
                        image_url: image_url(&settings.ai.image_base_url, &file.filename),
                        prompt: snapshot.prompt_for(file),
                        max_tokens: settings.ai.max_tokens,
                        temperature: settings.ai.temperature,
                    },
                    settings: settings.clone(),
                });
            }
        }

        let ids: Vec<FileId> = dispatches.iter().map(|d| d.file_id).collect();
        if !ids.is_empty() {
            debug!("Claimed files {:?}", ids);
        }

        for dispatch in dispatches {
            let span = info_span!(
                "process_file",
                file_id = dispatch.file_id,
                attempt = dispatch.attempt
            );
            let inner = Arc::clone(self);
            tokio::spawn(async move { inner.process(dispatch).await }.instrument(span));
        }

        self.publish_stats();
        ids
    }

    async fn process(self: Arc<Self>, dispatch: Dispatch) {
        let timeout_secs = dispatch.settings.ai.timeout.max(1);
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.analyzer.analyze(dispatch.request.clone()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AnalyzeError::Timeout(timeout_secs)),
        };
        let elapsed = started.elapsed().as_secs_f64();

        {
            // Epoch check and outcome write share the claim lock with `stop`.
            let mut claimed = lock(&self.claimed, "claim");
            if self.epoch.load(Ordering::SeqCst) != dispatch.epoch {
                warn!(
                    "Discarding outcome for {}: queue was stopped while it was processing",
                    dispatch.filename
                );
                return;
            }

            match outcome {
                Ok(analysis) => self.complete(&dispatch, analysis, elapsed),
                Err(e) => self.fail(&dispatch, e),
            }
            claimed.remove(&dispatch.file_id);
        }
        self.publish_stats();
    }

    fn complete(&self, dispatch: &Dispatch, analysis: Analysis, elapsed: f64) {
        let processing_time = format!("{:.1}", elapsed);
        let patch = FilePatch::default()
            .status(FileStatus::Completed)
            .description(&analysis.description)
            .keywords(analysis.keywords)
            .processing_time(processing_time.clone())
            .clear_error();

        if self.store.update_file(dispatch.file_id, patch).is_none() {
            debug!("File {} was removed during processing", dispatch.file_id);
            return;
        }
        self.store.update_project(
            dispatch.project_id,
            ProjectPatch::default().increment_processed(),
        );

        info!(
            "Processed {} in {}s (attempt {})",
            dispatch.filename, processing_time, dispatch.attempt
        );

        if dispatch.settings.notifications.project_completion {
            let message = format!(
                "{} processed successfully in {}s",
                dispatch.filename, processing_time
            );
            self.store.add_notification(NewNotification::success(
                "Processing complete",
                &message,
                NotificationCategory::Processing,
            ));
            self.notify_external(message);
        }
    }

    fn fail(self: &Arc<Self>, dispatch: &Dispatch, error: AnalyzeError) {
        let queue = &dispatch.settings.queue;

        // `attempt` counts this call, so `max_retries` failures are retried
        // and failure number `max_retries + 1` is terminal.
        if dispatch.attempt <= queue.max_retries {
            warn!(
                "Processing {} failed (attempt {} of {}), retrying in {}s: {}",
                dispatch.filename,
                dispatch.attempt,
                queue.max_retries + 1,
                queue.retry_delay,
                error
            );
            self.schedule_retry(dispatch.file_id, Duration::from_secs(queue.retry_delay));
            return;
        }

        let message = error.to_string();
        let patch = FilePatch::default()
            .status(FileStatus::Error)
            .error(&message);
        if self.store.update_file(dispatch.file_id, patch).is_none() {
            debug!("File {} was removed during processing", dispatch.file_id);
            return;
        }
        self.store.update_project(
            dispatch.project_id,
            ProjectPatch::default().increment_errors(),
        );

        warn!(
            "Processing {} failed after {} attempts: {}",
            dispatch.filename, dispatch.attempt, message
        );

        if dispatch.settings.notifications.errors {
            let text = format!("{}: {}", dispatch.filename, message);
            self.store.add_notification(NewNotification::error(
                "Processing failed",
                &text,
                NotificationCategory::Processing,
            ));
            self.notify_external(format!("Processing failed for {}", text));
        }
    }

    /// Puts the file back in the queue after `delay`, unless it left the
    /// `processing` state in the meantime.
    fn schedule_retry(self: &Arc<Self>, file_id: FileId, delay: Duration) {
        lock(&self.retry_pending, "retry").insert(file_id);

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&inner.retry_pending, "retry").remove(&file_id);

            let still_processing = inner
                .store
                .snapshot()
                .file(file_id)
                .map(|f| f.status == FileStatus::Processing)
                .unwrap_or(false);
            if !still_processing {
                debug!("Skipping retry for file {}: no longer processing", file_id);
                return;
            }

            inner
                .store
                .update_file(file_id, FilePatch::default().status(FileStatus::Queued));
            debug!("File {} re-queued for retry", file_id);
        });
    }

    fn notify_external(&self, message: String) {
        if let Some(notifier) = &self.notifier {
            deliver_detached(Arc::clone(notifier), message);
        }
    }

    fn publish_stats(&self) {
        let snapshot = self.store.snapshot();
        let in_flight = lock(&self.claimed, "claim").len();
        let stats = QueueStats::compute(
            &snapshot.files,
            in_flight,
            snapshot.settings.queue.concurrent_processing,
        );
        self.stats.send_replace(stats);
    }
}
