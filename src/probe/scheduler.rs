//! Probe scheduler for managing worker lifecycle.

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::probe::{ProbeWorker, phase_offset};

/// Default grace period for in-flight probes on shutdown (1.5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Errors from worker management.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A worker with this index is already running.
    #[error("worker {0} is already running")]
    DuplicateWorker(u32),

    /// No running worker has this index.
    #[error("no worker with index {0}")]
    UnknownWorker(u32),
}

/// Metadata about a running worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerInfo {
    /// Worker index within the second.
    pub index: u32,
    /// Target host.
    pub host: String,
    /// Phase offset from the whole second, in milliseconds.
    pub offset_ms: i64,
}

/// Outcome of stopping one or more workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that exited within the grace period.
    pub joined: usize,
    /// Workers aborted after the grace period elapsed.
    pub abandoned: usize,
}

impl ShutdownReport {
    pub fn timed_out(&self) -> bool {
        self.abandoned > 0
    }
}

struct WorkerHandle {
    info: WorkerInfo,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the probe worker tasks.
///
/// Every worker gets a child of the scheduler's cancellation token, so one
/// worker can be stopped alone while the rest keep writing to the store.
/// Dropping the scheduler cancels every worker it still owns.
pub struct ProbeScheduler {
    cancel: CancellationToken,
    workers: Mutex<BTreeMap<u32, WorkerHandle>>,
}

impl ProbeScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            workers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Spawn a worker on the current Tokio runtime.
    pub fn spawn(&self, worker: ProbeWorker) -> Result<WorkerInfo, SchedulerError> {
        let mut workers = self.workers.lock();
        let index = worker.index();
        if workers.contains_key(&index) {
            return Err(SchedulerError::DuplicateWorker(index));
        }

        let info = WorkerInfo {
            index,
            host: worker.host().to_string(),
            offset_ms: phase_offset(index, worker.frequency()).num_milliseconds(),
        };
        let cancel = self.cancel.child_token();
        let task = tokio::spawn(worker.run(cancel.clone()));

        workers.insert(
            index,
            WorkerHandle {
                info: info.clone(),
                cancel,
                task,
            },
        );

        tracing::debug!(worker = index, offset_ms = info.offset_ms, "Probe worker registered");
        Ok(info)
    }

    /// List running workers ordered by index.
    pub fn list_workers(&self) -> Vec<WorkerInfo> {
        self.workers.lock().values().map(|w| w.info.clone()).collect()
    }

    /// Get the number of running workers.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Stop a single worker, aborting it if still probing after `grace`.
    pub async fn stop_worker(
        &self,
        index: u32,
        grace: Duration,
    ) -> Result<ShutdownReport, SchedulerError> {
        let handle = self
            .workers
            .lock()
            .remove(&index)
            .ok_or(SchedulerError::UnknownWorker(index))?;

        handle.cancel.cancel();
        let report = join_within(vec![handle], grace).await;
        tracing::info!(worker = index, abandoned = report.abandoned, "Probe worker removed");
        Ok(report)
    }

    /// Stop all workers with the default grace period.
    pub async fn shutdown(self) -> ShutdownReport {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Stop all workers, aborting any still probing after `grace`.
    pub async fn shutdown_with_timeout(&self, grace: Duration) -> ShutdownReport {
        self.cancel.cancel();
        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock())
            .into_values()
            .collect();
        let worker_count = handles.len();

        let report = join_within(handles, grace).await;
        if report.timed_out() {
            tracing::warn!(
                worker_count,
                abandoned = report.abandoned,
                grace_ms = grace.as_millis(),
                "Probe scheduler shutdown timed out, abandoned in-flight probes"
            );
        } else {
            tracing::info!(worker_count, "Probe scheduler shutdown complete");
        }
        report
    }
}

impl Drop for ProbeScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Default for ProbeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProbeScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeScheduler")
            .field("worker_count", &self.worker_count())
            .finish_non_exhaustive()
    }
}

/// Await cancelled workers until a shared deadline, then abort the stragglers.
async fn join_within(handles: Vec<WorkerHandle>, grace: Duration) -> ShutdownReport {
    let deadline = tokio::time::Instant::now() + grace;
    let mut report = ShutdownReport::default();

    for mut handle in handles {
        match tokio::time::timeout_at(deadline, &mut handle.task).await {
            Ok(Ok(())) => report.joined += 1,
            Ok(Err(e)) => {
                tracing::error!(worker = handle.info.index, error = %e, "Probe worker panicked");
                report.joined += 1;
            }
            Err(_) => {
                handle.task.abort();
                report.abandoned += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeCounters, ProbeError, ProbeExecutor};
    use crate::store::SampleStore;
    use std::sync::Arc;

    struct InstantExecutor;

    #[async_trait::async_trait]
    impl ProbeExecutor for InstantExecutor {
        fn name(&self) -> &str {
            "instant"
        }

        async fn probe(&self, _host: &str) -> Result<f64, ProbeError> {
            Ok(0.0)
        }
    }

    /// Executor whose probes never complete.
    struct HangingExecutor;

    #[async_trait::async_trait]
    impl ProbeExecutor for HangingExecutor {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn probe(&self, _host: &str) -> Result<f64, ProbeError> {
            std::future::pending().await
        }
    }

    fn spawn_all(
        scheduler: &ProbeScheduler,
        executor: Arc<dyn ProbeExecutor>,
        store: &Arc<SampleStore>,
        frequency: u32,
    ) {
        let counters = Arc::new(ProbeCounters::default());
        for index in 0..frequency {
            let worker = ProbeWorker::new(
                "127.0.0.1",
                index,
                frequency,
                Arc::clone(&executor),
                Arc::clone(store),
                Arc::clone(&counters),
            );
            scheduler.spawn(worker).unwrap();
        }
    }

    #[tokio::test]
    async fn test_scheduler_lifecycle() {
        let store = Arc::new(SampleStore::new(1_000));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(InstantExecutor), &store, 4);

        assert_eq!(scheduler.worker_count(), 4);
        let workers = scheduler.list_workers();
        assert_eq!(
            workers.iter().map(|w| w.offset_ms).collect::<Vec<_>>(),
            vec![0, 250, 500, 750]
        );

        let report = scheduler.shutdown().await;
        assert_eq!(report.joined, 4);
        assert!(!report.timed_out());
    }

    #[tokio::test]
    async fn test_duplicate_worker_rejected() {
        let store = Arc::new(SampleStore::new(10));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(InstantExecutor), &store, 1);

        let duplicate = ProbeWorker::new(
            "127.0.0.1",
            0,
            1,
            Arc::new(InstantExecutor),
            Arc::clone(&store),
            Arc::new(ProbeCounters::default()),
        );
        let err = scheduler.spawn(duplicate).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateWorker(0)));

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_partial_stop_keeps_others_writing() {
        let store = Arc::new(SampleStore::new(1_000));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(InstantExecutor), &store, 2);

        scheduler.stop_worker(1, DEFAULT_SHUTDOWN_TIMEOUT).await.unwrap();
        assert_eq!(scheduler.worker_count(), 1);
        assert!(matches!(
            scheduler.stop_worker(1, DEFAULT_SHUTDOWN_TIMEOUT).await,
            Err(SchedulerError::UnknownWorker(1))
        ));

        let before = store.len();
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert!(store.len() > before);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_abandons_hung_probes() {
        let store = Arc::new(SampleStore::new(10));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(HangingExecutor), &store, 2);

        // Let both workers enter their probe.
        tokio::time::sleep(Duration::from_millis(1_800)).await;

        let report = scheduler
            .shutdown_with_timeout(Duration::from_millis(100))
            .await;
        assert_eq!(report.abandoned, 2);
        assert!(report.timed_out());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_stop_worker_honours_grace() {
        let store = Arc::new(SampleStore::new(10));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(HangingExecutor), &store, 1);

        // Worker 0 fires on the next whole second and never returns.
        tokio::time::sleep(Duration::from_millis(1_200)).await;

        let started = std::time::Instant::now();
        let report = scheduler
            .stop_worker(0, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(report.abandoned, 1);
        assert!(started.elapsed() < DEFAULT_SHUTDOWN_TIMEOUT);
        assert_eq!(scheduler.worker_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_cancels_workers() {
        let store = Arc::new(SampleStore::new(1_000));
        let scheduler = ProbeScheduler::new();
        spawn_all(&scheduler, Arc::new(InstantExecutor), &store, 4);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        drop(scheduler);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let after_drop = store.len();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(store.len(), after_drop);
    }
}
