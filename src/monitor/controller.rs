//! Top-level monitor controller.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeDelta, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::aggregate::{History, HistorySet, LossStats, Resolution, instant_loss};
use crate::config::AppConfig;
use crate::monitor::driver::Driver;
use crate::monitor::{MonitorError, Snapshot};
use crate::probe::{
    PingExecutor, ProbeCounters, ProbeExecutor, ProbeScheduler, ProbeWorker, ShutdownReport,
    WorkerInfo,
};
use crate::store::SampleStore;

/// Resolve hostname to IP address.
pub async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    // First, try to parse as an IP address directly
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Otherwise, resolve the hostname using tokio's DNS lookup
    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

/// Running loss monitor for one host.
///
/// Owns the sample store, the probe workers and the aggregation driver. All
/// shared state is reached through this handle; nothing is global. Dropping
/// it without [`Monitor::shutdown`] still cancels the workers and the driver,
/// without waiting for them.
pub struct Monitor {
    host: String,
    address: IpAddr,
    config: AppConfig,
    store: Arc<SampleStore>,
    counters: Arc<ProbeCounters>,
    scheduler: ProbeScheduler,
    driver_cancel: CancellationToken,
    driver_task: JoinHandle<()>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    started_at: Instant,
}

impl Monitor {
    /// Validate `host`, then start `frequency` probe workers and the driver.
    ///
    /// # Errors
    /// - `MonitorError::Config` if the configuration is invalid.
    /// - `MonitorError::HostUnresolvable` if the host does not resolve; no worker is started.
    pub async fn start(
        config: AppConfig,
        host: impl Into<String>,
        executor: Arc<dyn ProbeExecutor>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        let host = host.into();

        let address = resolve_host(&host)
            .await
            .map_err(|source| MonitorError::HostUnresolvable {
                host: host.clone(),
                source,
            })?;
        tracing::info!(host = %host, address = %address, "Target host resolved");

        let started_at = Instant::now();
        let store = Arc::new(SampleStore::new(config.store_capacity()));
        let counters = Arc::new(ProbeCounters::default());
        let instant_window = to_delta(config.driver.instant_window);

        // Initial all-"no data" snapshot so queries never wait on the first tick.
        let now = Utc::now();
        let histories = HistorySet::new(config.history.bucket_count, now);
        let initial = Snapshot::capture(
            &histories,
            &store,
            &counters,
            instant_window,
            now,
            started_at.elapsed(),
        );
        let (tx, snapshots) = watch::channel(Arc::new(initial));

        let scheduler = ProbeScheduler::new();
        let frequency = config.probe.frequency;
        for index in 0..frequency {
            let worker = ProbeWorker::new(
                host.clone(),
                index,
                frequency,
                Arc::clone(&executor),
                Arc::clone(&store),
                Arc::clone(&counters),
            );
            scheduler.spawn(worker)?;
        }

        let driver = Driver {
            store: Arc::clone(&store),
            counters: Arc::clone(&counters),
            histories,
            tick: config.driver.tick,
            instant_window,
            started_at,
            tx,
        };
        let driver_cancel = CancellationToken::new();
        let driver_task = tokio::spawn(driver.run(driver_cancel.clone()));

        tracing::info!(
            host = %host,
            frequency,
            executor = executor.name(),
            capacity = store.capacity(),
            "Monitor started"
        );

        Ok(Self {
            host,
            address,
            config,
            store,
            counters,
            scheduler,
            driver_cancel,
            driver_task,
            snapshots,
            started_at,
        })
    }

    /// Start with the system `ping` executor configured in `config.probe.ping`.
    pub async fn with_ping(config: AppConfig, host: impl Into<String>) -> Result<Self, MonitorError> {
        let executor = Arc::new(PingExecutor::new(config.probe.ping.clone()));
        Self::start(config, host, executor).await
    }

    /// Target host as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Address the host resolved to at startup.
    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// History at `resolution` as of the latest driver tick.
    pub fn current_history(&self, resolution: Resolution) -> History {
        self.snapshots.borrow().history(resolution).clone()
    }

    /// Average and maximum loss at `resolution` as of the latest driver tick.
    pub fn current_stats(&self, resolution: Resolution) -> LossStats {
        self.snapshots.borrow().stats(resolution)
    }

    /// Mean loss over the trailing instant window, read live from the store.
    pub fn instant_loss(&self) -> f64 {
        instant_loss(
            &self.store,
            to_delta(self.config.driver.instant_window),
            Utc::now(),
        )
    }

    /// Time since startup.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Number of raw samples currently retained.
    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }

    pub fn counters(&self) -> &Arc<ProbeCounters> {
        &self.counters
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receive one snapshot per driver tick.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    pub fn workers(&self) -> Vec<WorkerInfo> {
        self.scheduler.list_workers()
    }

    /// Stop one probe worker; the remaining ones keep sampling.
    ///
    /// An in-flight probe gets `driver.shutdown_grace` to finish.
    pub async fn stop_worker(&self, index: u32) -> Result<ShutdownReport, MonitorError> {
        Ok(self
            .scheduler
            .stop_worker(index, self.config.driver.shutdown_grace)
            .await?)
    }

    /// Stop probing, then the driver.
    ///
    /// Workers get `driver.shutdown_grace` to finish in-flight probes before
    /// they are abandoned. The store is released last, when `self` drops.
    pub async fn shutdown(mut self) -> Result<ShutdownReport, MonitorError> {
        tracing::info!(host = %self.host, "Shutting down monitor");

        let report = self
            .scheduler
            .shutdown_with_timeout(self.config.driver.shutdown_grace)
            .await;

        self.driver_cancel.cancel();
        (&mut self.driver_task)
            .await
            .map_err(|e| MonitorError::Shutdown(format!("aggregation driver failed: {e}")))?;

        tracing::info!(
            host = %self.host,
            samples = self.store.len(),
            uptime_secs = self.started_at.elapsed().as_secs(),
            "Monitor stopped"
        );
        Ok(report)
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.driver_cancel.cancel();
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("host", &self.host)
            .field("address", &self.address)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_host_invalid() {
        assert!(resolve_host("no such host.invalid").await.is_err());
    }

    #[test]
    fn test_to_delta_saturates() {
        assert_eq!(to_delta(Duration::from_secs(1)), TimeDelta::seconds(1));
        assert_eq!(to_delta(Duration::MAX), TimeDelta::MAX);
    }
}
