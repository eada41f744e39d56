//! Engine lifecycle: `Start`/`Stop`/drain, aggregate statistics and
//! health (§4.7).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
#[cfg(test)]
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::anomaly::store::AnomalyStore;
use crate::anomaly::types::PriceAnomaly;
use crate::config::EngineConfig;
use crate::core::symbol::Symbol;
use crate::error::EnqueueError;
use crate::memory::partition_queue::PartitionQueue;
use crate::partition::worker::{self, WorkerConfig, WorkerCounters};
use crate::router::Router;
use crate::stats::store::StatisticsStore;
use crate::stats::symbol_statistics::SymbolStatisticsView;
use crate::throughput::ThroughputCounter;

/// Queue depth above which the engine reports itself degraded (§6).
const DEGRADED_QUEUE_DEPTH: usize = 10_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone)]
pub struct ProcessingStatistics {
    pub total_processed: u64,
    pub anomalies_detected: u64,
    pub active_symbols: usize,
    pub queue_size: usize,
    pub throughput_per_second: u64,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub health: Health,
    pub statistics: ProcessingStatistics,
}

struct Runtime {
    router: Arc<Router>,
    worker_handles: Vec<JoinHandle<()>>,
    alive_flags: Vec<Arc<AtomicBool>>,
    shutdown: Arc<AtomicBool>,
    throughput: Arc<ThroughputCounter>,
    ticker_shutdown: Arc<AtomicBool>,
    ticker_handle: JoinHandle<()>,
}

/// The processing engine (§1, §2). Exclusively owns the stats store,
/// anomaly store and partition queues for the duration of a run.
pub struct Engine {
    config: EngineConfig,
    stats_store: Arc<StatisticsStore>,
    anomaly_store: Arc<AnomalyStore>,
    counters: Arc<WorkerCounters>,
    state: Mutex<EngineState>,
    runtime: Mutex<Option<Runtime>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let anomaly_store = Arc::new(AnomalyStore::new(config.recent_anomalies_capacity));
        Self {
            config,
            stats_store: Arc::new(StatisticsStore::new()),
            anomaly_store,
            counters: Arc::new(WorkerCounters::new()),
            state: Mutex::new(EngineState::Created),
            runtime: Mutex::new(None),
        }
    }

    /// Starts `P` partition workers and the throughput ticker.
    /// Idempotent: a second call while `Running` is a no-op (§4.7).
    pub fn start(&self) {
        let mut state = self.state.lock();
        if *state == EngineState::Running {
            return;
        }
        *state = EngineState::Starting;
        tracing::info!("engine starting");

        let partitions = self.config.resolved_partitions();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut queues = Vec::with_capacity(partitions);
        let mut worker_handles = Vec::with_capacity(partitions);
        let mut alive_flags = Vec::with_capacity(partitions);

        for index in 0..partitions {
            let queue = Arc::new(PartitionQueue::new(self.config.channel_capacity));
            let alive = Arc::new(AtomicBool::new(true));

            let handle = worker::spawn(
                queue.clone(),
                self.stats_store.clone(),
                self.anomaly_store.clone(),
                self.counters.clone(),
                shutdown.clone(),
                alive.clone(),
                WorkerConfig {
                    partition_index: index,
                    moving_average_window: self.config.moving_average_window,
                    anomaly_threshold_percent: self.config.anomaly_threshold_percent,
                    sliding_window: chrono::Duration::milliseconds(self.config.sliding_window_milliseconds as i64),
                },
            );

            queues.push(queue);
            worker_handles.push(handle);
            alive_flags.push(alive);
        }

        let enqueued_total = Arc::new(AtomicU64::new(0));
        let router = Arc::new(Router::new(queues, shutdown.clone(), enqueued_total.clone()));

        let throughput = Arc::new(ThroughputCounter::new(enqueued_total));
        let ticker_shutdown = Arc::new(AtomicBool::new(false));
        let ticker_handle = throughput.spawn_ticker(ticker_shutdown.clone());

        *self.runtime.lock() = Some(Runtime {
            router,
            worker_handles,
            alive_flags,
            shutdown,
            throughput,
            ticker_shutdown,
            ticker_handle,
        });

        *state = EngineState::Running;
        tracing::info!(partitions, "engine running");
    }

    /// Signals cancellation, waits for every worker to drain-or-hit-
    /// deadline and terminate, then returns. After this call every
    /// `enqueue_update` fails with `ShuttingDown` (§4.7).
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != EngineState::Running {
            return;
        }
        *state = EngineState::Stopping;
        tracing::info!("engine stopping");

        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown.store(true, Ordering::Relaxed);
            for handle in runtime.worker_handles {
                let _ = handle.join();
            }
            runtime.ticker_shutdown.store(true, Ordering::Relaxed);
            let _ = runtime.ticker_handle.join();
        }

        *state = EngineState::Stopped;
        tracing::info!("engine stopped");
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Routes `(symbol, price, timestamp)` to its partition. Never
    /// blocks on worker progress (§6).
    pub fn enqueue_update(&self, symbol: &str, price: f64, timestamp: DateTime<Utc>) -> Result<(), EnqueueError> {
        match self.runtime.lock().as_ref() {
            Some(runtime) => runtime.router.enqueue_update(symbol, price, timestamp),
            None => Err(EnqueueError::ShuttingDown),
        }
    }

    pub fn get_symbol_statistics(&self, symbol: &Symbol) -> Option<SymbolStatisticsView> {
        self.stats_store.snapshot(symbol)
    }

    pub fn get_all_statistics(&self) -> Vec<SymbolStatisticsView> {
        self.stats_store.snapshot_all()
    }

    pub fn get_recent_anomalies(&self, take: usize, symbol: Option<&Symbol>) -> Vec<PriceAnomaly> {
        self.anomaly_store.get_recent(take, symbol)
    }

    pub fn count_anomalies(&self, symbol: Option<&Symbol>) -> u64 {
        self.anomaly_store.count(symbol)
    }

    /// Never blocks on worker progress (§4.7).
    pub fn get_processing_statistics(&self) -> ProcessingStatistics {
        let (queue_size, throughput_per_second) = match self.runtime.lock().as_ref() {
            Some(runtime) => (runtime.router.total_queue_depth(), runtime.throughput.per_second()),
            None => (0, 0),
        };

        ProcessingStatistics {
            total_processed: self.counters.total_processed.load(Ordering::Relaxed),
            anomalies_detected: self.counters.anomalies_detected.load(Ordering::Relaxed),
            active_symbols: self.stats_store.count(),
            queue_size,
            throughput_per_second,
        }
    }

    /// *degraded* when the summed queue depth exceeds 10,000; *unhealthy*
    /// if any worker has terminated unexpectedly; else *healthy* (§6).
    pub fn health(&self) -> HealthReport {
        let statistics = self.get_processing_statistics();
        let any_worker_dead = self
            .runtime
            .lock()
            .as_ref()
            .map(|runtime| runtime.alive_flags.iter().any(|alive| !alive.load(Ordering::Relaxed)))
            .unwrap_or(false);

        let health = if any_worker_dead {
            Health::Unhealthy
        } else if statistics.queue_size > DEGRADED_QUEUE_DEPTH {
            Health::Degraded
        } else {
            Health::Healthy
        };

        HealthReport { health, statistics }
    }
}

/// The bounded-deadline joins in `stop` mean `Drop` only needs to be a
/// safety net for engines that were never explicitly stopped.
impl Drop for Engine {
    fn drop(&mut self) {
        if self.state() == EngineState::Running {
            self.stop();
        }
    }
}
