//! A worker owns one partition's input queue and the subset of
//! symbol state hashed to it (§4.2).

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};

use crate::anomaly::store::AnomalyStore;
use crate::anomaly::types::PriceAnomaly;
use crate::core::price::{Percent, Price};
use crate::core::price_update::PriceUpdate;
use crate::core::severity::Severity;
use crate::core::symbol::Symbol;
use crate::memory::partition_queue::PartitionQueue;
use crate::stats::store::StatisticsStore;
use crate::window::{MovingWindow, SlidingTimeWindow};

/// Minimum graceful-drain deadline once a worker observes the
/// cancellation signal (§4.7: "bounded deadline, >= 5s").
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// Consecutive faults tolerated within `FAULT_WINDOW` before a
/// partition marks itself permanently unhealthy (SPEC_FULL fault
/// containment supplement).
const MAX_PARTITION_FAULTS: usize = 5;
const FAULT_WINDOW: Duration = Duration::from_secs(10);

const EMPTY_QUEUE_BACKOFF: Duration = Duration::from_micros(200);

pub struct WorkerConfig {
    pub partition_index: usize,
    pub moving_average_window: usize,
    pub anomaly_threshold_percent: Percent,
    pub sliding_window: ChronoDuration,
}

/// Shared counters every worker increments (§5 — atomic integers).
pub struct WorkerCounters {
    pub total_processed: AtomicU64,
    pub anomalies_detected: AtomicU64,
    pub dropped_on_shutdown: AtomicU64,
}

impl WorkerCounters {
    pub fn new() -> Self {
        Self {
            total_processed: AtomicU64::new(0),
            anomalies_detected: AtomicU64::new(0),
            dropped_on_shutdown: AtomicU64::new(0),
        }
    }
}

struct SymbolWorkerState {
    moving: MovingWindow,
    sliding: SlidingTimeWindow,
}

/// Spawns the OS thread implementing a partition's main loop (§4.2).
pub fn spawn(
    queue: Arc<PartitionQueue<PriceUpdate>>,
    stats_store: Arc<StatisticsStore>,
    anomaly_store: Arc<AnomalyStore>,
    counters: Arc<WorkerCounters>,
    shutdown: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    config: WorkerConfig,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("partition-worker-{}", config.partition_index))
        .spawn(move || run(queue, stats_store, anomaly_store, counters, shutdown, alive, config))
        .expect("failed to spawn OS thread for partition worker")
}

fn run(
    queue: Arc<PartitionQueue<PriceUpdate>>,
    stats_store: Arc<StatisticsStore>,
    anomaly_store: Arc<AnomalyStore>,
    counters: Arc<WorkerCounters>,
    shutdown: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    config: WorkerConfig,
) {
    let mut symbols: HashMap<Symbol, SymbolWorkerState> = HashMap::new();
    let mut fault_timestamps: Vec<Instant> = Vec::new();
    let mut drain_deadline: Option<Instant> = None;

    tracing::info!(partition = config.partition_index, "partition worker started");

    loop {
        match queue.try_dequeue() {
            Some(update) => {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    process_update(
                        &mut symbols,
                        &stats_store,
                        &anomaly_store,
                        &counters,
                        &config,
                        update,
                    )
                }));
                if outcome.is_err() {
                    tracing::error!(partition = config.partition_index, "partition worker caught a panic while processing an update");
                    fault_timestamps.push(Instant::now());
                    fault_timestamps.retain(|t| t.elapsed() < FAULT_WINDOW);
                    if fault_timestamps.len() > MAX_PARTITION_FAULTS {
                        tracing::error!(
                            partition = config.partition_index,
                            "partition worker exceeded its fault budget; marking unhealthy and exiting"
                        );
                        alive.store(false, Ordering::Relaxed);
                        return;
                    }
                }
            }
            None => {
                if shutdown.load(Ordering::Relaxed) {
                    if queue.is_empty() {
                        break;
                    }
                    let deadline = *drain_deadline.get_or_insert_with(|| Instant::now() + DRAIN_DEADLINE);
                    if Instant::now() >= deadline {
                        let dropped = drain_remaining(&queue);
                        if dropped > 0 {
                            tracing::warn!(
                                partition = config.partition_index,
                                dropped,
                                "drain deadline exceeded; dropping residual queue items"
                            );
                            counters.dropped_on_shutdown.fetch_add(dropped as u64, Ordering::Relaxed);
                        }
                        break;
                    }
                } else {
                    thread::sleep(EMPTY_QUEUE_BACKOFF);
                }
            }
        }
    }

    tracing::info!(partition = config.partition_index, "partition worker stopped");
}

fn drain_remaining(queue: &PartitionQueue<PriceUpdate>) -> usize {
    let mut dropped = 0;
    while queue.try_dequeue().is_some() {
        dropped += 1;
    }
    dropped
}

/// The seven-step per-update procedure (§4.2).
fn process_update(
    symbols: &mut HashMap<Symbol, SymbolWorkerState>,
    stats_store: &StatisticsStore,
    anomaly_store: &AnomalyStore,
    counters: &WorkerCounters,
    config: &WorkerConfig,
    update: PriceUpdate,
) {
    let now = Utc::now();
    let PriceUpdate { symbol, price, timestamp } = update;

    if !symbols.contains_key(&symbol) {
        // Step 1: first observation.
        let mut state = SymbolWorkerState {
            moving: MovingWindow::new(config.moving_average_window),
            sliding: SlidingTimeWindow::new(),
        };
        state.moving.push(price);
        state.sliding.push(timestamp, price);
        stats_store.insert_first(&symbol, price, timestamp);
        symbols.insert(symbol, state);
        counters.total_processed.fetch_add(1, Ordering::Relaxed);
        return;
    }

    let state = symbols.get_mut(&symbol).expect("checked above");

    // Step 2: capture the pre-update current price for observability.
    let old_price = stats_store
        .snapshot(&symbol)
        .map(|s| s.current_price)
        .unwrap_or(price);
    tracing::trace!(%symbol, old_price = %old_price, new_price = %price, "applying price update");

    // Step 3: moving window + incremental mean.
    state.moving.push(price);
    let moving_average = state.moving.mean();

    // Step 4: sliding time window, evicted against wall-clock now.
    state.sliding.push(timestamp, price);
    let cutoff = now - config.sliding_window;
    state.sliding.evict_older_than(cutoff);

    // Step 5: current price / min / max / count / last update time.
    stats_store.apply_update(&symbol, price, moving_average, timestamp);
    counters.total_processed.fetch_add(1, Ordering::Relaxed);

    // Step 6: anomaly test against the earliest in-window reference.
    if state.sliding.len() > 1 {
        if let Some(reference) = state.sliding.earliest_price() {
            detect_anomaly(anomaly_store, counters, config, &symbol, reference, price, now);
        }
    }
}

fn detect_anomaly(
    anomaly_store: &AnomalyStore,
    counters: &WorkerCounters,
    config: &WorkerConfig,
    symbol: &Symbol,
    reference: Price,
    new_price: Price,
    now: chrono::DateTime<Utc>,
) {
    let Some(change_percent) = new_price.percent_change_from(reference) else {
        return;
    };
    if change_percent.abs().raw() < config.anomaly_threshold_percent.raw() {
        return;
    }

    let severity = Severity::classify(change_percent.abs(), config.anomaly_threshold_percent);
    anomaly_store.add(PriceAnomaly {
        symbol: symbol.clone(),
        old_price: reference,
        new_price,
        change_percent,
        severity,
        detected_at: now,
    });
    counters.anomalies_detected.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbol::Symbol;

    fn config() -> WorkerConfig {
        WorkerConfig {
            partition_index: 0,
            moving_average_window: 4,
            anomaly_threshold_percent: Percent::from_f64(2.0),
            sliding_window: ChronoDuration::milliseconds(1_000),
        }
    }

    #[test]
    fn first_observation_records_no_anomaly() {
        let stats = StatisticsStore::new();
        let anomalies = AnomalyStore::new(16);
        let counters = WorkerCounters::new();
        let mut symbols = HashMap::new();
        let symbol = Symbol::parse("AAPL").unwrap();

        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &config(),
            PriceUpdate::new("AAPL", 150.0, Utc::now()).unwrap(),
        );

        let snap = stats.snapshot(&symbol).unwrap();
        assert_eq!(snap.current_price.as_f64(), 150.0);
        assert_eq!(snap.update_count, 1);
        assert_eq!(anomalies.count(None), 0);
    }

    #[test]
    fn anomaly_classification_matches_scenario_3() {
        let stats = StatisticsStore::new();
        let anomalies = AnomalyStore::new(16);
        let counters = WorkerCounters::new();
        let mut symbols = HashMap::new();
        let t0 = Utc::now();

        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &config(),
            PriceUpdate::new("Y", 100.0, t0).unwrap(),
        );
        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &config(),
            PriceUpdate::new("Y", 103.0, t0 + ChronoDuration::milliseconds(100)).unwrap(),
        );

        let recent = anomalies.get_recent(1, None);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].change_percent.as_f64(), 3.0);
        assert_eq!(recent[0].severity, Severity::Low);

        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &config(),
            PriceUpdate::new("Y", 125.0, t0 + ChronoDuration::milliseconds(200)).unwrap(),
        );
        let recent = anomalies.get_recent(1, None);
        assert_eq!(recent[0].severity, Severity::Critical);
        assert_eq!(recent[0].old_price.as_f64(), 100.0);
    }

    #[test]
    fn window_eviction_matches_scenario_4() {
        // Eviction keys off wall-clock `now`, not the update's own
        // timestamp (§4.2), so this exercises it with a short real
        // sliding window and an actual sleep rather than back-dated
        // timestamps.
        let short_window = WorkerConfig {
            sliding_window: ChronoDuration::milliseconds(50),
            ..config()
        };
        let stats = StatisticsStore::new();
        let anomalies = AnomalyStore::new(16);
        let counters = WorkerCounters::new();
        let mut symbols = HashMap::new();

        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &short_window,
            PriceUpdate::new("Z", 100.0, Utc::now()).unwrap(),
        );
        std::thread::sleep(Duration::from_millis(80));
        process_update(
            &mut symbols,
            &stats,
            &anomalies,
            &counters,
            &short_window,
            PriceUpdate::new("Z", 101.0, Utc::now()).unwrap(),
        );

        assert_eq!(anomalies.count(None), 0);
    }

    #[test]
    fn total_processed_matches_sum_of_update_counts() {
        let stats = StatisticsStore::new();
        let anomalies = AnomalyStore::new(16);
        let counters = WorkerCounters::new();
        let mut symbols = HashMap::new();
        let t0 = Utc::now();

        for (symbol, price) in [("A", 10.0), ("A", 11.0), ("B", 20.0)] {
            process_update(
                &mut symbols,
                &stats,
                &anomalies,
                &counters,
                &config(),
                PriceUpdate::new(symbol, price, t0).unwrap(),
            );
        }

        let total: u64 = stats.snapshot_all().iter().map(|s| s.update_count).sum();
        assert_eq!(total, 3);
        assert_eq!(counters.total_processed.load(Ordering::Relaxed), 3);
    }
}
