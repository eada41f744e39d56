//! Live throughput counter: samples the router's enqueue counter once
//! a second (§4.1, §4.7 — "a ticker maintained by the lifecycle
//! component").

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

pub struct ThroughputCounter {
    enqueued_total: Arc<AtomicU64>,
    per_second: Arc<AtomicU64>,
}

impl ThroughputCounter {
    pub fn new(enqueued_total: Arc<AtomicU64>) -> Self {
        Self {
            enqueued_total,
            per_second: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn per_second(&self) -> u64 {
        self.per_second.load(Ordering::Relaxed)
    }

    /// Spawns the sampling ticker thread. Runs until `shutdown` is set.
    pub fn spawn_ticker(&self, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        let enqueued_total = self.enqueued_total.clone();
        let per_second = self.per_second.clone();
        thread::Builder::new()
            .name("throughput-ticker".to_string())
            .spawn(move || {
                let mut last_sample = enqueued_total.load(Ordering::Relaxed);
                while !shutdown.load(Ordering::Relaxed) {
                    thread::sleep(SAMPLE_INTERVAL);
                    let current = enqueued_total.load(Ordering::Relaxed);
                    per_second.store(current.saturating_sub(last_sample), Ordering::Relaxed);
                    last_sample = current;
                }
            })
            .expect("failed to spawn OS thread for throughput ticker")
    }
}
