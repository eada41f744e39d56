//! Producer-facing dispatcher: validates, partitions and enqueues
//! updates without ever blocking the caller (§4.1).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::price_update::PriceUpdate;
use crate::error::EnqueueError;
use crate::memory::partition_queue::PartitionQueue;

/// `stable_hash(symbol) mod P` — deterministic across runs of the same
/// binary. `DefaultHasher` (unlike `HashMap`'s `RandomState`) is not
/// seed-randomized, so this satisfies §4.1 without any extra plumbing.
pub fn stable_hash(symbol: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    hasher.finish()
}

pub struct Router {
    queues: Vec<Arc<PartitionQueue<PriceUpdate>>>,
    shutting_down: Arc<AtomicBool>,
    enqueued_total: Arc<AtomicU64>,
}

impl Router {
    pub fn new(
        queues: Vec<Arc<PartitionQueue<PriceUpdate>>>,
        shutting_down: Arc<AtomicBool>,
        enqueued_total: Arc<AtomicU64>,
    ) -> Self {
        Self {
            queues,
            shutting_down,
            enqueued_total,
        }
    }

    pub fn partition_count(&self) -> usize {
        self.queues.len()
    }

    pub fn partition_for(&self, symbol: &str) -> usize {
        (stable_hash(symbol) % self.queues.len() as u64) as usize
    }

    /// Sum of queue depths across all partitions — `QueueSize` in
    /// `ProcessingStatistics` (§3).
    pub fn total_queue_depth(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    pub fn queue_depth(&self, partition: usize) -> usize {
        self.queues[partition].len()
    }

    /// Validates and routes `(symbol, price, timestamp)` to its
    /// partition queue (§6).
    pub fn enqueue_update(&self, symbol: &str, price: f64, timestamp: DateTime<Utc>) -> Result<(), EnqueueError> {
        if self.shutting_down.load(Ordering::Relaxed) {
            return Err(EnqueueError::ShuttingDown);
        }

        let update = PriceUpdate::new(symbol, price, timestamp)?;
        let partition = self.partition_for(update.symbol.as_str());

        match self.queues[partition].try_enqueue(update) {
            Ok(()) => {
                self.enqueued_total.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(_rejected) => Err(EnqueueError::Backpressure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(capacity: usize, partitions: usize) -> Router {
        let queues = (0..partitions)
            .map(|_| Arc::new(PartitionQueue::new(capacity)))
            .collect();
        Router::new(queues, Arc::new(AtomicBool::new(false)), Arc::new(AtomicU64::new(0)))
    }

    #[test]
    fn partitioning_is_deterministic_across_calls() {
        let r = router(8, 4);
        let a = r.partition_for("AAPL");
        let b = r.partition_for("AAPL");
        assert_eq!(a, b);
    }

    #[test]
    fn same_symbol_always_lands_on_the_same_partition() {
        let r = router(8, 4);
        let p1 = r.partition_for("MSFT");
        r.enqueue_update("MSFT", 100.0, Utc::now()).unwrap();
        r.enqueue_update("MSFT", 101.0, Utc::now()).unwrap();
        assert_eq!(r.queue_depth(p1), 2);
    }

    #[test]
    fn backpressure_matches_scenario_5() {
        let r = router(4, 1);
        for i in 0..4 {
            assert!(r.enqueue_update("AAPL", 100.0 + i as f64, Utc::now()).is_ok());
        }
        assert_eq!(
            r.enqueue_update("AAPL", 105.0, Utc::now()),
            Err(EnqueueError::Backpressure)
        );
    }

    #[test]
    fn invalid_update_is_rejected_before_touching_a_queue() {
        let r = router(8, 1);
        let result = r.enqueue_update("aapl", 100.0, Utc::now());
        assert!(matches!(result, Err(EnqueueError::Invalid(_))));
        assert_eq!(r.total_queue_depth(), 0);
    }

    #[test]
    fn shutting_down_rejects_every_enqueue() {
        let queues = vec![Arc::new(PartitionQueue::new(8))];
        let shutting_down = Arc::new(AtomicBool::new(true));
        let r = Router::new(queues, shutting_down, Arc::new(AtomicU64::new(0)));
        assert_eq!(
            r.enqueue_update("AAPL", 100.0, Utc::now()),
            Err(EnqueueError::ShuttingDown)
        );
    }
}
