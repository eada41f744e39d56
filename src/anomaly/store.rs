//! Bounded ring of recent anomalies, shared across all partition
//! workers (§4.6, §5).
//!
//! The teacher had no anomaly-detection equivalent; the bounded-ring-
//! with-eviction shape is grounded on
//! `memory::ring_buffer::RingBuffer`'s capacity/eviction discipline,
//! reimplemented as a safe multi-writer/multi-reader structure (the
//! teacher's ring was single-producer/single-consumer) behind
//! `parking_lot::RwLock`, per §5's "append under a short exclusive
//! lock; reads under a shared lock".

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::anomaly::types::PriceAnomaly;
use crate::core::symbol::Symbol;

pub struct AnomalyStore {
    capacity: usize,
    entries: RwLock<VecDeque<PriceAnomaly>>,
    /// Monotonic total appended since start, independent of eviction
    /// (§4.6 — `Count` without a filter).
    total_appended: AtomicU64,
}

impl AnomalyStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::with_capacity(capacity.max(1))),
            total_appended: AtomicU64::new(0),
        }
    }

    /// Appends `anomaly`, evicting the oldest entry if the ring is
    /// already full.
    pub fn add(&self, anomaly: PriceAnomaly) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(anomaly);
        self.total_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Up to `take` entries, newest-first, optionally filtered by
    /// symbol.
    pub fn get_recent(&self, take: usize, symbol_filter: Option<&Symbol>) -> Vec<PriceAnomaly> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|a| symbol_filter.map_or(true, |s| &a.symbol == s))
            .take(take)
            .cloned()
            .collect()
    }

    /// Total appended since start when `symbol_filter` is `None`
    /// (monotonic, eviction-independent); currently-retained matching
    /// entries when a filter is given (§9 Open Question resolution).
    pub fn count(&self, symbol_filter: Option<&Symbol>) -> u64 {
        match symbol_filter {
            None => self.total_appended.load(Ordering::Relaxed),
            Some(symbol) => {
                let entries = self.entries.read();
                entries.iter().filter(|a| &a.symbol == symbol).count() as u64
            }
        }
    }

    pub fn retained_len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::Price;
    use crate::core::severity::Severity;
    use chrono::Utc;

    fn anomaly(symbol: &str) -> PriceAnomaly {
        PriceAnomaly {
            symbol: Symbol::parse(symbol).unwrap(),
            old_price: Price::from_f64(100.0),
            new_price: Price::from_f64(103.0),
            change_percent: crate::core::price::Percent::from_f64(3.0),
            severity: Severity::Low,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn eviction_drops_the_oldest_entry() {
        let store = AnomalyStore::new(2);
        store.add(anomaly("AAA"));
        store.add(anomaly("BBB"));
        store.add(anomaly("CCC"));
        assert_eq!(store.retained_len(), 2);
        let recent = store.get_recent(10, None);
        assert_eq!(recent[0].symbol.as_str(), "CCC");
        assert_eq!(recent[1].symbol.as_str(), "BBB");
    }

    #[test]
    fn unfiltered_count_is_monotonic_despite_eviction() {
        let store = AnomalyStore::new(1);
        store.add(anomaly("AAA"));
        store.add(anomaly("BBB"));
        assert_eq!(store.retained_len(), 1);
        assert_eq!(store.count(None), 2);
    }

    #[test]
    fn filtered_count_reflects_only_currently_retained_entries() {
        let store = AnomalyStore::new(1);
        let aaa = Symbol::parse("AAA").unwrap();
        store.add(anomaly("AAA"));
        store.add(anomaly("BBB")); // evicts AAA
        assert_eq!(store.count(Some(&aaa)), 0);
    }

    #[test]
    fn get_recent_respects_symbol_filter() {
        let store = AnomalyStore::new(10);
        store.add(anomaly("AAA"));
        store.add(anomaly("BBB"));
        let aaa = Symbol::parse("AAA").unwrap();
        let recent = store.get_recent(10, Some(&aaa));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].symbol.as_str(), "AAA");
    }
}
