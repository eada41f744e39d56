//! In-memory mapping from symbol to its `SymbolStatistics` (§4.5).
//!
//! Grounded on the teacher's `engine::db::Database`, which sharded a
//! `DashMap<SymbolId, Arc<RingBuffer>>` by key with a `get_or_create`-
//! on-write pattern. Entries are guarded individually with
//! `parking_lot::RwLock` so a query thread's snapshot read never races
//! a worker's in-place write across fields.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::core::price::Price;
use crate::core::symbol::Symbol;
use crate::stats::symbol_statistics::{SymbolStatistics, SymbolStatisticsView};

pub struct StatisticsStore {
    entries: DashMap<Symbol, RwLock<SymbolStatistics>>,
}

impl StatisticsStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Records the first observation of `symbol`. Only ever called by
    /// the single worker that owns the symbol's partition.
    pub fn insert_first(&self, symbol: &Symbol, price: Price, at: DateTime<Utc>) {
        let stats = SymbolStatistics::first_observation(symbol.clone(), price, at);
        self.entries.insert(symbol.clone(), RwLock::new(stats));
    }

    /// Applies a subsequent observation to an already-tracked symbol.
    /// Panics if `symbol` has never been observed — callers always
    /// route through `insert_first` on the first update, so this is a
    /// worker-local invariant, not a caller-facing error.
    pub fn apply_update(&self, symbol: &Symbol, price: Price, moving_average: Price, at: DateTime<Utc>) {
        let entry = self
            .entries
            .get(symbol)
            .expect("apply_update called before insert_first for this symbol");
        entry.write().apply_update(price, moving_average, at);
    }

    pub fn snapshot(&self, symbol: &Symbol) -> Option<SymbolStatisticsView> {
        self.entries.get(symbol).map(|entry| entry.read().clone())
    }

    pub fn snapshot_all(&self) -> Vec<SymbolStatisticsView> {
        self.entries
            .iter()
            .map(|entry| entry.value().read().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for StatisticsStore {
    fn default() -> Self {
        Self::new()
    }
}
