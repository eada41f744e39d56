//! Time-ordered queue of recent price observations, used to pick the
//! anomaly-detection reference price (§4.4).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::core::price::Price;

pub struct SlidingTimeWindow {
    entries: VecDeque<(DateTime<Utc>, Price)>,
}

impl SlidingTimeWindow {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, observed_at: DateTime<Utc>, price: Price) {
        self.entries.push_back((observed_at, price));
    }

    /// Removes every entry older than `cutoff`, in FIFO order, in
    /// amortised O(1) per evicted entry.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) {
        while let Some(&(observed_at, _)) = self.entries.front() {
            if observed_at < cutoff {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// The earliest price still retained — the anomaly-detection
    /// reference (§4.2 step 6).
    pub fn earliest_price(&self) -> Option<Price> {
        self.entries.front().map(|&(_, price)| price)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SlidingTimeWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn earliest_price_is_the_oldest_retained_entry() {
        let mut w = SlidingTimeWindow::new();
        let t0 = Utc::now();
        w.push(t0, Price::from_f64(100.0));
        w.push(t0 + Duration::milliseconds(100), Price::from_f64(103.0));
        assert_eq!(w.earliest_price(), Some(Price::from_f64(100.0)));
    }

    #[test]
    fn eviction_matches_scenario_4() {
        let mut w = SlidingTimeWindow::new();
        let t0 = Utc::now();
        w.push(t0, Price::from_f64(100.0));
        let t1 = t0 + Duration::milliseconds(1500);
        w.evict_older_than(t1 - Duration::milliseconds(1000));
        w.push(t1, Price::from_f64(101.0));
        assert_eq!(w.len(), 1);
        assert_eq!(w.earliest_price(), Some(Price::from_f64(101.0)));
    }

    #[test]
    fn empty_window_has_no_reference() {
        let w = SlidingTimeWindow::new();
        assert_eq!(w.earliest_price(), None);
    }
}
