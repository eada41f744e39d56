//! Per-symbol aggregate statistics (§3).

use chrono::{DateTime, Utc};

use crate::core::price::Price;
use crate::core::symbol::Symbol;

/// Mutable aggregate owned by the single worker whose partition the
/// symbol hashes to.
#[derive(Debug, Clone)]
pub struct SymbolStatistics {
    pub symbol: Symbol,
    pub current_price: Price,
    pub moving_average: Price,
    pub update_count: u64,
    pub last_update_time: DateTime<Utc>,
    pub min_price: Price,
    pub max_price: Price,
}

impl SymbolStatistics {
    pub fn first_observation(symbol: Symbol, price: Price, at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            current_price: price,
            moving_average: price,
            update_count: 1,
            last_update_time: at,
            min_price: price,
            max_price: price,
        }
    }

    /// Applies a subsequent observation. `moving_average` must already
    /// reflect the post-push mean of the caller's `MovingWindow`.
    pub fn apply_update(&mut self, price: Price, moving_average: Price, at: DateTime<Utc>) {
        self.current_price = price;
        self.moving_average = moving_average;
        self.update_count += 1;
        self.last_update_time = at;
        if price < self.min_price {
            self.min_price = price;
        }
        if price > self.max_price {
            self.max_price = price;
        }
    }
}

/// Read-only snapshot handed to query callers; a plain copy, so it can
/// never observe a torn write (§4.5).
pub type SymbolStatisticsView = SymbolStatistics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_matches_scenario_1() {
        let stats = SymbolStatistics::first_observation(
            Symbol::parse("AAPL").unwrap(),
            Price::from_f64(150.0),
            Utc::now(),
        );
        assert_eq!(stats.current_price.as_f64(), 150.0);
        assert_eq!(stats.moving_average.as_f64(), 150.0);
        assert_eq!(stats.min_price.as_f64(), 150.0);
        assert_eq!(stats.max_price.as_f64(), 150.0);
        assert_eq!(stats.update_count, 1);
    }

    #[test]
    fn min_max_invariant_holds_after_updates() {
        let mut stats = SymbolStatistics::first_observation(
            Symbol::parse("X").unwrap(),
            Price::from_f64(100.0),
            Utc::now(),
        );
        stats.apply_update(Price::from_f64(90.0), Price::from_f64(95.0), Utc::now());
        stats.apply_update(Price::from_f64(120.0), Price::from_f64(103.3), Utc::now());
        assert!(stats.min_price <= stats.current_price);
        assert!(stats.current_price <= stats.max_price);
        assert_eq!(stats.min_price.as_f64(), 90.0);
        assert_eq!(stats.max_price.as_f64(), 120.0);
        assert_eq!(stats.update_count, 3);
    }
}
