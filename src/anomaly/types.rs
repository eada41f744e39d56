//! Anomaly record type (§3).

use chrono::{DateTime, Utc};

use crate::core::price::{Percent, Price};
use crate::core::severity::Severity;
use crate::core::symbol::Symbol;

/// A price change whose magnitude met or exceeded the configured
/// threshold. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct PriceAnomaly {
    pub symbol: Symbol,
    pub old_price: Price,
    pub new_price: Price,
    pub change_percent: Percent,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
}
