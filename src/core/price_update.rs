//! The producer-facing observation type and its validation.

use chrono::{DateTime, Duration, Utc};

use crate::core::price::Price;
use crate::core::symbol::{Symbol, SymbolError};

/// An immutable price observation (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub symbol: Symbol,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
}

/// Why a `PriceUpdate` failed validation (§3, surfaced as
/// `EnqueueError::Invalid`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid symbol: {0}")]
    Symbol(#[from] SymbolError),
    #[error("price must be > 0 and < 1,000,000, got {0}")]
    PriceOutOfRange(f64),
    #[error("timestamp {0} is more than 5 minutes in the future")]
    TimestampInFuture(DateTime<Utc>),
}

impl PriceUpdate {
    pub fn new(symbol: &str, price: f64, timestamp: DateTime<Utc>) -> Result<Self, ValidationError> {
        let symbol = Symbol::parse(symbol)?;
        if !(price > 0.0 && price < 1_000_000.0) {
            return Err(ValidationError::PriceOutOfRange(price));
        }
        if timestamp > Utc::now() + Duration::minutes(5) {
            return Err(ValidationError::TimestampInFuture(timestamp));
        }
        Ok(Self {
            symbol,
            price: Price::from_f64(price),
            timestamp,
        })
    }
}
