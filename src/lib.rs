//! Real-time, in-memory market data processing engine: ingests price
//! updates, maintains per-symbol rolling statistics, detects
//! sliding-window price anomalies, and exposes both to queriers.

pub mod anomaly;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod memory;
pub mod partition;
pub mod router;
pub mod simulate;
pub mod stats;
pub mod throughput;
pub mod window;

pub use config::EngineConfig;
pub use engine::{Engine, EngineState, Health, HealthReport, ProcessingStatistics};
pub use error::EnqueueError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
