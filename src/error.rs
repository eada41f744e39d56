//! Error types for the producer and engine-lifecycle contracts (§6, §7).
//! `SymbolNotFound` is deliberately absent here — an unobserved symbol
//! is represented as `Option::None` on the query path, never an error.

use crate::core::price_update::ValidationError;

/// Outcome of `Router::enqueue_update` (§6).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnqueueError {
    #[error("update rejected: partition queue is at capacity")]
    Backpressure,
    #[error("update rejected: {0}")]
    Invalid(#[from] ValidationError),
    #[error("update rejected: engine is shutting down")]
    ShuttingDown,
}

/// Failures that can occur while bringing the engine up.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn partition worker {partition}: {source}")]
    WorkerSpawn {
        partition: usize,
        #[source]
        source: std::io::Error,
    },
}
