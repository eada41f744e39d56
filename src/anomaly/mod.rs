pub mod store;
pub mod types;

pub use store::AnomalyStore;
pub use types::PriceAnomaly;
