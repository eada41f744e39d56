pub mod store;
pub mod symbol_statistics;

pub use store::StatisticsStore;
pub use symbol_statistics::{SymbolStatistics, SymbolStatisticsView};
