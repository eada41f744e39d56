pub mod price;
pub mod price_update;
pub mod severity;
pub mod symbol;

pub use price::{Percent, Price};
pub use price_update::{PriceUpdate, ValidationError};
pub use severity::Severity;
pub use symbol::{Symbol, SymbolError};
