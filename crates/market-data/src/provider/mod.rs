//! Quote source abstractions and implementations.
//!
//! - `MarketDataProvider` - the trait every source implements
//! - `coingecko` - the remote HTTP source
//! - `simulated` - the static fallback dataset, always available

mod traits;

pub mod coingecko;
pub mod simulated;

pub use traits::MarketDataProvider;
