//! Market data models
//!
//! - `basket` - The fixed set of assets shown to the user (AssetSpec)
//! - `quote` - Displayable quote data (MarketQuote, Trend) and formatting helpers
//! - `source` - Source selection and persisted poll preferences

mod basket;
mod quote;
mod source;

pub use basket::{find_asset, listed_ids, AssetSpec, DEFAULT_BASKET, NATIVE_TOKEN_ID};
pub use quote::{format_change, format_usd, MarketQuote, Trend, NEUTRAL_BAND_PERCENT};
pub use source::{MarketSource, PollConfiguration, DEFAULT_POLL_INTERVAL_MS};
