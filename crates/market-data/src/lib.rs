//! OwnSphere Market Data Crate
//!
//! This crate provides the quote sources used by the investment view.
//!
//! # Overview
//!
//! - A fixed basket of assets ([`DEFAULT_BASKET`])
//! - A remote HTTP source ([`CoinGeckoProvider`])
//! - A simulated source serving the static fallback dataset ([`SimulatedProvider`])
//!
//! Source selection, fallback and auto-refresh live in the core crate's
//! market data service; this crate only knows how to fetch and format.
//!
//! # Core Types
//!
//! - [`MarketQuote`] - One asset's displayed price and trend
//! - [`Trend`] - Up, Down or Neutral, derived from the signed change
//! - [`MarketSource`] - Remote or Simulated
//! - [`PollConfiguration`] - Persisted auto-refresh preferences

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;

pub use models::{
    find_asset, format_change, format_usd, listed_ids, AssetSpec, MarketQuote, MarketSource,
    PollConfiguration, Trend, DEFAULT_BASKET, DEFAULT_POLL_INTERVAL_MS, NATIVE_TOKEN_ID,
    NEUTRAL_BAND_PERCENT,
};

pub use provider::coingecko::CoinGeckoProvider;
pub use provider::simulated::{fallback_quotes, SimulatedProvider};
pub use provider::MarketDataProvider;
