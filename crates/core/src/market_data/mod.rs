//! Market feed acquisition: source selection, fallback and auto-refresh.

mod auto_refresh;
mod market_data_model;
mod market_data_service;


pub use market_data_model::{FeedBanner, MarketFeed};
pub use market_data_service::{MarketDataService, DEFAULT_FETCH_TIMEOUT};

pub use ownsphere_market_data::{
    fallback_quotes, AssetSpec, CoinGeckoProvider, MarketDataProvider, MarketQuote, MarketSource,
    PollConfiguration, SimulatedProvider, Trend, DEFAULT_BASKET,
};
