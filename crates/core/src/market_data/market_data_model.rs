use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ownsphere_market_data::{MarketDataError, MarketQuote, MarketSource};

use crate::errors::ErrorKind;

/// Non-blocking notice shown above the feed after a failed remote fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedBanner {
    pub kind: ErrorKind,
    pub provider: String,
    pub message: String,
}

impl FeedBanner {
    pub fn source_unavailable(error: &MarketDataError) -> Self {
        Self {
            kind: ErrorKind::SourceUnavailable,
            provider: error.provider().unwrap_or("unknown").to_string(),
            message: error.to_string(),
        }
    }
}

/// Snapshot of the feed. Replaced as a whole on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFeed {
    pub quotes: Vec<MarketQuote>,
    pub source: MarketSource,
    pub fetched_at: DateTime<Utc>,
    pub banner: Option<FeedBanner>,
}

impl MarketFeed {
    pub fn is_fallback(&self) -> bool {
        self.banner.is_some()
    }
}
