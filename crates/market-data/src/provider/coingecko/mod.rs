//! CoinGecko market source.
//!
//! Fetches the whole basket with a single `/coins/markets` request. The
//! endpoint is public and rate limited, so it is treated as best effort:
//! every failure is reported as an error and the caller falls back to the
//! simulated dataset.
//!
//! API documentation: https://docs.coingecko.com/reference/coins-markets

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{listed_ids, AssetSpec, MarketQuote};
use crate::provider::simulated::fallback_quotes;
use crate::provider::MarketDataProvider;

/// Public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const PROVIDER_ID: &str = "COINGECKO";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the `/coins/markets` response.
#[derive(Debug, Deserialize)]
struct CoinMarket {
    id: String,
    #[allow(dead_code)]
    name: Option<String>,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    last_updated: Option<DateTime<Utc>>,
}

/// Remote quote source backed by the CoinGecko markets endpoint.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Create a provider against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, REQUEST_TIMEOUT)
    }

    /// Create a provider against a custom endpoint (mirrors, proxies, tests).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn to_decimal(value: f64, field: &str) -> Result<Decimal, MarketDataError> {
        Decimal::try_from(value).map_err(|_| MarketDataError::InvalidPayload {
            provider: PROVIDER_ID.to_string(),
            message: format!("{} is not a finite number: {}", field, value),
        })
    }

    /// Map the raw response onto the basket, keeping basket order.
    ///
    /// Unlisted assets are not quoted by CoinGecko; they keep their fallback
    /// value, stamped with `fetched_at`.
    fn to_quotes(
        basket: &[AssetSpec],
        markets: Vec<CoinMarket>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<MarketQuote>, MarketDataError> {
        let fallback = fallback_quotes(basket, fetched_at);
        let mut quotes = Vec::with_capacity(basket.len());
        let mut live = 0usize;

        for asset in basket {
            if !asset.listed {
                if let Some(quote) = fallback.iter().find(|q| q.asset_id == asset.id) {
                    quotes.push(quote.clone());
                }
                continue;
            }
            let Some(market) = markets.iter().find(|m| m.id == asset.id) else {
                debug!("[CoinGecko] '{}' missing from response", asset.id);
                continue;
            };
            let Some(price) = market.current_price else {
                warn!("[CoinGecko] '{}' returned without a price", asset.id);
                continue;
            };

            let price = Self::to_decimal(price, "current_price")?.round_dp(2);
            let change = match market.price_change_percentage_24h {
                Some(value) => Self::to_decimal(value, "price_change_percentage_24h")?.round_dp(2),
                None => Decimal::ZERO,
            };
            let observed_at = market.last_updated.unwrap_or(fetched_at);

            quotes.push(MarketQuote::new(asset, price, change, observed_at));
            live += 1;
        }

        if live == 0 {
            return Err(MarketDataError::EmptyBasket {
                provider: PROVIDER_ID.to_string(),
            });
        }
        Ok(quotes)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_basket(
        &self,
        basket: &[AssetSpec],
    ) -> Result<Vec<MarketQuote>, MarketDataError> {
        let ids = listed_ids(basket);
        if ids.is_empty() {
            return Err(MarketDataError::EmptyBasket {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}/coins/markets", self.base_url);
        let ids_param = ids.join(",");
        debug!("[CoinGecko] GET {} ids={}", url, ids_param);

        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", "usd"), ("ids", ids_param.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;
        let markets: Vec<CoinMarket> =
            serde_json::from_str(&body).map_err(|e| MarketDataError::InvalidPayload {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        Self::to_quotes(basket, markets, Utc::now())
    }
}
