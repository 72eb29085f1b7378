//! Simulated market source.
//!
//! Serves the static fallback dataset with a fresh timestamp. Used both as a
//! user-selectable source and as the substitute whenever the remote source
//! fails, so the feed is never empty.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{find_asset, AssetSpec, MarketQuote};
use crate::provider::MarketDataProvider;

const PROVIDER_ID: &str = "SIMULATED";

/// (asset id, price in cents, change in tenths of a percent)
const FALLBACK_VALUES: &[(&str, i64, i64)] = &[
    ("ownsphere-token", 245, 52),
    ("bitcoin", 4_215_000, -18),
    ("ethereum", 325_075, 23),
    ("internet-computer", 895, 5),
];

/// The fallback dataset, stamped with `observed_at`.
///
/// Always returns one quote per basket asset that has a fallback value, in
/// basket order. The full default basket always yields four quotes.
pub fn fallback_quotes(basket: &[AssetSpec], observed_at: DateTime<Utc>) -> Vec<MarketQuote> {
    let quotes: Vec<MarketQuote> = basket
        .iter()
        .filter_map(|asset| {
            FALLBACK_VALUES
                .iter()
                .find(|(id, _, _)| *id == asset.id)
                .map(|(_, cents, tenths)| {
                    MarketQuote::new(
                        asset,
                        Decimal::new(*cents, 2),
                        Decimal::new(*tenths, 1),
                        observed_at,
                    )
                })
        })
        .collect();

    if quotes.is_empty() {
        // A basket with no known assets still gets the default set.
        return default_fallback(observed_at);
    }
    quotes
}

fn default_fallback(observed_at: DateTime<Utc>) -> Vec<MarketQuote> {
    FALLBACK_VALUES
        .iter()
        .filter_map(|(id, cents, tenths)| {
            find_asset(id).map(|asset| {
                MarketQuote::new(
                    asset,
                    Decimal::new(*cents, 2),
                    Decimal::new(*tenths, 1),
                    observed_at,
                )
            })
        })
        .collect()
}

/// Provider that serves the fallback dataset.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProvider;

impl SimulatedProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MarketDataProvider for SimulatedProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_basket(
        &self,
        basket: &[AssetSpec],
    ) -> Result<Vec<MarketQuote>, MarketDataError> {
        Ok(fallback_quotes(basket, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trend, DEFAULT_BASKET};
    use rust_decimal_macros::dec;

    #[test]
    fn test_fallback_matches_reference_values() {
        let now = Utc::now();
        let quotes = fallback_quotes(DEFAULT_BASKET, now);
        assert_eq!(quotes.len(), 4);

        let display: Vec<(&str, &str, String)> = quotes
            .iter()
            .map(|q| (q.asset_name.as_str(), q.price_display.as_str(), q.change_display()))
            .collect();
        assert_eq!(
            display,
            vec![
                ("OwnSphere Token", "$2.45", "+5.2%".to_string()),
                ("Bitcoin", "$42,150.00", "-1.8%".to_string()),
                ("Ethereum", "$3,250.75", "+2.3%".to_string()),
                ("Internet Computer", "$8.95", "+0.5%".to_string()),
            ]
        );
        assert_eq!(quotes[3].trend, Trend::Neutral);
        assert!(quotes.iter().all(|q| q.observed_at == now));
    }

    #[test]
    fn test_fallback_never_empty() {
        let unknown = [AssetSpec {
            id: "unknown",
            name: "Unknown",
            icon: "fa-question",
            listed: true,
        }];
        assert_eq!(fallback_quotes(&unknown, Utc::now()).len(), 4);
        assert_eq!(fallback_quotes(&[], Utc::now()).len(), 4);
    }

    #[tokio::test]
    async fn test_simulated_provider_stamps_fresh_time() {
        let before = Utc::now();
        let quotes = SimulatedProvider::new()
            .fetch_basket(DEFAULT_BASKET)
            .await
            .unwrap();
        assert!(quotes.iter().all(|q| q.observed_at >= before));
        assert_eq!(quotes[1].price, dec!(42150.00));
    }
}
