//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AssetSpec, MarketQuote};

/// Trait for quote sources.
///
/// A provider fetches the whole basket in one call. The registry of sources
/// lives in the core crate, which decides when to fall back.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ownsphere_market_data::provider::MarketDataProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn fetch_basket(&self, basket: &[AssetSpec]) -> Result<Vec<MarketQuote>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and error banners.
    fn id(&self) -> &'static str;

    /// Fetch the latest quotes for the basket.
    ///
    /// Implementations may return fewer quotes than requested (unlisted assets),
    /// but must return an error rather than an empty list.
    async fn fetch_basket(&self, basket: &[AssetSpec])
        -> Result<Vec<MarketQuote>, MarketDataError>;
}
