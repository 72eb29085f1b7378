//! HTTP-level tests for the CoinGecko source against a mock server.

use std::time::Duration;

use ownsphere_market_data::{
    CoinGeckoProvider, MarketDataError, MarketDataProvider, Trend, DEFAULT_BASKET,
};
use rust_decimal_macros::dec;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> CoinGeckoProvider {
    CoinGeckoProvider::with_base_url(&server.uri(), Duration::from_millis(500))
}

#[tokio::test]
async fn fetches_listed_basket_in_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("ids", "bitcoin,ethereum,internet-computer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "bitcoin",
                "name": "Bitcoin",
                "current_price": 42150.0,
                "price_change_percentage_24h": -1.8,
                "last_updated": "2024-05-01T12:00:00.000Z"
            },
            {
                "id": "ethereum",
                "name": "Ethereum",
                "current_price": 3250.75,
                "price_change_percentage_24h": 2.3,
                "last_updated": "2024-05-01T12:00:00.000Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let quotes = provider_for(&server)
        .fetch_basket(DEFAULT_BASKET)
        .await
        .unwrap();

    assert_eq!(quotes.len(), 3);
    assert_eq!(quotes[0].asset_name, "OwnSphere Token");
    assert_eq!(quotes[0].price_display, "$2.45");
    assert_eq!(quotes[1].asset_name, "Bitcoin");
    assert_eq!(quotes[1].price, dec!(42150));
    assert_eq!(quotes[1].price_display, "$42,150.00");
    assert_eq!(quotes[1].trend, Trend::Down);
    assert_eq!(quotes[2].change_display(), "+2.3%");
    assert_eq!(
        quotes[1].observed_at.to_rfc3339(),
        "2024-05-01T12:00:00+00:00"
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = provider_for(&server).fetch_basket(DEFAULT_BASKET).await;
    assert!(matches!(
        result,
        Err(MarketDataError::HttpStatus { status: 429, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = provider_for(&server).fetch_basket(DEFAULT_BASKET).await;
    assert!(matches!(result, Err(MarketDataError::InvalidPayload { .. })));
}

#[tokio::test]
async fn empty_list_is_an_error_not_an_empty_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let result = provider_for(&server).fetch_basket(DEFAULT_BASKET).await;
    assert!(matches!(result, Err(MarketDataError::EmptyBasket { .. })));
}

#[tokio::test]
async fn slow_source_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = provider_for(&server).fetch_basket(DEFAULT_BASKET).await;
    assert!(matches!(result, Err(MarketDataError::Timeout { .. })));
}

#[tokio::test]
async fn unreachable_source_is_transport_error() {
    // Nothing listens on this port once the server is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let provider = CoinGeckoProvider::with_base_url(&uri, Duration::from_millis(500));

    let result = provider.fetch_basket(DEFAULT_BASKET).await;
    assert!(matches!(
        result,
        Err(MarketDataError::Transport { .. }) | Err(MarketDataError::Timeout { .. })
    ));
}
