//! Integration tests for the Binance spot price client
//!
//! Runs against a local wiremock server standing in for `/api/v3`.

use ladder_hedge::common::traits::SpotPriceSource;
use ladder_hedge::{Asset, BinanceRestClient, ClientError};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> BinanceRestClient {
    BinanceRestClient::new(&format!("{}/api/v3", server.uri())).expect("Failed to create client")
}

#[tokio::test]
async fn test_get_asset_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .and(query_param("symbol", "ETHUSDT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"symbol": "ETHUSDT", "price": "4012.55000000"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let price = client.get_asset_price(Asset::Eth).await.unwrap();

    assert_eq!(price, dec!(4012.55));
}

#[tokio::test]
async fn test_spot_price_source_uses_asset_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .and(query_param("symbol", "SOLUSDT"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"symbol": "SOLUSDT", "price": "187.1"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.venue_name(), "binance");
    assert_eq!(client.spot_price(Asset::Sol).await.unwrap(), dec!(187.1));
}

#[tokio::test]
async fn test_error_status_carries_exchange_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_ticker_price("NOPEUSDT").await.unwrap_err();

    match err {
        ClientError::InvalidResponse(msg) => {
            assert!(msg.contains("400"), "{}", msg);
            assert!(msg.contains("Invalid symbol."), "{}", msg);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_price_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"symbol": "BTCUSDT", "price": "n/a"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.get_asset_price(Asset::Btc).await;
    assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_zero_price_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"symbol": "XRPUSDT", "price": "0.00000000"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client.get_asset_price(Asset::Xrp).await;
    assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
}
