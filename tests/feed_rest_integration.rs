//! Integration tests for the REST feed adapter and context assembly
//!
//! The market-data service is stood in for by a local wiremock server.

mod common;

use llm_decision_core::context::{AssemblerSettings, ContextAssembler};
use llm_decision_core::{
    AccountSnapshot, CandidateEntry, CandidateSource, ClientError, CycleInput, FeedRestClient,
    LeverageCeilings, MarketDataProvider, OpenInterestRankingSource,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot_body(symbol: &str, price: f64, oi: f64) -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "symbol": symbol,
            "current_price": price,
            "price_change_1h": 0.42,
            "price_change_4h": -1.3,
            "macd": 0.0012,
            "rsi7": 61.5,
            "open_interest": {"latest": oi, "average": oi},
            "funding_rate": 0.0001
        }
    })
}

async fn mount_snapshot(server: &MockServer, symbol: &str, price: f64, oi: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/market/{}", symbol)))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body(symbol, price, oi)))
        .mount(server)
        .await;
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_snapshot() {
    let server = MockServer::start().await;
    mount_snapshot(&server, "BTCUSDT", 97000.5, 80000.0).await;

    let client = FeedRestClient::new(&server.uri()).unwrap();
    let snapshot = tokio_test::assert_ok!(client.fetch_snapshot("BTCUSDT").await);

    assert_eq!(snapshot.symbol, "BTCUSDT");
    assert_eq!(snapshot.current_price, dec!(97000.5));
    assert_eq!(snapshot.open_interest.unwrap().latest, dec!(80000));
}

#[tokio::test]
async fn test_unknown_symbol_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/market/NOPEUSDT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = FeedRestClient::new(&server.uri()).unwrap();
    let err = client.fetch_snapshot("NOPEUSDT").await.unwrap_err();
    assert!(matches!(err, ClientError::SymbolNotFound(s) if s == "NOPEUSDT"));
}

#[tokio::test]
async fn test_unsuccessful_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oi/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "upstream unavailable",
            "data": null
        })))
        .mount(&server)
        .await;

    let client = FeedRestClient::new(&server.uri()).unwrap();
    let err = client.fetch_rankings().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(msg) if msg == "upstream unavailable"));
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oi/top"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let client = FeedRestClient::new(&server.uri()).unwrap();
    match client.fetch_rankings().await.unwrap_err() {
        ClientError::InvalidResponse(msg) => assert!(msg.contains("503")),
        other => panic!("expected invalid response, got {:?}", other),
    }
}

// ============================================================================
// Assembly Tests
// ============================================================================

#[test_log::test(tokio::test)]
async fn test_assemble_from_rest_feed() {
    let server = MockServer::start().await;
    // 1,000,000 x 20 = 20M: kept
    mount_snapshot(&server, "SOLUSDT", 20.0, 1_000_000.0).await;
    // 100,000 x 0.1 = 0.01M: below the floor
    mount_snapshot(&server, "TINYUSDT", 0.1, 100_000.0).await;
    Mock::given(method("GET"))
        .and(path("/market/GONEUSDT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oi/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "positions": [{
                    "symbol": "SOLUSDT", "rank": 2, "current_oi": 1000000,
                    "oi_delta": 90000, "oi_delta_percent": 9.9,
                    "oi_delta_value": 1800000, "price_delta_percent": 1.1
                }]
            }
        })))
        .mount(&server)
        .await;

    let client = FeedRestClient::new(&server.uri()).unwrap();
    let assembler = ContextAssembler::new(client.clone(), client, AssemblerSettings::default());

    let input = CycleInput {
        current_time: chrono::Utc::now(),
        call_count: 3,
        runtime_minutes: 9,
        account: AccountSnapshot {
            total_equity: dec!(5000),
            available_balance: dec!(5000),
            ..AccountSnapshot::default()
        },
        positions: vec![],
        candidates: ["SOLUSDT", "TINYUSDT", "GONEUSDT"]
            .iter()
            .map(|s| CandidateEntry::new(*s, vec![CandidateSource::Ranking]))
            .collect(),
        leverage: LeverageCeilings::default(),
    };

    let ctx = assembler.assemble(input).await;

    let mut symbols: Vec<_> = ctx.snapshots.keys().cloned().collect();
    symbols.sort();
    assert_eq!(symbols, vec!["SOLUSDT"]);
    assert_eq!(ctx.oi_rankings["SOLUSDT"].rank, 2);
    assert_eq!(ctx.candidates.len(), 3);

    let limits = ctx.validation_limits(&common::RISK);
    assert_eq!(limits.account_equity, dec!(5000));
}
