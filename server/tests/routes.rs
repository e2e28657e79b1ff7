//! Query surface tests driven through the router with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use shared::Store;
use tower::ServiceExt;

async fn app_with_data() -> (Router, Store) {
    let store = Store::open_in_memory().await.unwrap();
    store.initialize().await.unwrap();
    store.insert("btc_usd", 50000.0, 1000).await.unwrap();
    store.insert("btc_usd", 50500.0, 2000).await.unwrap();
    (server::router(store.clone()), store)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn prices_returns_all_rows_in_order() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/prices?ticker=btc_usd").await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["ticker"], "btc_usd");
    assert_eq!(rows[0]["price"], 50000.0);
    assert_eq!(rows[0]["timestamp"], 1000);
    assert_eq!(rows[1]["timestamp"], 2000);
}

#[tokio::test]
async fn prices_for_unknown_ticker_is_not_found() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/prices?ticker=eth_usd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn latest_price_returns_newest_row() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/latest_price?ticker=btc_usd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 50500.0);
    assert_eq!(body["timestamp"], 2000);
}

#[tokio::test]
async fn latest_price_for_unknown_ticker_is_not_found() {
    let (app, _store) = app_with_data().await;
    let (status, _body) = get(app, "/latest_price?ticker=eth_usd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filtered_prices_applies_inclusive_bounds() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/filtered_prices?ticker=btc_usd&start=1500&end=2500").await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["price"], 50500.0);
    assert_eq!(rows[0]["timestamp"], 2000);
}

#[tokio::test]
async fn filtered_prices_without_bounds_returns_everything() {
    let (app, _store) = app_with_data().await;
    let (status, body) = get(app, "/filtered_prices?ticker=btc_usd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn inverted_range_is_not_found() {
    let (app, _store) = app_with_data().await;
    let (status, _body) = get(app, "/filtered_prices?ticker=btc_usd&start=2500&end=1500").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bound_is_a_client_error_not_404() {
    let (app, _store) = app_with_data().await;
    let (status, _body) = get(app, "/filtered_prices?ticker=btc_usd&start=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_ticker_is_a_client_error() {
    let (app, _store) = app_with_data().await;
    let (status, _body) = get(app, "/prices").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_maps_to_server_error() {
    let (app, store) = app_with_data().await;
    store.close().await;
    let (status, _body) = get(app, "/prices?ticker=btc_usd").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
