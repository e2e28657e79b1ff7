use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{Observation, Store, StoreError};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Read-only query surface over the store. Malformed query parameters are
/// rejected by the typed extractors with a 400 before the store is touched.
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prices", get(all_prices))
        .route("/latest_price", get(latest_price))
        .route("/filtered_prices", get(filtered_prices))
        .with_state(AppState { store })
}

#[derive(Deserialize)]
pub struct TickerQuery {
    ticker: String,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    ticker: String,
    start: Option<i64>,
    end: Option<i64>,
}

pub enum ApiError {
    /// No rows matched the query. Distinct from a store failure.
    NotFound,
    Storage(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "No data found for the specified ticker" })),
            )
                .into_response(),
            ApiError::Storage(err) => {
                error!("Store error while serving query: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Storage unavailable" })),
                )
                    .into_response()
            }
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn all_prices(
    State(state): State<AppState>,
    Query(query): Query<TickerQuery>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    let prices = state.store.all_for_instrument(&query.ticker).await?;
    if prices.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(prices))
}

async fn latest_price(
    State(state): State<AppState>,
    Query(query): Query<TickerQuery>,
) -> Result<Json<Observation>, ApiError> {
    let price = state.store.latest_for_instrument(&query.ticker).await?;
    match price {
        Some(price) => Ok(Json(price)),
        None => Err(ApiError::NotFound),
    }
}

async fn filtered_prices(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    let prices = state
        .store
        .range_for_instrument(&query.ticker, query.start, query.end)
        .await?;
    if prices.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(prices))
}
