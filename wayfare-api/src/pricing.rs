use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use wayfare_catalog::ProductType;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub id: Option<String>,
    pub freeze: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FreezeResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/flights", get(flight_price))
        .route("/api/pricing/hotels", get(hotel_price))
}

/// GET /api/pricing/flights?id=..[&freeze=true]
async fn flight_price(State(state): State<AppState>, Query(query): Query<PriceQuery>) -> Result<Response, AppError> {
    price_or_freeze(state, ProductType::Flight, query).await
}

/// GET /api/pricing/hotels?id=..[&freeze=true]
async fn hotel_price(State(state): State<AppState>, Query(query): Query<PriceQuery>) -> Result<Response, AppError> {
    price_or_freeze(state, ProductType::Hotel, query).await
}

async fn price_or_freeze(state: AppState, product_type: ProductType, query: PriceQuery) -> Result<Response, AppError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AppError::ValidationError(format!("Invalid or missing {} id", product_type.to_string().to_lowercase()))
        })?;

    let mut pricing = state.pricing.lock().await;

    // A freeze request never computes a price in the same call
    if query.freeze.as_deref() == Some("true") {
        let receipt = pricing.freeze_price(product_type, &id)?;
        return Ok(Json(FreezeResponse { message: receipt.message }).into_response());
    }

    let quote = pricing.get_price(product_type, &id)?;
    Ok(Json(quote).into_response())
}
