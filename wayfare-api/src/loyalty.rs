use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use wayfare_loyalty::{Tier, UserLoyalty};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoyaltyQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/loyalty", get(get_loyalty).post(redeem_points))
        .route("/api/loyalty/tiers", get(list_tiers))
}

fn require_user(query: LoyaltyQuery) -> Result<String, AppError> {
    query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("Missing userId query parameter".to_string()))
}

fn invalid_points() -> AppError {
    AppError::ValidationError("Invalid pointsToRedeem in request body".to_string())
}

/// Whole-number `pointsToRedeem` from a JSON object body. Integral floats
/// such as `200.0` are accepted; sign is checked by the engine.
fn parse_points(body: &Value) -> Result<i64, AppError> {
    let Some(Value::Number(number)) = body.as_object().and_then(|obj| obj.get("pointsToRedeem")) else {
        return Err(invalid_points());
    };

    if let Some(points) = number.as_i64() {
        return Ok(points);
    }

    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(invalid_points()),
    }
}

/// GET /api/loyalty?userId=..
async fn get_loyalty(
    State(state): State<AppState>,
    Query(query): Query<LoyaltyQuery>,
) -> Result<Json<UserLoyalty>, AppError> {
    let user_id = require_user(query)?;
    let mut loyalty = state.loyalty.lock().await;

    Ok(Json(loyalty.get_loyalty(&user_id)))
}

/// POST /api/loyalty?userId=..
async fn redeem_points(
    State(state): State<AppState>,
    Query(query): Query<LoyaltyQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserLoyalty>, AppError> {
    let user_id = require_user(query)?;
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("Rejected redemption body: {}", rejection.body_text());
        invalid_points()
    })?;
    let points = parse_points(&body)?;

    let mut loyalty = state.loyalty.lock().await;
    let updated = loyalty.redeem(&user_id, points)?;

    Ok(Json(updated))
}

/// GET /api/loyalty/tiers
async fn list_tiers(State(state): State<AppState>) -> Json<Vec<Tier>> {
    let loyalty = state.loyalty.lock().await;
    Json(loyalty.tiers().tiers().to_vec())
}
