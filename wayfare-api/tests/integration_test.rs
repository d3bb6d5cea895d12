use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use wayfare_api::{app, AppState};
use wayfare_store::Config;

fn test_app() -> Router {
    let state = AppState::from_config(&Config::default()).expect("seeded state");
    app(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn redeem(app: &Router, user: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(format!("/api/loyalty?userId={}", user))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "wayfare-api");
}

#[tokio::test]
async fn test_flight_price_is_computed_and_recorded() {
    let app = test_app();

    let (status, body) = get(&app, "/api/pricing/flights?id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
    assert_eq!(body["currentPrice"], 702);
    assert_eq!(body["priceHistory"].as_array().unwrap().len(), 5);
    assert!(body.get("priceFreezeUntil").is_none());

    let (_, body) = get(&app, "/api/pricing/flights?id=1").await;
    assert_eq!(body["priceHistory"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_freeze_returns_last_price() {
    let app = test_app();

    let (status, body) = get(&app, "/api/pricing/flights?id=2&freeze=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Price frozen for 24 hours");

    for _ in 0..3 {
        let (status, body) = get(&app, "/api/pricing/flights?id=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentPrice"], 220);
        assert_eq!(body["priceHistory"].as_array().unwrap().len(), 4);
        assert!(body["priceFreezeUntil"].is_i64());
    }

    // The freeze is per product type
    let (_, body) = get(&app, "/api/pricing/hotels?id=2").await;
    assert_eq!(body["currentPrice"], 468);
}

#[tokio::test]
async fn test_pricing_errors() {
    let app = test_app();

    let (status, body) = get(&app, "/api/pricing/hotels?id=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Hotel not found: 99");

    let (status, _) = get(&app, "/api/pricing/hotels?id=99&freeze=true").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/pricing/flights").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid or missing flight id");
}

#[tokio::test]
async fn test_loyalty_derived_from_bookings() {
    let app = test_app();

    let (status, body) = get(&app, "/api/loyalty?userId=user1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "user1");
    assert_eq!(body["pointsBalance"], 700);
    assert_eq!(body["currentTier"], "Gold");
    assert_eq!(body["tierProgress"], 40.0);
    assert_eq!(body["pointsExpiryReminder"], "");

    // The seven-month-old booking has expired and is not listed
    let history = body["pointsHistory"].as_array().unwrap();
    let ids: Vec<&str> = history.iter().map(|e| e["bookingId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["b1", "b3"]);

    let (status, _) = get(&app, "/api/loyalty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redeem_points() {
    let app = test_app();

    let (status, body) = redeem(&app, "user1", json!({ "pointsToRedeem": 450 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pointsBalance"], 250);
    assert_eq!(body["currentTier"], "Silver");
    assert_eq!(body["pointsHistory"][0]["redeemed"], true);
    assert_eq!(body["pointsHistory"][1]["redeemed"], false);
    assert_eq!(body["pointsHistory"][1]["points"], 250);

    // Redemption persists in the cached account
    let (_, body) = get(&app, "/api/loyalty?userId=user1").await;
    assert_eq!(body["pointsBalance"], 250);
}

#[tokio::test]
async fn test_rejected_redemption_changes_nothing() {
    let app = test_app();
    let (_, before) = get(&app, "/api/loyalty?userId=user1").await;

    let (status, body) = redeem(&app, "user1", json!({ "pointsToRedeem": 701 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient points balance: requested 701, available 700");

    for bad in [json!({ "pointsToRedeem": 0 }), json!({ "pointsToRedeem": -5 }), json!({ "pointsToRedeem": 2.5 }), json!({ "pointsToRedeem": "100" }), json!({})] {
        let (status, _) = redeem(&app, "user1", bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, after) = get(&app, "/api/loyalty?userId=user1").await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_pricing_id_matches_exactly() {
    let app = test_app();

    let (status, body) = get(&app, "/api/pricing/flights?id=1%20").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Flight not found: 1 ");

    let (status, _) = get(&app, "/api/pricing/hotels?id=%201&freeze=true").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redeem_requires_object_body() {
    let app = test_app();

    for bad in [json!([100]), json!(100), Value::Null, json!([{ "pointsToRedeem": 100 }])] {
        let (status, body) = redeem(&app, "user1", bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid pointsToRedeem in request body");
    }

    let (_, body) = get(&app, "/api/loyalty?userId=user1").await;
    assert_eq!(body["pointsBalance"], 700);
}

#[tokio::test]
async fn test_malformed_redemption_is_json_400() {
    let app = test_app();

    // No content type
    let req = Request::post("/api/loyalty?userId=user1")
        .body(Body::from(r#"{"pointsToRedeem":100}"#))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid pointsToRedeem in request body");

    // Syntactically broken JSON
    let req = Request::post("/api/loyalty?userId=user1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{pointsToRedeem"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid pointsToRedeem in request body");

    // The user is checked before the body
    let req = Request::post("/api/loyalty").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing userId query parameter");

    let (_, body) = get(&app, "/api/loyalty?userId=user1").await;
    assert_eq!(body["pointsBalance"], 700);
}

#[tokio::test]
async fn test_tiers() {
    let app = test_app();
    let (status, body) = get(&app, "/api/loyalty/tiers").await;

    assert_eq!(status, StatusCode::OK);
    let tiers = body.as_array().unwrap();
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[1]["level"], "Gold");
    assert_eq!(tiers[1]["threshold"], 500);
    assert_eq!(tiers[2]["benefits"][2], "Free upgrades");
}
