use axum::body::{to_bytes, Body};
use axum::http::Request;
use blackfang_core::auth::{DEMO_EMAIL, DEMO_PASSWORD};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;

fn state() -> AppState {
    AppState::new(
        Dataset::demo(),
        Credentials::demo(),
        Duration::from_secs(3600),
    )
}

fn app(state: &AppState) -> Router {
    build_app(state.clone(), default_rate_limit_state())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

async fn login(state: &AppState) -> (String, String) {
    let (status, json) = send(
        app(state),
        post_json(
            "/api/auth/login",
            None,
            &json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tokens = &json["data"]["tokens"];
    (
        tokens["access_token"].as_str().expect("access").to_owned(),
        tokens["refresh_token"].as_str().expect("refresh").to_owned(),
    )
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_is_public_and_echoes_request_id() {
    let state = state();
    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["competitors"], 3);
    assert_eq!(json["meta"]["request_id"], "req-42");
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let state = state();
    let (status, json) = send(
        app(&state),
        Request::builder()
            .uri("/api/dashboard")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let (status, _) = send(app(&state), authed("GET", "/api/dashboard", "bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password_without_echo() {
    let state = state();
    let (status, json) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            &json!({ "email": DEMO_EMAIL, "password": "letmein" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");
    assert!(!json.to_string().contains("letmein"));
}

#[tokio::test]
async fn dashboard_returns_statistics_and_roster() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, json) = send(app(&state), authed("GET", "/api/dashboard", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["statistics"]["competitors"], 3);
    assert_eq!(data["statistics"]["alerts"], 6);
    assert_eq!(data["statistics"]["unread_alerts"], 2);
    assert_eq!(data["competitors"].as_array().map(Vec::len), Some(3));
    assert_eq!(data["user"]["email"], DEMO_EMAIL);
}

#[tokio::test]
async fn me_returns_demo_user() {
    let state = state();
    let (token, _) = login(&state).await;
    let (status, json) = send(app(&state), authed("GET", "/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["company_name"], "Demo Motors Pvt Ltd");
}

#[tokio::test]
async fn alerts_filter_by_severity_case_insensitively() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, json) = send(
        app(&state),
        authed("GET", "/api/alerts?severity=medium", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 3);
    assert!(json["data"]["alerts"]
        .as_array()
        .expect("alerts")
        .iter()
        .all(|a| a["severity"] == "MEDIUM"));

    let (_, all) = send(app(&state), authed("GET", "/api/alerts?severity=all", &token)).await;
    assert_eq!(all["data"]["total"], 6);
}

#[tokio::test]
async fn alerts_offset_past_the_end_returns_empty_page() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, json) = send(
        app(&state),
        authed(
            "GET",
            &format!("/api/alerts?offset={}", usize::MAX),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 6);
    assert_eq!(json["data"]["has_more"], false);
    assert_eq!(json["data"]["alerts"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn mark_read_and_mark_all_update_unread_count() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, json) = send(app(&state), authed("POST", "/api/alerts/1/read", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["is_read"], true);
    assert_eq!(state.backend.read().await.dataset.unread_count(), 1);

    let (status, json) = send(app(&state), authed("POST", "/api/alerts/read-all", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["updated"], 1);
    assert_eq!(state.backend.read().await.dataset.unread_count(), 0);

    let (status, json) = send(app(&state), authed("POST", "/api/alerts/999/read", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn archived_alert_leaves_the_feed() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, _) = send(app(&state), authed("POST", "/api/alerts/2/archive", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(app(&state), authed("GET", "/api/alerts", &token)).await;
    assert_eq!(json["data"]["total"], 5);
    let (status, _) = send(app(&state), authed("POST", "/api/alerts/2/read", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn competitor_crud_round() {
    let state = state();
    let (token, _) = login(&state).await;

    let (status, json) = send(
        app(&state),
        post_json(
            "/api/competitors",
            Some(&token),
            &json!({ "name": "Rapid Wheels", "website": "rapidwheels.in", "location": "Pune" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], 4);
    assert_eq!(json["data"]["website"], "https://rapidwheels.in");
    assert_eq!(json["data"]["threat_level"], "MEDIUM");

    let patch = Request::builder()
        .method("PATCH")
        .uri("/api/competitors/4")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "threat_level": "HIGH", "monitoring_status": "paused" }).to_string(),
        ))
        .expect("request");
    let (status, json) = send(app(&state), patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["threat_level"], "HIGH");
    assert_eq!(json["data"]["monitoring_status"], "paused");

    let (status, _) = send(app(&state), authed("DELETE", "/api/competitors/4", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(app(&state), authed("GET", "/api/competitors/4", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn create_competitor_rejects_blank_name() {
    let state = state();
    let (token, _) = login(&state).await;
    let (status, json) = send(
        app(&state),
        post_json(
            "/api/competitors",
            Some(&token),
            &json!({ "name": "  ", "website": "example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn refresh_rotates_and_logout_revokes() {
    let state = state();
    let (access, refresh) = login(&state).await;

    let (status, json) = send(
        app(&state),
        post_json("/api/auth/refresh", None, &json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = json["data"]["access_token"].as_str().expect("access").to_owned();

    let (status, _) = send(app(&state), authed("GET", "/api/auth/me", &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "old token retired");

    let (status, json) = send(app(&state), authed("POST", "/api/auth/logout", &new_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["revoked"], true);

    let (status, _) = send(app(&state), authed("GET", "/api/auth/me", &new_access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_applies_to_protected_routes() {
    let state = state();
    let (token, _) = login(&state).await;
    let router = build_app(
        state.clone(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (first, _) = send(router.clone(), authed("GET", "/api/auth/me", &token)).await;
    assert_eq!(first, StatusCode::OK);
    let (second, json) = send(router, authed("GET", "/api/auth/me", &token)).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}
