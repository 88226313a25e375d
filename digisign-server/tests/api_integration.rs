//! API integration tests for digisign-server.
//!
//! These tests drive the router with JSON requests and check the wire
//! contract of every flow: field names, status codes and error bodies.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::TimeDelta;
use digisign_core::{
    AuthError, Authenticator, DecodedImage, ManualClock, Scorer, SignatureProfile,
};
use digisign_server::{create_router, create_router_with_state, AppState, Config};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Base64 PNG of a white canvas with a dark diagonal stroke.
fn signature_png_base64() -> String {
    let img = RgbImage::from_fn(48, 24, |x, y| {
        if (x / 2).abs_diff(y) < 2 {
            Rgb([20, 20, 20])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding failed");
    BASE64.encode(buffer.into_inner())
}

/// Scorer returning a fixed confidence.
struct FixedScorer(f64);

impl Scorer for FixedScorer {
    fn score(&self, _: &DecodedImage, _: &SignatureProfile) -> Result<f64, AuthError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn app_with(auth: Authenticator, config: Config) -> Router {
    let state = AppState::new(auth, &config);
    create_router_with_state(&config, state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn enroll(app: &Router, user_id: &str) {
    let (status, _) = post_json(
        app,
        "/enroll-signature",
        json!({
            "user_id": user_id,
            "signature_image": signature_png_base64(),
            "session_id": "enroll-session",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn issue_code(app: &Router, user_id: &str, session_id: &str) -> String {
    let (status, json) = post_json(
        app,
        "/generate-otp",
        json!({ "user_id": user_id, "session_id": session_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["otp_code"].as_str().unwrap().to_string()
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = create_router();
    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "DigiSign Backend API");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_reports_store_sizes() {
    let app = create_router();
    enroll(&app, "u1").await;
    issue_code(&app, "u1", "s1").await;

    let (status, json) = send(
        &app,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["profiles"], 1);
    assert_eq!(json["pending_otps"], 1);
}

#[tokio::test]
async fn test_openapi_document_lists_flows() {
    let app = create_router();
    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    for path in [
        "/enroll-signature",
        "/verify-signature",
        "/generate-otp",
        "/verify-otp",
    ] {
        assert!(json["paths"][path].is_object(), "missing path {path}");
    }
}

// ============================================================================
// Request Validation Tests
// ============================================================================

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/enroll-signature",
        json!({ "user_id": "u1", "session_id": "s1" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Missing required fields: user_id, signature_image, session_id"
    );
    assert_eq!(json["code"], "MISSING_FIELDS");
}

#[tokio::test]
async fn test_empty_field_counts_as_missing() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "u1", "otp_code": "", "session_id": "s1" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Missing required fields: user_id, otp_code, session_id"
    );
}

#[tokio::test]
async fn test_non_json_body_rejected() {
    let app = create_router();
    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/generate-otp")
            .header("Content-Type", "text/plain")
            .body(Body::from("user_id=u1"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No JSON data provided");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = create_router();
    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/generate-otp")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_empty_object_treated_as_no_data() {
    let app = create_router();
    let (status, json) = post_json(&app, "/verify-signature", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No JSON data provided");
}

// ============================================================================
// Body Size Limit Tests
// ============================================================================

#[tokio::test]
async fn test_payload_above_two_megabytes_reaches_decoder() {
    let app = create_router();
    // Valid base64 for a run of zero bytes, which is not an image.
    let oversized = "A".repeat(3 * 1024 * 1024);

    let (status, json) = post_json(
        &app,
        "/enroll-signature",
        json!({
            "user_id": "u1",
            "signature_image": oversized,
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_IMAGE_DATA");
}

#[tokio::test]
async fn test_payload_above_configured_limit_rejected() {
    let config = Config {
        body_limit_mb: 1,
        ..Config::default()
    };
    let app = app_with(Authenticator::in_memory(), config);

    let (status, _) = post_json(
        &app,
        "/enroll-signature",
        json!({
            "user_id": "u1",
            "signature_image": "A".repeat(2 * 1024 * 1024),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// Signature Flow Tests
// ============================================================================

#[tokio::test]
async fn test_enroll_returns_identity_and_timestamp() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/enroll-signature",
        json!({
            "user_id": "u1",
            "signature_image": signature_png_base64(),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Signature profile enrolled successfully");
    assert_eq!(json["user_id"], "u1");
    assert_eq!(json["session_id"], "s1");
    assert!(json["timestamp"].is_i64());
}

#[tokio::test]
async fn test_enroll_rejects_invalid_image() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/enroll-signature",
        json!({
            "user_id": "u1",
            "signature_image": BASE64.encode(b"definitely not an image"),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_IMAGE_DATA");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid image data"));
}

#[tokio::test]
async fn test_data_url_prefix_accepted() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/enroll-signature",
        json!({
            "user_id": "u1",
            "signature_image": format!("data:image/png;base64,{}", signature_png_base64()),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn test_verify_without_profile_requires_enrollment() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/verify-signature",
        json!({
            "user_id": "stranger",
            "signature_image": signature_png_base64(),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No signature profile found for user");
    assert_eq!(json["action_required"], "enroll_signature");
}

#[tokio::test]
async fn test_verify_after_enroll_scores_in_range() {
    let app = create_router();
    enroll(&app, "u1").await;

    let (status, json) = post_json(
        &app,
        "/verify-signature",
        json!({
            "user_id": "u1",
            "signature_image": signature_png_base64(),
            "session_id": "s2",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["session_id"], "s2");
    assert!(json["timestamp"].is_i64());

    let score = json["confidence_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert_eq!(json["verified"], score > 0.7);
}

#[tokio::test]
async fn test_score_at_threshold_is_not_verified() {
    let auth = Authenticator::builder()
        .scorer(Arc::new(FixedScorer(0.7)))
        .build();
    let app = app_with(auth, Config::default());
    enroll(&app, "u1").await;

    let (status, json) = post_json(
        &app,
        "/verify-signature",
        json!({
            "user_id": "u1",
            "signature_image": signature_png_base64(),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "a failed match is not an HTTP error");
    assert_eq!(json["verified"], false);
    assert_eq!(json["confidence_score"], 0.7);
}

#[tokio::test]
async fn test_score_above_threshold_is_verified() {
    let auth = Authenticator::builder()
        .scorer(Arc::new(FixedScorer(0.95)))
        .build();
    let app = app_with(auth, Config::default());
    enroll(&app, "u1").await;

    let (_, json) = post_json(
        &app,
        "/verify-signature",
        json!({
            "user_id": "u1",
            "signature_image": signature_png_base64(),
            "session_id": "s1",
        }),
    )
    .await;

    assert_eq!(json["verified"], true);
}

// ============================================================================
// OTP Flow Tests
// ============================================================================

#[tokio::test]
async fn test_generate_otp_response_shape() {
    let app = create_router();
    let (status, json) = post_json(
        &app,
        "/generate-otp",
        json!({ "user_id": "u1", "session_id": "s1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "OTP generated successfully");
    assert_eq!(json["session_id"], "s1");
    assert_eq!(json["expires_in"], 300);
    assert!(json["timestamp"].is_i64());

    let code = json["otp_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_generate_otp_hides_code_when_not_exposed() {
    let config = Config {
        expose_otp_code: false,
        ..Config::default()
    };
    let app = app_with(Authenticator::in_memory(), config);

    let (status, json) = post_json(
        &app,
        "/generate-otp",
        json!({ "user_id": "u1", "session_id": "s1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json.get("otp_code").is_none());
}

#[tokio::test]
async fn test_otp_round_trip_succeeds_once() {
    let app = create_router();
    let code = issue_code(&app, "u1", "s1").await;
    let body = json!({ "user_id": "u1", "otp_code": code, "session_id": "s1" });

    let (status, json) = post_json(&app, "/verify-otp", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["verified"], true);
    assert_eq!(json["session_id"], "s1");
    assert!(json["timestamp"].is_i64());

    let (status, json) = post_json(&app, "/verify-otp", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid or expired OTP session");
    assert_eq!(json["code"], "OTP_SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_otp_mismatch_allows_retry() {
    let app = create_router();
    let code = issue_code(&app, "u1", "s1").await;
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let (status, json) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "u1", "otp_code": wrong, "session_id": "s1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid OTP code");

    let (status, json) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "u1", "otp_code": code, "session_id": "s1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verified"], true);
}

#[tokio::test]
async fn test_otp_expires_after_five_minutes() {
    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
    let auth = Authenticator::builder().clock(clock.clone()).build();
    let app = app_with(auth, Config::default());

    let code = issue_code(&app, "u1", "s1").await;
    clock.advance(TimeDelta::seconds(301));

    let body = json!({ "user_id": "u1", "otp_code": code, "session_id": "s1" });
    let (status, json) = post_json(&app, "/verify-otp", body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "OTP code has expired");
    assert_eq!(json["code"], "OTP_EXPIRED");

    let (_, json) = post_json(&app, "/verify-otp", body).await;
    assert_eq!(json["error"], "Invalid or expired OTP session");
}

#[tokio::test]
async fn test_regenerating_replaces_previous_code() {
    let app = create_router();
    let first = issue_code(&app, "u1", "s1").await;
    let mut second = issue_code(&app, "u1", "s1").await;
    while second == first {
        second = issue_code(&app, "u1", "s1").await;
    }

    let (status, _) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "u1", "otp_code": first, "session_id": "s1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "u1", "otp_code": second, "session_id": "s1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_verify_otp_accepts_any_claimed_user() {
    let app = create_router();
    let code = issue_code(&app, "alice", "s1").await;

    let (status, json) = post_json(
        &app,
        "/verify-otp",
        json!({ "user_id": "bob", "otp_code": code, "session_id": "s1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verified"], true);
}
