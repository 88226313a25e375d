//! Signature enrollment and verification handlers
//!
//! Handles POST /enroll-signature and POST /verify-signature.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use digisign_core::{require_fields, SIGNATURE_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{parse_body, run_blocking};
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

/// Body of both signature endpoints
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignatureRequest {
    #[serde(default)]
    #[schema(example = "user-42")]
    pub user_id: Option<String>,
    /// Base64 image, optionally prefixed with `data:image/...;base64,`
    #[serde(default)]
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub signature_image: Option<String>,
    #[serde(default)]
    #[schema(example = "session-1")]
    pub session_id: Option<String>,
}

/// Response for successful enrollment
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Signature profile enrolled successfully")]
    pub message: String,
    pub user_id: String,
    pub session_id: String,
    /// Seconds since Unix epoch
    #[schema(example = 1704067200)]
    pub timestamp: i64,
}

/// Response for a completed signature check
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifySignatureResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Whether `confidence_score` is strictly above 0.7
    pub verified: bool,
    /// Placeholder confidence in [0, 1]; not a calibrated probability
    #[schema(example = 0.74)]
    pub confidence_score: f64,
    pub session_id: String,
    /// Seconds since Unix epoch
    #[schema(example = 1704067200)]
    pub timestamp: i64,
}

fn signature_fields(req: &SignatureRequest) -> Result<[String; 3], ApiError> {
    let fields = require_fields(
        SIGNATURE_FIELDS,
        [
            req.user_id.as_deref(),
            req.signature_image.as_deref(),
            req.session_id.as_deref(),
        ],
    )?;
    Ok(fields.map(str::to_owned))
}

/// Enroll a reference signature
///
/// Stores the image as the user's reference profile, replacing any earlier
/// enrollment. Any decodable image is accepted.
#[utoipa::path(
    post,
    path = "/enroll-signature",
    tag = "Signature",
    request_body = SignatureRequest,
    responses(
        (status = 200, description = "Profile enrolled", body = EnrollResponse),
        (status = 400, description = "Missing fields or undecodable image", body = ErrorResponse),
        (status = 500, description = "Internal processing error", body = ErrorResponse)
    )
)]
pub async fn enroll_signature_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let req: SignatureRequest = parse_body(payload)?;
    let [user_id, signature_image, session_id] = signature_fields(&req)?;

    let auth = state.auth.clone();
    let enrollment =
        run_blocking(move || auth.enroll_signature(&user_id, &signature_image, &session_id))
            .await?;

    Ok(Json(EnrollResponse {
        success: true,
        message: "Signature profile enrolled successfully".to_string(),
        user_id: enrollment.user_id,
        session_id: enrollment.session_id,
        timestamp: enrollment.enrolled_at.timestamp(),
    }))
}

/// Verify a signature
///
/// Scores the submitted signature against the user's enrolled profile.
/// A non-matching signature is a normal 200 response with `verified: false`.
#[utoipa::path(
    post,
    path = "/verify-signature",
    tag = "Signature",
    request_body = SignatureRequest,
    responses(
        (status = 200, description = "Signature scored", body = VerifySignatureResponse),
        (status = 400, description = "Missing fields or undecodable image", body = ErrorResponse),
        (status = 404, description = "No profile enrolled (action_required: enroll_signature)", body = ErrorResponse),
        (status = 500, description = "Internal processing error", body = ErrorResponse)
    )
)]
pub async fn verify_signature_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifySignatureResponse>, ApiError> {
    let req: SignatureRequest = parse_body(payload)?;
    let [user_id, signature_image, session_id] = signature_fields(&req)?;

    let auth = state.auth.clone();
    let verdict =
        run_blocking(move || auth.verify_signature(&user_id, &signature_image, &session_id))
            .await?;

    Ok(Json(VerifySignatureResponse {
        success: true,
        verified: verdict.verified,
        confidence_score: verdict.confidence,
        session_id: verdict.session_id,
        timestamp: verdict.checked_at.timestamp(),
    }))
}
