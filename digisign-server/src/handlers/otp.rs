//! One-time passcode handlers
//!
//! Handles POST /generate-otp and POST /verify-otp.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use digisign_core::{require_fields, GENERATE_OTP_FIELDS, VERIFY_OTP_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::parse_body;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateOtpRequest {
    #[serde(default)]
    #[schema(example = "user-42")]
    pub user_id: Option<String>,
    #[serde(default)]
    #[schema(example = "session-1")]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    #[schema(example = "user-42")]
    pub user_id: Option<String>,
    #[serde(default)]
    #[schema(example = "482913")]
    pub otp_code: Option<String>,
    #[serde(default)]
    #[schema(example = "session-1")]
    pub session_id: Option<String>,
}

/// Response for a newly issued code
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateOtpResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "OTP generated successfully")]
    pub message: String,
    /// The issued code. Only present when the server runs with
    /// `EXPOSE_OTP_CODE=true`; never enable this outside a demo.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "482913")]
    pub otp_code: Option<String>,
    pub session_id: String,
    /// Seconds until the code expires
    #[schema(example = 300)]
    pub expires_in: u64,
    /// Seconds since Unix epoch
    #[schema(example = 1704067200)]
    pub timestamp: i64,
}

/// Response for a consumed code
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = true)]
    pub verified: bool,
    pub session_id: String,
    /// Seconds since Unix epoch
    #[schema(example = 1704067200)]
    pub timestamp: i64,
}

/// Issue a one-time passcode
///
/// Issues a fresh six-digit code for the session, replacing any live one.
/// The code is valid for 300 seconds.
#[utoipa::path(
    post,
    path = "/generate-otp",
    tag = "OTP",
    request_body = GenerateOtpRequest,
    responses(
        (status = 200, description = "Code issued", body = GenerateOtpResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse)
    )
)]
pub async fn generate_otp_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateOtpResponse>, ApiError> {
    let req: GenerateOtpRequest = parse_body(payload)?;
    let [user_id, session_id] = require_fields(
        GENERATE_OTP_FIELDS,
        [req.user_id.as_deref(), req.session_id.as_deref()],
    )?;

    let issued = state.auth.generate_otp(user_id, session_id);

    Ok(Json(GenerateOtpResponse {
        success: true,
        message: "OTP generated successfully".to_string(),
        otp_code: state.expose_otp_code.then_some(issued.code),
        session_id: issued.session_id,
        expires_in: issued.expires_in,
        timestamp: issued.issued_at.timestamp(),
    }))
}

/// Verify a one-time passcode
///
/// Consumes the session's code on a match. A wrong code can be retried until
/// the code expires; an expired code is discarded.
#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "OTP",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerifyOtpResponse),
        (status = 400, description = "Missing fields, unknown session, expired or wrong code", body = ErrorResponse)
    )
)]
pub async fn verify_otp_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let req: VerifyOtpRequest = parse_body(payload)?;
    let [user_id, otp_code, session_id] = require_fields(
        VERIFY_OTP_FIELDS,
        [
            req.user_id.as_deref(),
            req.otp_code.as_deref(),
            req.session_id.as_deref(),
        ],
    )?;

    let verified = state.auth.verify_otp(user_id, session_id, otp_code)?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        verified: true,
        session_id: verified.session_id,
        timestamp: verified.verified_at.timestamp(),
    }))
}
