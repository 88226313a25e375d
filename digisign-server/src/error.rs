//! API error handling module
//!
//! Every failure leaves the API as `{"success": false, "error": ..., "code": ...}`.
//! Internal details are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use digisign_core::AuthError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Action a client should take after a missing-profile failure.
pub const ACTION_ENROLL_SIGNATURE: &str = "enroll_signature";

/// Client-facing message for any internal failure.
const INTERNAL_MESSAGE: &str = "Internal processing error";

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Invalid OTP code")]
    pub error: String,
    /// Stable machine-readable error code
    #[schema(example = "OTP_MISMATCH")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "enroll_signature")]
    pub action_required: Option<String>,
}

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing or not valid JSON
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the configured size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Failure from the authentication workflow
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) => match e {
                AuthError::MissingFields(_)
                | AuthError::InvalidImageData(_)
                | AuthError::SessionNotFound
                | AuthError::OtpExpired
                | AuthError::OtpMismatch => StatusCode::BAD_REQUEST,
                AuthError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Auth(e) => match e {
                AuthError::MissingFields(_) => "MISSING_FIELDS",
                AuthError::InvalidImageData(_) => "INVALID_IMAGE_DATA",
                AuthError::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
                AuthError::SessionNotFound => "OTP_SESSION_NOT_FOUND",
                AuthError::OtpExpired => "OTP_EXPIRED",
                AuthError::OtpMismatch => "OTP_MISMATCH",
                AuthError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(message) | Self::PayloadTooLarge(message) => message.clone(),
            Self::Internal(_) | Self::Auth(AuthError::Internal(_)) => INTERNAL_MESSAGE.to_string(),
            Self::Auth(e) => e.to_string(),
        }
    }

    fn action_required(&self) -> Option<&'static str> {
        match self {
            Self::Auth(AuthError::ProfileNotFound(_)) => Some(ACTION_ENROLL_SIGNATURE),
            _ => None,
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Internal(_) => "internal",
            Self::Auth(AuthError::Internal(_)) => "internal",
            Self::Auth(AuthError::ProfileNotFound(_)) => "not_found",
            Self::Auth(AuthError::SessionNotFound | AuthError::OtpExpired | AuthError::OtpMismatch) => {
                "otp_rejected"
            }
            Self::Auth(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %self,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %self,
                "Client error"
            );
        }

        let body = ErrorResponse {
            success: false,
            error: self.client_message(),
            code: code.to_string(),
            action_required: self.action_required().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}
