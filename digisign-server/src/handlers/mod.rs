//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod otp;
pub mod signature;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub use crate::state::AppState;
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use otp::{
    generate_otp_handler, verify_otp_handler, GenerateOtpRequest, GenerateOtpResponse,
    VerifyOtpRequest, VerifyOtpResponse,
};
pub use signature::{
    enroll_signature_handler, verify_signature_handler, EnrollResponse, SignatureRequest,
    VerifySignatureResponse,
};

const NO_JSON_DATA: &str = "No JSON data provided";

/// Turn an extracted JSON body into a request type.
///
/// A missing content type, `null` or an empty object counts as no data. An
/// oversized body keeps its 413 status; every other rejection is a 400.
pub(crate) fn parse_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let value = match payload {
        Ok(Json(value)) => value,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return Err(ApiError::bad_request(NO_JSON_DATA))
        }
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::payload_too_large(rejection.body_text()))
        }
        Err(rejection) => {
            return Err(ApiError::bad_request(format!(
                "Invalid JSON payload: {}",
                rejection.body_text()
            )))
        }
    };

    let empty = match &value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if empty {
        return Err(ApiError::bad_request(NO_JSON_DATA));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON payload: {}", e)))
}

/// Run CPU-bound workflow steps (image decoding, edge detection) off the
/// async executor.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> digisign_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}
