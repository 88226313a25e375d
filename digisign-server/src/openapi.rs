//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers::{
    EnrollResponse, GenerateOtpRequest, GenerateOtpResponse, HealthResponse, ReadyResponse,
    SignatureRequest, VerifyOtpRequest, VerifyOtpResponse, VerifySignatureResponse,
};

/// DigiSign Backend API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DigiSign Backend API",
        version = "0.1.0",
        description = r#"
## Handwritten-signature and one-time-passcode authentication (demo)

Two independent factors:

- **Signature**: enroll a reference image with `POST /enroll-signature`, then
  check candidates with `POST /verify-signature`. Scores above 0.7 verify.
- **OTP fallback**: `POST /generate-otp` issues a six-digit code valid for
  300 seconds; `POST /verify-otp` consumes it.

The signature comparator is a placeholder heuristic, not a biometric matcher.
All state is held in memory and lost on restart.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:5001", description = "Local development server")
    ),
    tags(
        (name = "Signature", description = "Signature profile enrollment and verification"),
        (name = "OTP", description = "Session-scoped one-time passcodes"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::signature::enroll_signature_handler,
        crate::handlers::signature::verify_signature_handler,
        crate::handlers::otp::generate_otp_handler,
        crate::handlers::otp::verify_otp_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            SignatureRequest,
            EnrollResponse,
            VerifySignatureResponse,
            GenerateOtpRequest,
            GenerateOtpResponse,
            VerifyOtpRequest,
            VerifyOtpResponse,
            ErrorResponse,
        )
    )
)]
pub struct ApiDoc;
