//! DigiSign Core - signature and one-time-passcode authentication workflow
//!
//! This crate holds the decision logic of the DigiSign demo backend:
//!
//! - **Ingestion**: base64 / data-URL image payloads to RGB pixel grids
//! - **Profiles**: one enrolled reference signature per user
//! - **Scoring**: a placeholder edge-density comparator behind the [`Scorer`] trait
//! - **OTP**: six-digit, session-scoped, single-use codes valid for 300 seconds
//! - **Flows**: the [`Authenticator`] facade composing the above
//!
//! State lives in process memory only. The placeholder scorer is not a
//! biometric comparator and must not be relied on for security.
//!
//! # Example
//!
//! ```
//! use digisign_core::{AuthError, Authenticator};
//!
//! let auth = Authenticator::in_memory();
//! let issued = auth.generate_otp("u1", "s1");
//! assert_eq!(issued.code.len(), 6);
//!
//! let verified = auth.verify_otp("u1", "s1", &issued.code).unwrap();
//! assert_eq!(verified.session_id, "s1");
//!
//! // Codes are single use.
//! assert_eq!(
//!     auth.verify_otp("u1", "s1", &issued.code),
//!     Err(AuthError::SessionNotFound)
//! );
//! ```

pub mod clock;
pub mod error;
pub mod flows;
pub mod ingest;
pub mod otp;
pub mod profile;
pub mod scorer;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, Result};
pub use flows::{
    require_fields, Authenticator, AuthenticatorBuilder, Enrollment, SignatureVerdict,
    GENERATE_OTP_FIELDS, SIGNATURE_FIELDS, VERIFY_OTP_FIELDS,
};
pub use ingest::{decode_image_bytes, decode_image_payload, strip_data_url, DecodedImage};
pub use otp::{IssuedOtp, OtpRecord, OtpService, VerifiedOtp, OTP_TTL_SECS};
pub use profile::{ProfileStore, SignatureProfile};
pub use scorer::{
    base_score, edge_density, is_verified, PlaceholderScorer, Scorer, VERIFICATION_THRESHOLD,
};
pub use store::{KeyValueStore, MemoryStore, Taken};
