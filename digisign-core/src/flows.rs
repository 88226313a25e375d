//! Authentication flows.
//!
//! [`Authenticator`] composes ingestion, the profile store, the scorer and
//! the OTP service into the four user-facing flows. It is transport
//! independent: the HTTP layer only validates JSON, calls in, and renders
//! the outcome.
//!
//! The two factors are independent. Nothing here requires a caller to pass
//! both; policy that combines them belongs above this layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, Result};
use crate::ingest::{decode_image_payload, strip_data_url};
use crate::otp::{IssuedOtp, OtpRecord, OtpService, VerifiedOtp};
use crate::profile::{ProfileStore, SignatureProfile};
use crate::scorer::{is_verified, PlaceholderScorer, Scorer};
use crate::store::{KeyValueStore, MemoryStore};

/// Required fields of the enroll and verify-signature flows.
pub const SIGNATURE_FIELDS: &[&str; 3] = &["user_id", "signature_image", "session_id"];
/// Required fields of the generate-otp flow.
pub const GENERATE_OTP_FIELDS: &[&str; 2] = &["user_id", "session_id"];
/// Required fields of the verify-otp flow.
pub const VERIFY_OTP_FIELDS: &[&str; 3] = &["user_id", "otp_code", "session_id"];

/// Check that every field is present and non-empty.
///
/// On failure the error names the full required set, not only the missing
/// ones.
pub fn require_fields<'a, const N: usize>(
    names: &'static [&'static str; N],
    values: [Option<&'a str>; N],
) -> Result<[&'a str; N]> {
    if values.iter().any(|v| v.map_or(true, str::is_empty)) {
        return Err(AuthError::MissingFields(names));
    }
    Ok(values.map(|v| v.unwrap_or_default()))
}

/// Outcome of a successful enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub user_id: String,
    pub session_id: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Outcome of a signature check. `verified == false` is a normal outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureVerdict {
    pub verified: bool,
    pub confidence: f64,
    pub session_id: String,
    pub checked_at: DateTime<Utc>,
}

/// The signature and OTP authentication workflow.
#[derive(Clone)]
pub struct Authenticator {
    profiles: ProfileStore,
    otp: OtpService,
    scorer: Arc<dyn Scorer>,
    clock: Arc<dyn Clock>,
}

impl Authenticator {
    pub fn builder() -> AuthenticatorBuilder {
        AuthenticatorBuilder::default()
    }

    /// In-memory stores, system clock, placeholder scorer.
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    /// Decode the payload and store it as `user_id`'s reference signature,
    /// replacing any earlier profile.
    pub fn enroll_signature(
        &self,
        user_id: &str,
        signature_image: &str,
        session_id: &str,
    ) -> Result<Enrollment> {
        // Any decodable image is accepted; decoding only validates it.
        decode_image_payload(signature_image)?;
        let reference = strip_data_url(signature_image)?;

        let enrolled_at = self.profiles.enroll(user_id, reference, session_id);

        Ok(Enrollment {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            enrolled_at,
        })
    }

    /// Score a candidate signature against `user_id`'s enrolled profile.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidImageData`] for an undecodable payload (checked
    /// first), [`AuthError::ProfileNotFound`] when the user never enrolled.
    pub fn verify_signature(
        &self,
        user_id: &str,
        signature_image: &str,
        session_id: &str,
    ) -> Result<SignatureVerdict> {
        let candidate = decode_image_payload(signature_image)?;
        let profile = self.profiles.lookup(user_id)?;

        let confidence = self.scorer.score(&candidate, &profile)?;
        let verified = is_verified(confidence);

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            scorer = self.scorer.name(),
            confidence,
            verified,
            "Signature checked"
        );

        Ok(SignatureVerdict {
            verified,
            confidence,
            session_id: session_id.to_string(),
            checked_at: self.clock.now(),
        })
    }

    pub fn generate_otp(&self, user_id: &str, session_id: &str) -> IssuedOtp {
        self.otp.generate(user_id, session_id)
    }

    /// Consume the session's code. The claimed `user_id` is not compared with
    /// the identity the code was issued for.
    pub fn verify_otp(&self, user_id: &str, session_id: &str, code: &str) -> Result<VerifiedOtp> {
        let verified = self.otp.verify(session_id, code)?;
        if verified.user_id != user_id {
            tracing::warn!(
                session_id = %session_id,
                claimed_user = %user_id,
                issued_user = %verified.user_id,
                "OTP verified for a different user than it was issued to"
            );
        }
        Ok(verified)
    }

    pub fn lookup_profile(&self, user_id: &str) -> Result<SignatureProfile> {
        self.profiles.lookup(user_id)
    }

    pub fn purge_expired_otps(&self) -> usize {
        self.otp.purge_expired()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn pending_otps(&self) -> usize {
        self.otp.pending()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("profiles", &self.profiles)
            .field("otp", &self.otp)
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

/// Builder for [`Authenticator`]. Unset parts default to in-memory stores,
/// the system clock and [`PlaceholderScorer`].
#[derive(Default)]
pub struct AuthenticatorBuilder {
    clock: Option<Arc<dyn Clock>>,
    scorer: Option<Arc<dyn Scorer>>,
    profile_store: Option<Arc<dyn KeyValueStore<SignatureProfile>>>,
    otp_store: Option<Arc<dyn KeyValueStore<OtpRecord>>>,
}

impl AuthenticatorBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn profile_store(mut self, store: Arc<dyn KeyValueStore<SignatureProfile>>) -> Self {
        self.profile_store = Some(store);
        self
    }

    pub fn otp_store(mut self, store: Arc<dyn KeyValueStore<OtpRecord>>) -> Self {
        self.otp_store = Some(store);
        self
    }

    pub fn build(self) -> Authenticator {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let scorer = self
            .scorer
            .unwrap_or_else(|| Arc::new(PlaceholderScorer::new()));
        let profile_store = self
            .profile_store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let otp_store = self.otp_store.unwrap_or_else(|| Arc::new(MemoryStore::new()));

        Authenticator {
            profiles: ProfileStore::new(profile_store, clock.clone()),
            otp: OtpService::new(otp_store, clock.clone()),
            scorer,
            clock,
        }
    }
}
