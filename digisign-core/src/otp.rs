//! Session-scoped one-time passcodes.
//!
//! Each session holds at most one live code. A record moves through
//! `Issued -> Consumed` on a successful check or `Issued -> Expired` when a
//! check arrives more than [`OTP_TTL_SECS`] after issuance; both end with the
//! record deleted. Mismatched attempts leave the record untouched, so retries
//! are bounded only by the expiry window.
//!
//! Expiry is evaluated when a code is checked. [`OtpService::purge_expired`]
//! exists for periodic hygiene and is not needed for correctness.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AuthError, Result};
use crate::store::{KeyValueStore, MemoryStore, Taken};

/// Lifetime of an issued code, in seconds.
pub const OTP_TTL_SECS: i64 = 300;

/// Codes are drawn uniformly from this range (always six digits).
pub const OTP_CODE_RANGE: RangeInclusive<u32> = 100_000..=999_999;

pub const OTP_CODE_LEN: usize = 6;

/// A live passcode for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub session_id: String,
    pub code: String,
    /// Identity the code was issued for. Not checked on verification.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + TimeDelta::seconds(OTP_TTL_SECS)
    }

    /// Expired once strictly more than the TTL has elapsed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > TimeDelta::seconds(OTP_TTL_SECS)
    }
}

/// Result of issuing a code.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedOtp {
    pub session_id: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_in: u64,
    /// Whether a live code for the same session was overwritten.
    pub replaced: bool,
}

/// Result of a successful check.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedOtp {
    pub session_id: String,
    pub user_id: String,
    pub verified_at: DateTime<Utc>,
}

/// Issues and consumes passcodes.
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn KeyValueStore<OtpRecord>>,
    clock: Arc<dyn Clock>,
}

impl OtpService {
    pub fn new(store: Arc<dyn KeyValueStore<OtpRecord>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), clock)
    }

    /// Issue a fresh code for `session_id`, replacing any existing one.
    pub fn generate(&self, user_id: &str, session_id: &str) -> IssuedOtp {
        self.generate_with_rng(user_id, session_id, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        session_id: &str,
        rng: &mut R,
    ) -> IssuedOtp {
        let code = format!("{:0width$}", rng.gen_range(OTP_CODE_RANGE), width = OTP_CODE_LEN);
        let issued_at = self.clock.now();

        let record = OtpRecord {
            session_id: session_id.to_string(),
            code: code.clone(),
            user_id: user_id.to_string(),
            created_at: issued_at,
        };
        let replaced = self.store.put(session_id.to_string(), record).is_some();

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            replaced,
            "OTP issued"
        );

        IssuedOtp {
            session_id: session_id.to_string(),
            code,
            issued_at,
            expires_in: OTP_TTL_SECS as u64,
            replaced,
        }
    }

    /// Check `candidate` against the live code for `session_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionNotFound`] when no code is live for the session
    ///   (never issued, already consumed, or already expired).
    /// - [`AuthError::OtpExpired`] when the code outlived its TTL; the record
    ///   is deleted.
    /// - [`AuthError::OtpMismatch`] when the code differs; the record stays.
    pub fn verify(&self, session_id: &str, candidate: &str) -> Result<VerifiedOtp> {
        let now = self.clock.now();

        let taken = self.store.take_if(session_id, &mut |record| {
            record.is_expired_at(now) || record.code == candidate
        });

        match taken {
            Taken::Missing => {
                tracing::debug!(session_id = %session_id, "OTP check for unknown session");
                Err(AuthError::SessionNotFound)
            }
            Taken::Kept(_) => {
                tracing::info!(session_id = %session_id, "OTP mismatch");
                Err(AuthError::OtpMismatch)
            }
            Taken::Removed(record) if record.is_expired_at(now) => {
                tracing::info!(
                    session_id = %session_id,
                    expired_at = %record.expires_at(),
                    "OTP expired"
                );
                Err(AuthError::OtpExpired)
            }
            Taken::Removed(record) => {
                tracing::info!(
                    session_id = %session_id,
                    user_id = %record.user_id,
                    "OTP verified"
                );
                Ok(VerifiedOtp {
                    session_id: record.session_id,
                    user_id: record.user_id,
                    verified_at: now,
                })
            }
        }
    }

    /// Drop every record past its TTL. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.store.len();
        self.store.retain(&mut |record| !record.is_expired_at(now));
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired OTP records");
        }
        removed
    }

    /// Number of records currently held, expired or not.
    pub fn pending(&self) -> usize {
        self.store.len()
    }
}

impl std::fmt::Debug for OtpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpService")
            .field("pending", &self.store.len())
            .finish()
    }
}
