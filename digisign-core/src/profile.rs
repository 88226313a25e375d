//! Enrolled signature profiles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AuthError, Result};
use crate::store::{KeyValueStore, MemoryStore};

/// A user's enrolled reference signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureProfile {
    pub user_id: String,
    /// Base64 body of the enrolled image, stored as submitted (data URL
    /// header removed). It is kept as the comparison baseline and is not
    /// decoded at enrollment.
    pub reference_image: String,
    pub enrolled_at: DateTime<Utc>,
    /// Session the enrollment arrived under. Audit only.
    pub session_id: String,
}

/// Profiles keyed by user id. At most one profile per user.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore<SignatureProfile>>,
    clock: Arc<dyn Clock>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn KeyValueStore<SignatureProfile>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), clock)
    }

    /// Insert or fully replace the profile for `user_id`.
    pub fn enroll(
        &self,
        user_id: &str,
        reference_image: impl Into<String>,
        session_id: &str,
    ) -> DateTime<Utc> {
        let enrolled_at = self.clock.now();
        let profile = SignatureProfile {
            user_id: user_id.to_string(),
            reference_image: reference_image.into(),
            enrolled_at,
            session_id: session_id.to_string(),
        };

        let replaced = self.store.put(user_id.to_string(), profile);
        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            replaced = replaced.is_some(),
            "Signature profile enrolled"
        );

        enrolled_at
    }

    pub fn lookup(&self, user_id: &str) -> Result<SignatureProfile> {
        self.store
            .get(user_id)
            .ok_or_else(|| AuthError::ProfileNotFound(user_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("profiles", &self.store.len())
            .finish()
    }
}
