//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use digisign_core::Authenticator;

use crate::config::Config;

/// Application state containing shared resources.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Signature and OTP workflow, backed by process-wide stores
    pub auth: Authenticator,
    /// Whether generate-otp returns the code (demo only)
    pub expose_otp_code: bool,
}

impl AppState {
    pub fn new(auth: Authenticator, config: &Config) -> Self {
        Self {
            auth,
            expose_otp_code: config.expose_otp_code,
        }
    }
}
