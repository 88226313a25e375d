use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(&'static [&'static str]),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("No signature profile found for user")]
    ProfileNotFound(String),

    #[error("Invalid or expired OTP session")]
    SessionNotFound,

    #[error("OTP code has expired")]
    OtpExpired,

    #[error("Invalid OTP code")]
    OtpMismatch,

    #[error("Internal processing error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
