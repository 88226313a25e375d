//! Exit codes following sysexits.h conventions.

use digisign_core::AuthError;

use crate::input::InputError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (image could not be decoded).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = if err.downcast_ref::<InputError>().is_some() {
            INPUT_ERROR
        } else if matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::InvalidImageData(_))
        ) {
            DATA_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(format!("{err:#}")),
        }
    }
}
