//! Loading signature images from disk.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use digisign_core::{decode_image_bytes, decode_image_payload, DecodedImage};
use tracing::debug;

/// The input file could not be read at all.
#[derive(Debug)]
pub struct InputError {
    path: PathBuf,
    source: std::io::Error,
}

impl InputError {
    pub fn new(path: PathBuf, source: std::io::Error) -> Self {
        Self { path, source }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to read file {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Read and decode an image file.
///
/// Files holding encoded image bytes are decoded directly. Anything else is
/// treated as a text payload in the same base64 / data-URL form the HTTP API
/// accepts.
pub fn load_image(path: &Path) -> Result<DecodedImage> {
    let bytes = std::fs::read(path).map_err(|e| InputError::new(path.to_path_buf(), e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read file");

    if let Ok(image) = decode_image_bytes(&bytes) {
        debug!(format = "binary", "Decoded image");
        return Ok(image);
    }

    let text = String::from_utf8_lossy(&bytes);
    let image = decode_image_payload(&text)?;
    debug!(format = "base64", "Decoded image");
    Ok(image)
}
