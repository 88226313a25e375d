//! Signature image ingestion.
//!
//! Turns the text payload a client submits (base64, optionally wrapped in a
//! `data:image/...;base64,` URL) into a decoded RGB pixel grid.
//!
//! Images with an alpha channel are reduced to RGB by dropping alpha. A
//! transparent canvas export keeps whatever colour its transparent pixels
//! carry (usually black), so dark strokes on it vanish into the background.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::{AuthError, Result};

/// Prefix that marks a data URL wrapping the base64 payload.
pub const DATA_URL_MARKER: &str = "data:image";

/// A decoded signature image: `height x width x 3` RGB samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbImage,
}

impl DecodedImage {
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Reduce any decoded raster to RGB. Alpha is discarded, not blended.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgb(image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Luma conversion with ITU-R BT.601 weights.
    pub fn to_grayscale(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b] = self.pixels.get_pixel(x, y).0;
            let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
            Luma([luma as u8])
        })
    }
}

/// Strip an optional `data:image...,` header, returning the base64 body.
pub fn strip_data_url(payload: &str) -> Result<&str> {
    let payload = payload.trim();
    if !payload.starts_with(DATA_URL_MARKER) {
        return Ok(payload);
    }

    payload
        .split_once(',')
        .map(|(_, body)| body)
        .ok_or_else(|| AuthError::InvalidImageData("data URL is missing its ',' separator".into()))
}

/// Decode raw raster bytes (PNG, JPEG, GIF, WebP, BMP).
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AuthError::InvalidImageData(format!("failed to decode image: {e}")))?;
    Ok(DecodedImage::from_dynamic(image))
}

/// Decode a client payload into a pixel grid.
///
/// Fails with [`AuthError::InvalidImageData`] when the payload is not valid
/// base64 or does not hold a decodable raster image.
pub fn decode_image_payload(payload: &str) -> Result<DecodedImage> {
    let body = strip_data_url(payload)?;
    let bytes = BASE64
        .decode(body)
        .map_err(|e| AuthError::InvalidImageData(format!("invalid base64: {e}")))?;
    let image = decode_image_bytes(&bytes)?;

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Decoded signature image"
    );

    Ok(image)
}
