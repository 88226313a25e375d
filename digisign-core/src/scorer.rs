//! Signature similarity scoring.
//!
//! [`PlaceholderScorer`] is a stand-in comparator: its confidence depends only
//! on the candidate image's edge density plus uniform jitter. The enrolled
//! reference image is never compared. A real biometric comparator implements
//! [`Scorer`] and drops in without touching the authentication flows.
//!
//! # Algorithm
//!
//! 1. Grayscale the candidate (BT.601 weights).
//! 2. Canny edge map, thresholds 50 / 150.
//! 3. `density = edge_pixels / total_pixels`.
//! 4. `base = 0.5 + density * 0.3`.
//! 5. Add uniform jitter in `[-0.2, 0.2]`.
//! 6. Clamp to `[0.0, 1.0]`.
//!
//! `imageproc`'s Canny smooths with a Gaussian (sigma 1.4) before taking the
//! Sobel gradient magnitude. A detector that skips the blur or uses an L1
//! gradient marks more pixels, so densities here run lower than such
//! detectors report for the same image. Scores are only comparable with other
//! scores from this module.

use rand::Rng;

use crate::error::{AuthError, Result};
use crate::ingest::DecodedImage;
use crate::profile::SignatureProfile;

/// Scores strictly above this value verify.
pub const VERIFICATION_THRESHOLD: f64 = 0.7;

/// Canny hysteresis thresholds on the 8-bit gradient scale.
pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

const BASE_SCORE: f64 = 0.5;
const EDGE_DENSITY_WEIGHT: f64 = 0.3;

/// Default jitter amplitude applied by [`PlaceholderScorer`].
pub const DEFAULT_JITTER: f64 = 0.2;

/// Comparator producing a confidence in `[0.0, 1.0]` that `candidate` matches
/// the enrolled `reference`.
pub trait Scorer: Send + Sync {
    fn score(&self, candidate: &DecodedImage, reference: &SignatureProfile) -> Result<f64>;

    /// Identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Whether a confidence score clears the verification threshold.
pub fn is_verified(score: f64) -> bool {
    score > VERIFICATION_THRESHOLD
}

/// Fraction of pixels marked as edges by the Canny detector.
pub fn edge_density(image: &DecodedImage) -> f64 {
    let total = image.pixel_count();
    if total == 0 {
        return 0.0;
    }

    let edges = imageproc::edges::canny(
        &image.to_grayscale(),
        CANNY_LOW_THRESHOLD,
        CANNY_HIGH_THRESHOLD,
    );
    let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count() as u64;

    edge_pixels as f64 / total as f64
}

/// Deterministic part of the placeholder score.
pub fn base_score(edge_density: f64) -> f64 {
    BASE_SCORE + edge_density * EDGE_DENSITY_WEIGHT
}

/// Edge-density heuristic with random jitter. Not a secure comparator.
#[derive(Debug, Clone)]
pub struct PlaceholderScorer {
    jitter: f64,
}

impl PlaceholderScorer {
    pub fn new() -> Self {
        Self {
            jitter: DEFAULT_JITTER,
        }
    }

    /// Use a custom jitter amplitude. `0.0` makes the score deterministic.
    ///
    /// Non-finite amplitudes fall back to [`DEFAULT_JITTER`].
    pub fn with_jitter(amplitude: f64) -> Self {
        let jitter = if amplitude.is_finite() {
            amplitude.abs()
        } else {
            DEFAULT_JITTER
        };
        Self { jitter }
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Score with a caller-supplied random source.
    pub fn score_with_rng<R: Rng + ?Sized>(&self, candidate: &DecodedImage, rng: &mut R) -> f64 {
        let noise = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        (base_score(edge_density(candidate)) + noise).clamp(0.0, 1.0)
    }
}

impl Default for PlaceholderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for PlaceholderScorer {
    fn score(&self, candidate: &DecodedImage, _reference: &SignatureProfile) -> Result<f64> {
        let score = self.score_with_rng(candidate, &mut rand::thread_rng());
        if !score.is_finite() {
            return Err(AuthError::Internal(format!(
                "{} produced a non-finite score",
                self.name()
            )));
        }
        Ok(score)
    }

    fn name(&self) -> &'static str {
        "placeholder-edge-density"
    }
}
