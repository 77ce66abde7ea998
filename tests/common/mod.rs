//! Shared test support: a synthetic, fixture-free frame source.

#![allow(dead_code)]

use frameshift::{FrameSource, FrameshiftError};
use image::{DynamicImage, Rgb, RgbImage};

/// A [`FrameSource`] that fabricates solid-colour frames in memory.
///
/// The colour encodes the requested timestamp, so a test can tell frames
/// apart. Individual timestamps can be marked as failing, and every request
/// is logged for assertions about call order and continuation.
pub struct SyntheticSource {
    duration: Option<f64>,
    fail_at: Vec<f64>,
    pub requested: Vec<f64>,
}

impl SyntheticSource {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            fail_at: Vec::new(),
            requested: Vec::new(),
        }
    }

    /// A source whose duration probe fails.
    pub fn unprobeable() -> Self {
        Self {
            duration: None,
            fail_at: Vec::new(),
            requested: Vec::new(),
        }
    }

    /// A source that reports a bogus duration without failing the probe.
    pub fn with_reported_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            fail_at: Vec::new(),
            requested: Vec::new(),
        }
    }

    pub fn failing_at(mut self, timestamps: &[f64]) -> Self {
        self.fail_at.extend_from_slice(timestamps);
        self
    }

    pub fn frame_for(timestamp: f64) -> DynamicImage {
        let tint = (timestamp * 10.0) as u8;
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 36, Rgb([tint, 64, 128])))
    }
}

impl FrameSource for SyntheticSource {
    fn duration(&mut self) -> Result<f64, FrameshiftError> {
        self.duration
            .ok_or_else(|| FrameshiftError::DurationUnavailable {
                reason: "synthetic probe failure".into(),
            })
    }

    fn extract_at(&mut self, timestamp: f64) -> Result<DynamicImage, FrameshiftError> {
        self.requested.push(timestamp);
        if self.fail_at.iter().any(|t| (t - timestamp).abs() < 1e-6) {
            return Err(FrameshiftError::ExtractionFailed {
                timestamp,
                reason: "synthetic decode failure".into(),
            });
        }
        Ok(Self::frame_for(timestamp))
    }
}
