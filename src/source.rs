//! The frame-source capability seam.
//!
//! The engine never decodes video itself; it consumes a [`FrameSource`] — a
//! collaborator bound to one video that can report its duration and produce a
//! decoded image for any timestamp. The shipped implementation is
//! [`FfmpegFrameSource`](crate::FfmpegFrameSource); tests substitute a
//! synthetic source so the planner, session, and refinement logic can be
//! exercised without media fixtures.

use image::DynamicImage;

use crate::error::FrameshiftError;

/// A capability that produces still frames from a single video.
///
/// Implementations take `&mut self` because real decoders mutate demuxer
/// state while seeking. Probing and extraction are the only operations in
/// the engine that may block; everything else is synchronous math.
pub trait FrameSource {
    /// The video's total duration in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::DurationUnavailable`] if the duration
    /// cannot be determined or is not a positive finite number.
    fn duration(&mut self) -> Result<f64, FrameshiftError>;

    /// Extract a decoded frame at (or as near as the container allows to)
    /// `timestamp` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::ExtractionFailed`] when no frame can be
    /// produced for the timestamp. A failure here is scoped to the one
    /// timestamp — callers running batches skip and continue.
    fn extract_at(&mut self, timestamp: f64) -> Result<DynamicImage, FrameshiftError>;
}
