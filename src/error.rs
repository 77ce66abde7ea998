//! Error types for the `frameshift` crate.
//!
//! This module defines [`FrameshiftError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context (paths,
//! timestamps, upstream messages) to diagnose a failure without extra logging
//! at the call site.
//!
//! Per-frame extraction failures inside a session are *not* errors at this
//! level — they are absorbed and counted by
//! [`ExtractionSession`](crate::ExtractionSession). Only whole-session
//! conditions (no duration, zero usable frames, cancellation) propagate.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `frameshift` operations.
///
/// Every public method that can fail returns `Result<T, FrameshiftError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameshiftError {
    /// The duration probe failed or reported a non-positive duration.
    ///
    /// Fatal to starting a session; the caller should surface the condition
    /// and allow a retry with a different file.
    #[error("Could not determine video duration: {reason}")]
    DurationUnavailable {
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::FfmpegFrameSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A single frame could not be extracted at the given timestamp.
    ///
    /// Inside a session this is counted and skipped; it only surfaces
    /// directly from [`FrameSource::extract_at`](crate::FrameSource::extract_at).
    #[error("Failed to extract frame at {timestamp:.1}s: {reason}")]
    ExtractionFailed {
        /// The requested timestamp in seconds.
        timestamp: f64,
        /// Underlying reason the extraction failed.
        reason: String,
    },

    /// A session completed with zero successfully extracted frames.
    #[error("No frames could be extracted from the video")]
    NoFramesExtracted,

    /// An adjustment was requested while a refinement was already in flight.
    ///
    /// Overlapping requests are rejected outright, never queued.
    #[error("A refinement is already in progress")]
    RefinementBusy,

    /// A single refinement attempt failed.
    ///
    /// Non-fatal: the displayed frame reverts to the last good state. Suitable
    /// for surfacing as a transient notification.
    #[error("Refinement at {timestamp:.1}s failed: {reason}")]
    RefinementFailed {
        /// The timestamp the refinement targeted.
        timestamp: f64,
        /// Underlying reason the re-extraction failed.
        reason: String,
    },

    /// An exported image could not be written.
    ///
    /// Scoped to one file; batch export counts these without aborting.
    #[error("Failed to write image to {path}: {reason}")]
    WriteFailed {
        /// The destination path.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// The operation observed its [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during decoding or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FrameshiftError {
    fn from(error: FfmpegError) -> Self {
        FrameshiftError::FfmpegError(error.to_string())
    }
}
