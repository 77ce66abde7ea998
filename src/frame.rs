//! The extracted-frame data model.
//!
//! A [`FrameRecord`] represents one sampled instant of a video: a stable
//! identity, a timestamp, a small always-resident thumbnail, and a
//! full-resolution image held in an explicit two-tier store.
//!
//! The two tiers are deliberate. Thumbnails (~200×112) are cheap enough to
//! keep in memory for an entire session; full-resolution frames are not, so
//! they live in a per-record temporary file and are loaded only through
//! [`FrameRecord::load_full`] and released through
//! [`FrameRecord::release_full`]. There is no hidden I/O inside a getter —
//! loading the big image is always a visible, fallible call.
//!
//! Backing files are removed automatically when the record is dropped.

use std::io::{Cursor, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::FrameshiftError;

/// Target bounding box for thumbnails, in pixels. Frames are scaled to fit
/// inside this box with their aspect ratio preserved.
pub const THUMBNAIL_MAX_WIDTH: u32 = 200;
/// See [`THUMBNAIL_MAX_WIDTH`].
pub const THUMBNAIL_MAX_HEIGHT: u32 = 112;

/// Opaque, stable identifier for a [`FrameRecord`].
///
/// Used for equality and lookup, never for ordering — records are ordered by
/// timestamp within their owning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(Uuid);

impl FrameId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// The full-resolution tier of a frame's image storage.
///
/// Either resident in memory (small sources, tests) or backed by a
/// JPEG-encoded temporary file with an optional cached decode.
#[derive(Debug)]
enum FullImage {
    /// The full image is held in memory for the record's lifetime.
    Memory(DynamicImage),
    /// The full image lives in a temporary file, decoded on demand.
    Disk {
        file: NamedTempFile,
        cached: Option<DynamicImage>,
    },
}

/// One extracted still frame.
///
/// Created by [`ExtractionSession`](crate::ExtractionSession) during a batch
/// run, or by [`RefinementController`](crate::RefinementController) when a
/// nudged timestamp is re-extracted. Dropping a record removes its backing
/// file.
#[derive(Debug)]
pub struct FrameRecord {
    id: FrameId,
    timestamp: f64,
    thumbnail: DynamicImage,
    full: FullImage,
}

impl PartialEq for FrameRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FrameRecord {}

impl FrameRecord {
    /// Build a record from a freshly extracted full-resolution image.
    ///
    /// The timestamp is clamped into `[0, duration]`. The thumbnail is scaled
    /// to fit [`THUMBNAIL_MAX_WIDTH`]×[`THUMBNAIL_MAX_HEIGHT`], and the full
    /// image is JPEG-encoded into a private temporary file that lives until
    /// the record is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::IoError`] if the backing file cannot be
    /// created or written, or [`FrameshiftError::ImageError`] if encoding
    /// fails.
    pub fn from_image(
        timestamp: f64,
        duration: f64,
        image: DynamicImage,
    ) -> Result<Self, FrameshiftError> {
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)?;

        let mut file = tempfile::Builder::new()
            .prefix("frameshift-frame-")
            .suffix(".jpg")
            .tempfile()?;
        file.write_all(&encoded)?;
        file.flush()?;

        Ok(Self {
            id: FrameId::new(),
            timestamp: clamp_timestamp(timestamp, duration),
            thumbnail: make_thumbnail(&image),
            full: FullImage::Disk {
                file,
                // The decode is already in hand; keep it until the caller
                // releases it rather than re-reading the file immediately.
                cached: Some(image),
            },
        })
    }

    /// Build a record by adopting an already-encoded image file from a
    /// session's staging directory.
    ///
    /// The staged file is moved (renamed, with a copy fallback for
    /// cross-device staging directories) onto the record's private backing
    /// path, so the bytes are written only once per frame. `image` is the
    /// decode the staged file was encoded from; it is kept as the warm cache.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::IoError`] if the staged file cannot be
    /// moved or copied.
    pub fn from_staged(
        timestamp: f64,
        duration: f64,
        image: DynamicImage,
        staged: &Path,
    ) -> Result<Self, FrameshiftError> {
        let file = tempfile::Builder::new()
            .prefix("frameshift-frame-")
            .suffix(".jpg")
            .tempfile()?;

        if std::fs::rename(staged, file.path()).is_err() {
            std::fs::copy(staged, file.path())?;
            let _ = std::fs::remove_file(staged);
        }

        Ok(Self {
            id: FrameId::new(),
            timestamp: clamp_timestamp(timestamp, duration),
            thumbnail: make_thumbnail(&image),
            full: FullImage::Disk {
                file,
                cached: Some(image),
            },
        })
    }

    /// Build a record whose full-resolution image stays in memory.
    ///
    /// No backing file is created. Useful for small sources and for tests
    /// that should not touch the filesystem.
    pub fn in_memory(timestamp: f64, duration: f64, image: DynamicImage) -> Self {
        Self {
            id: FrameId::new(),
            timestamp: clamp_timestamp(timestamp, duration),
            thumbnail: make_thumbnail(&image),
            full: FullImage::Memory(image),
        }
    }

    /// The record's stable identifier.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// The timestamp this frame was sampled at, in seconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// The always-resident thumbnail.
    pub fn thumbnail(&self) -> &DynamicImage {
        &self.thumbnail
    }

    /// The timestamp formatted for display: `"1:23.5"`, or `"8.0s"` under a
    /// minute.
    pub fn display_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }

    /// Path of the full-resolution backing file, if this record is
    /// disk-backed.
    pub fn full_image_path(&self) -> Option<&Path> {
        match &self.full {
            FullImage::Memory(_) => None,
            FullImage::Disk { file, .. } => Some(file.path()),
        }
    }

    /// Whether the full-resolution image is currently resident in memory.
    pub fn full_is_loaded(&self) -> bool {
        match &self.full {
            FullImage::Memory(_) => true,
            FullImage::Disk { cached, .. } => cached.is_some(),
        }
    }

    /// Load (or return the cached) full-resolution image.
    ///
    /// For disk-backed records the first call after a
    /// [`release_full`](Self::release_full) re-reads and decodes the backing
    /// file; the decode stays cached until released again.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::ImageError`] if the backing file cannot be
    /// decoded.
    pub fn load_full(&mut self) -> Result<&DynamicImage, FrameshiftError> {
        match &mut self.full {
            FullImage::Memory(image) => Ok(image),
            FullImage::Disk { file, cached } => {
                if cached.is_none() {
                    log::debug!("loading full-resolution frame from {}", file.path().display());
                    *cached = Some(image::open(file.path())?);
                }
                // The branch above guarantees the cache is populated.
                Ok(cached.as_ref().ok_or_else(|| {
                    FrameshiftError::IoError(std::io::Error::other("frame cache vanished"))
                })?)
            }
        }
    }

    /// Drop the cached full-resolution decode, keeping only the thumbnail
    /// and the backing file.
    ///
    /// No-op for in-memory records.
    pub fn release_full(&mut self) {
        if let FullImage::Disk { cached, .. } = &mut self.full {
            *cached = None;
        }
    }
}

/// Clamp a timestamp into the valid range for a video of `duration` seconds.
///
/// Negative and NaN inputs clamp to 0.
pub(crate) fn clamp_timestamp(timestamp: f64, duration: f64) -> f64 {
    if !timestamp.is_finite() {
        return 0.0;
    }
    timestamp.clamp(0.0, duration.max(0.0))
}

/// Scale an image to fit inside the thumbnail bounding box, preserving
/// aspect ratio.
fn make_thumbnail(image: &DynamicImage) -> DynamicImage {
    image.resize(
        THUMBNAIL_MAX_WIDTH,
        THUMBNAIL_MAX_HEIGHT,
        FilterType::Triangle,
    )
}

/// Format a timestamp for display: `"1:23.5"` with minutes, `"8.0s"` under a
/// minute.
pub fn format_timestamp(timestamp: f64) -> String {
    let timestamp = timestamp.max(0.0);
    let minutes = (timestamp / 60.0) as u64;
    let seconds = timestamp % 60.0;
    if minutes > 0 {
        format!("{minutes}:{seconds:04.1}")
    } else {
        format!("{seconds:.1}s")
    }
}

/// Format a timestamp for use inside a filename (no colons).
pub(crate) fn filename_timestamp(timestamp: f64) -> String {
    format!("{:.1}s", timestamp.max(0.0))
}
