//! Exporting extracted frames to image files.
//!
//! The export path loads a record's full-resolution tier and writes it in
//! one of three raster formats. Batch export follows the crate's failure
//! policy: a write that fails is counted and reported, the remaining writes
//! proceed.

use std::path::{Path, PathBuf};

use crate::{
    error::FrameshiftError,
    frame::{FrameRecord, filename_timestamp},
};

/// Output format for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JPEG, the extraction-side storage format.
    #[default]
    Jpeg,
    /// PNG (lossless).
    Png,
    /// TIFF (lossless).
    Tiff,
}

impl ExportFormat {
    /// Conventional file extension (without dot).
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
            ExportFormat::Tiff => "tiff",
        }
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            ExportFormat::Jpeg => image::ImageFormat::Jpeg,
            ExportFormat::Png => image::ImageFormat::Png,
            ExportFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportReport {
    /// Files written successfully.
    pub written: usize,
    /// Writes that failed (logged, did not abort the batch).
    pub failed: usize,
}

/// Default export filename for a frame: `frameshift-12.5s.png`.
pub fn default_filename(timestamp: f64, format: ExportFormat) -> String {
    format!(
        "frameshift-{}.{}",
        filename_timestamp(timestamp),
        format.extension(),
    )
}

/// Write one frame's full-resolution image to `destination`.
///
/// Loads the full tier if it is not resident; the decode stays cached on the
/// record afterwards (release it with
/// [`release_full`](FrameRecord::release_full) if memory matters).
///
/// # Errors
///
/// Returns [`FrameshiftError::WriteFailed`] with the destination path; the
/// record itself is unaffected by a failure.
pub fn write_frame(
    record: &mut FrameRecord,
    destination: &Path,
    format: ExportFormat,
) -> Result<(), FrameshiftError> {
    let wrap = |reason: String| FrameshiftError::WriteFailed {
        path: destination.to_path_buf(),
        reason,
    };

    let image = record.load_full().map_err(|e| wrap(e.to_string()))?;
    image
        .save_with_format(destination, format.to_image_format())
        .map_err(|e| wrap(e.to_string()))
}

/// Write every frame into `directory` using default filenames.
///
/// Failed writes are counted, logged, and skipped; the remaining frames are
/// still written. Returns the paths of the files that were written alongside
/// the counters.
///
/// # Errors
///
/// Only a missing/uncreatable target directory is fatal.
pub fn write_frames(
    records: &mut [FrameRecord],
    directory: &Path,
    format: ExportFormat,
) -> Result<(ExportReport, Vec<PathBuf>), FrameshiftError> {
    std::fs::create_dir_all(directory)?;

    let mut report = ExportReport::default();
    let mut written = Vec::new();

    for record in records.iter_mut() {
        let destination = directory.join(default_filename(record.timestamp(), format));
        match write_frame(record, &destination, format) {
            Ok(()) => {
                report.written += 1;
                written.push(destination);
            }
            Err(error) => {
                log::warn!("export failed: {error}");
                report.failed += 1;
            }
        }
    }

    Ok((report, written))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filenames_carry_timestamp_and_extension() {
        assert_eq!(default_filename(12.5, ExportFormat::Png), "frameshift-12.5s.png");
        assert_eq!(default_filename(0.0, ExportFormat::Jpeg), "frameshift-0.0s.jpg");
        assert_eq!(default_filename(83.25, ExportFormat::Tiff), "frameshift-83.2s.tiff");
    }
}
