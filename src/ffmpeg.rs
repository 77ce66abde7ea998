//! FFmpeg-backed [`FrameSource`] implementation.
//!
//! [`FfmpegFrameSource`] opens a video once, caches its stream metadata, and
//! serves [`extract_at`](FrameSource::extract_at) requests by seeking and
//! decoding in-process via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)
//! bindings.
//!
//! Seeking strategy: the seek is issued *before* decoding starts and targets
//! the keyframe at or **before** the requested timestamp (`..=target`). A
//! forward seek would land on the next keyframe, which for a timestamp in the
//! middle of a GOP can be seconds away; decoding forward from the earlier
//! keyframe and discarding pre-roll frames by PTS is what makes sub-second
//! nudging land on the right frame.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use ffmpeg_sys_next::AV_TIME_BASE;
use image::{DynamicImage, RgbImage};

use crate::{error::FrameshiftError, source::FrameSource};

/// A [`FrameSource`] that decodes frames from a local video file via FFmpeg.
///
/// # Example
///
/// ```no_run
/// use frameshift::{FfmpegFrameSource, FrameSource};
///
/// let mut source = FfmpegFrameSource::open("input.mp4")?;
/// let duration = source.duration()?;
/// let image = source.extract_at(duration / 2.0)?;
/// image.save("midpoint.png")?;
/// # Ok::<(), frameshift::FrameshiftError>(())
/// ```
pub struct FfmpegFrameSource {
    input: Input,
    video_stream_index: usize,
    /// Container duration in seconds, when the demuxer reports one.
    duration: Option<f64>,
    width: u32,
    height: u32,
    /// Path to the opened file, kept for error messages.
    path: PathBuf,
}

impl FfmpegFrameSource {
    /// Open a video file and cache its stream metadata.
    ///
    /// Initialises FFmpeg (idempotent), locates the best video stream, and
    /// resolves the duration from the container, falling back to the video
    /// stream's own duration for containers that only carry per-stream
    /// timing.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::FileOpen`] if the file cannot be opened or
    /// recognised, and [`FrameshiftError::NoVideoStream`] if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameshiftError> {
        let path = path.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|error| FrameshiftError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| {
            FrameshiftError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            }
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(FrameshiftError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let mut duration = None;
        let container_duration = input.duration() as f64 / f64::from(AV_TIME_BASE);
        if container_duration > 0.0 {
            duration = Some(container_duration);
        } else {
            // Some containers only carry per-stream timing.
            let time_base = stream.time_base();
            let stream_duration = stream.duration() as f64 * f64::from(time_base.numerator())
                / f64::from(time_base.denominator());
            if stream_duration > 0.0 {
                duration = Some(stream_duration);
            }
        }

        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        let (width, height) = (decoder.width(), decoder.height());

        log::debug!(
            "opened {} ({}x{}, duration {:?})",
            path.display(),
            width,
            height,
            duration,
        );

        Ok(Self {
            input,
            video_stream_index,
            duration,
            width,
            height,
            path,
        })
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl FrameSource for FfmpegFrameSource {
    fn duration(&mut self) -> Result<f64, FrameshiftError> {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| FrameshiftError::DurationUnavailable {
                reason: format!("{} reports no usable duration", self.path.display()),
            })
    }

    fn extract_at(&mut self, timestamp: f64) -> Result<DynamicImage, FrameshiftError> {
        let failed = |reason: String| FrameshiftError::ExtractionFailed { timestamp, reason };

        let stream = self
            .input
            .stream(self.video_stream_index)
            .ok_or(FrameshiftError::NoVideoStream)?;
        let time_base = stream.time_base();
        let codec_parameters = stream.parameters();

        let decoder_context =
            CodecContext::from_parameters(codec_parameters).map_err(|e| failed(e.to_string()))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|e| failed(e.to_string()))?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| failed(e.to_string()))?;

        // Seek to the keyframe at or before the target; pre-roll frames are
        // discarded below by PTS. The demuxer keeps its position between
        // calls, so the seek is unconditional — a 0.0 target after an earlier
        // extraction (or after draining to EOF) must rewind, not resume.
        let seek_target = (timestamp * f64::from(AV_TIME_BASE)) as i64;
        if let Err(error) = self.input.seek(seek_target, ..seek_target) {
            log::warn!("seek to {timestamp:.3}s failed ({error}); decoding from current position");
        }

        let tb_num = f64::from(time_base.numerator());
        let tb_den = f64::from(time_base.denominator());
        let video_stream_index = self.video_stream_index;

        let mut decoded = VideoFrame::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != video_stream_index {
                continue;
            }
            decoder
                .send_packet(&packet)
                .map_err(|e| failed(e.to_string()))?;

            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts_seconds = decoded.pts().unwrap_or(0) as f64 * tb_num / tb_den;
                if pts_seconds + 1e-6 >= timestamp {
                    return convert_frame(&mut scaler, &decoded, timestamp);
                }
            }
        }

        // Drain the decoder: the target may sit in the final GOP.
        decoder.send_eof().map_err(|e| failed(e.to_string()))?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            let pts_seconds = decoded.pts().unwrap_or(0) as f64 * tb_num / tb_den;
            if pts_seconds + 1e-6 >= timestamp {
                return convert_frame(&mut scaler, &decoded, timestamp);
            }
        }

        Err(failed(
            "no frame at or after the requested timestamp".into(),
        ))
    }
}

/// Scale a decoded frame to RGB24 and convert it into a [`DynamicImage`].
fn convert_frame(
    scaler: &mut ScalingContext,
    decoded: &VideoFrame,
    timestamp: f64,
) -> Result<DynamicImage, FrameshiftError> {
    let mut rgb = VideoFrame::empty();
    scaler
        .run(decoded, &mut rgb)
        .map_err(|e| FrameshiftError::ExtractionFailed {
            timestamp,
            reason: e.to_string(),
        })?;
    frame_to_image(&rgb, decoded.width(), decoded.height()).ok_or_else(|| {
        FrameshiftError::ExtractionFailed {
            timestamp,
            reason: "frame buffer has unexpected size".into(),
        }
    })
}

/// Convert a scaled RGB24 frame into a [`DynamicImage`], stripping any
/// per-row stride padding FFmpeg may have added.
fn frame_to_image(frame: &VideoFrame, width: u32, height: u32) -> Option<DynamicImage> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let data = frame.data(0);

    let buffer = if stride == row_bytes {
        data.get(..row_bytes * height as usize)?.to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(data.get(start..start + row_bytes)?);
        }
        buffer
    };

    RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8)
}
