//! Batch frame extraction over one video at one offset.
//!
//! [`ExtractionSession::run`] turns a timestamp plan into an ordered list of
//! [`FrameRecord`]s: probe the duration, plan the timestamps, extract each in
//! ascending order, and tolerate per-frame failures. A single bad seek is
//! counted and skipped; only a duration-probe failure, cancellation, or zero
//! usable frames abort the run.
//!
//! Sessions are all-or-nothing containers: starting a new extraction (for a
//! new file, or the same file at a different offset) means building a new
//! session and dropping the old one. Dropping the session drops its records,
//! which removes their full-resolution backing files.
//!
//! # Example
//!
//! ```no_run
//! use frameshift::{ExtractionSession, FfmpegFrameSource, SessionOptions};
//!
//! let mut source = FfmpegFrameSource::open("input.mp4")?;
//! let session = ExtractionSession::run(&mut source, 0.0, SessionOptions::new())?;
//! println!(
//!     "{} frames extracted, {} skipped",
//!     session.stats().extracted,
//!     session.stats().skipped,
//! );
//! # Ok::<(), frameshift::FrameshiftError>(())
//! ```

use std::path::Path;

use image::ImageFormat;

use crate::{
    error::FrameshiftError,
    frame::{FrameId, FrameRecord, filename_timestamp},
    plan::{SamplingPolicy, plan_timestamps},
    progress::{CancellationToken, ProgressSender},
    source::FrameSource,
};

/// Options for an extraction run.
///
/// Carries the sampling policy plus optional progress and cancellation
/// wiring. A default-constructed value extracts silently with the standard
/// policy.
#[derive(Debug, Default)]
#[must_use]
pub struct SessionOptions {
    policy: SamplingPolicy,
    progress: Option<ProgressSender>,
    cancellation: Option<CancellationToken>,
}

impl SessionOptions {
    /// Create options with the default sampling policy and no wiring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom sampling policy.
    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach the sending half of a progress channel.
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Attach a cancellation token, checked before each extraction.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Counters describing how a session run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    /// Timestamps in the plan.
    pub planned: usize,
    /// Frames successfully extracted.
    pub extracted: usize,
    /// Timestamps skipped because their extraction failed.
    pub skipped: usize,
}

/// One complete extraction run: the ordered records plus run metadata.
///
/// Records are stored in strictly ascending timestamp order; consumers never
/// observe an out-of-order collection. Lookup is by [`FrameId`], replacement
/// (for refinement accept) is positional.
#[derive(Debug)]
pub struct ExtractionSession {
    duration: f64,
    offset: f64,
    interval: f64,
    records: Vec<FrameRecord>,
    stats: SessionStats,
}

impl ExtractionSession {
    /// Run a full extraction over `source`, sampling from `offset` seconds.
    ///
    /// # Errors
    ///
    /// - [`FrameshiftError::DurationUnavailable`] if the probe fails — fatal,
    ///   nothing was extracted.
    /// - [`FrameshiftError::NoFramesExtracted`] if the plan was empty (offset
    ///   at or past the end) or every single extraction failed.
    /// - [`FrameshiftError::Cancelled`] if the token fired mid-run; records
    ///   extracted so far are dropped with the session-to-be.
    ///
    /// Per-frame extraction failures are *not* errors: they are logged,
    /// counted in [`SessionStats::skipped`], and the run continues.
    pub fn run<S: FrameSource>(
        source: &mut S,
        offset: f64,
        options: SessionOptions,
    ) -> Result<Self, FrameshiftError> {
        let SessionOptions {
            policy,
            mut progress,
            cancellation,
        } = options;

        report(&mut progress, 0.1, "Analyzing video...");
        let duration = source.duration()?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(FrameshiftError::DurationUnavailable {
                reason: format!("probe returned {duration}"),
            });
        }
        report(
            &mut progress,
            0.2,
            format!("Video duration: {}s", duration as u64),
        );

        let interval = policy.interval_for(duration);
        let estimated = (duration / interval) as u64;
        report(
            &mut progress,
            0.25,
            format!("Optimized for {estimated} frames every {interval:.1}s"),
        );

        let plan = plan_timestamps(duration, offset, interval);
        if plan.is_empty() {
            log::warn!("empty plan (duration {duration:.1}s, offset {offset:.1}s)");
            return Err(FrameshiftError::NoFramesExtracted);
        }
        report(
            &mut progress,
            0.3,
            format!("Extracting {} frames...", plan.len()),
        );

        // Intermediates are staged here and either adopted by a record or
        // removed with the directory when the run returns.
        let staging = tempfile::Builder::new().prefix("frameshift-").tempdir()?;

        let mut records: Vec<FrameRecord> = Vec::with_capacity(plan.len());
        let mut skipped = 0usize;

        for (index, &timestamp) in plan.iter().enumerate() {
            if cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
                log::debug!("session cancelled after {} of {} frames", index, plan.len());
                return Err(FrameshiftError::Cancelled);
            }

            let fraction = 0.3 + (index as f64 / plan.len() as f64) * 0.6;
            report(
                &mut progress,
                fraction,
                format!("Extracting frame at {timestamp:.1}s..."),
            );

            match extract_one(source, timestamp, duration, staging.path()) {
                Ok(record) => records.push(record),
                Err(error) => {
                    log::warn!("skipping frame at {timestamp:.1}s: {error}");
                    skipped += 1;
                }
            }
        }

        if records.is_empty() {
            return Err(FrameshiftError::NoFramesExtracted);
        }

        if let Some(progress) = progress.as_mut() {
            progress.complete("Extraction complete!");
        }

        let stats = SessionStats {
            planned: plan.len(),
            extracted: records.len(),
            skipped,
        };
        log::debug!(
            "session complete: {} extracted, {} skipped (interval {interval:.1}s)",
            stats.extracted,
            stats.skipped,
        );

        Ok(Self {
            duration,
            offset: offset.max(0.0),
            interval,
            records,
            stats,
        })
    }

    /// Source video duration in seconds, as probed for this run.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The start offset this session sampled from.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The sampling interval the policy chose for this run.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Run counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The extracted records, in ascending timestamp order.
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    /// Mutable access to the records, for `load_full`/`release_full`.
    pub fn records_mut(&mut self) -> &mut [FrameRecord] {
        &mut self.records
    }

    /// Number of extracted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the session holds no records. `run` never returns an empty
    /// session, so this is only reachable after replacements go wrong.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn get(&self, id: FrameId) -> Option<&FrameRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: FrameId) -> Option<&mut FrameRecord> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    /// Replace the record with id `id` in place, returning the old record.
    ///
    /// Used by refinement accept: the replacement keeps the original's
    /// position even when its nudged timestamp strays past a neighbour.
    /// Returns `replacement` back as the error value when `id` is not in
    /// this session.
    pub fn replace(
        &mut self,
        id: FrameId,
        replacement: FrameRecord,
    ) -> Result<FrameRecord, FrameRecord> {
        match self.records.iter().position(|record| record.id() == id) {
            Some(index) => Ok(std::mem::replace(&mut self.records[index], replacement)),
            None => Err(replacement),
        }
    }
}

/// Report progress if a sender is attached.
fn report(progress: &mut Option<ProgressSender>, fraction: f64, phase: impl Into<String>) {
    if let Some(sender) = progress.as_mut() {
        sender.send(fraction, phase);
    }
}

/// Extract one timestamp: decode, stage the encoded image, build the record.
fn extract_one<S: FrameSource>(
    source: &mut S,
    timestamp: f64,
    duration: f64,
    staging: &Path,
) -> Result<FrameRecord, FrameshiftError> {
    let image = source.extract_at(timestamp)?;

    let staged = staging.join(format!("frame_{}.jpg", filename_timestamp(timestamp)));
    image.save_with_format(&staged, ImageFormat::Jpeg)?;

    FrameRecord::from_staged(timestamp, duration, image, &staged)
}
