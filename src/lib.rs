//! # frameshift
//!
//! Adaptive still-frame sampling and timestamp-refinement engine for video
//! files.
//!
//! `frameshift` takes a video and turns it into an ordered set of extracted
//! still frames: it decides *how many* frames to sample and *at which
//! timestamps* based on the video's duration, drives the extraction while
//! tolerating per-frame failures, and supports interactively nudging any
//! single frame's timestamp at several granularities without disturbing the
//! rest of the set. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, behind a
//! [`FrameSource`] seam that tests (and embedders) can substitute.
//!
//! ## Quick Start
//!
//! ### Extract a frame set
//!
//! ```no_run
//! use frameshift::{ExtractionSession, FfmpegFrameSource, SessionOptions};
//!
//! let mut source = FfmpegFrameSource::open("input.mp4")?;
//! let session = ExtractionSession::run(&mut source, 0.0, SessionOptions::new())?;
//!
//! for frame in session.records() {
//!     println!("frame at {}", frame.display_timestamp());
//! }
//! # Ok::<(), frameshift::FrameshiftError>(())
//! ```
//!
//! ### Watch progress, cancel mid-run
//!
//! ```no_run
//! use frameshift::{
//!     CancellationToken, ExtractionSession, FfmpegFrameSource, ProgressSender, SessionOptions,
//! };
//!
//! let (sender, receiver) = ProgressSender::channel();
//! let token = CancellationToken::new();
//!
//! let options = SessionOptions::new()
//!     .with_progress(sender)
//!     .with_cancellation(token.clone());
//!
//! std::thread::spawn(move || {
//!     for update in receiver {
//!         println!("{:>5.1}% {}", update.fraction * 100.0, update.phase);
//!     }
//! });
//!
//! let mut source = FfmpegFrameSource::open("input.mp4")?;
//! let session = ExtractionSession::run(&mut source, 0.0, options)?;
//! # Ok::<(), frameshift::FrameshiftError>(())
//! ```
//!
//! ### Nudge a frame, then export
//!
//! ```no_run
//! use frameshift::{
//!     ExportFormat, ExtractionSession, FfmpegFrameSource, RefineStep,
//!     RefinementController, SessionOptions, export,
//! };
//!
//! let mut source = FfmpegFrameSource::open("input.mp4")?;
//! let mut session = ExtractionSession::run(&mut source, 0.0, SessionOptions::new())?;
//!
//! let id = session.records()[3].id();
//! let mut refinement = RefinementController::for_frame(&session, id).unwrap();
//!
//! // Half a second earlier, then one 30fps frame forward.
//! refinement.refine_with(&mut source, -RefineStep::Coarse.seconds())?;
//! refinement.refine_with(&mut source, RefineStep::Fine.seconds())?;
//! refinement.accept_into(&mut session);
//!
//! export::write_frames(session.records_mut(), "stills/".as_ref(), ExportFormat::Png)?;
//! # Ok::<(), frameshift::FrameshiftError>(())
//! ```
//!
//! ## How sampling adapts
//!
//! | Duration | Interval |
//! |----------|----------|
//! | under 30 s | 1.0 s — short clips stay granular |
//! | 30 s – 5 min | `duration / 30`, rounded to 0.1 s, floored at 0.33 s |
//! | over 5 min | `duration / 40`, same rounding and floor |
//!
//! The planner is pure and deterministic: identical inputs always produce
//! the identical plan (see [`SamplingPolicy`]).
//!
//! ## Failure policy
//!
//! A frame that fails to extract is counted and skipped — one bad seek never
//! aborts a batch. A session only fails as a whole when the duration probe
//! fails, it is cancelled, or *zero* frames could be extracted. The same
//! shape applies to batch export: failed writes are counted, the rest
//! proceed.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system for the
//! bundled [`FfmpegFrameSource`]. Everything else in the crate runs against
//! any [`FrameSource`] implementation.

pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod frame;
pub mod plan;
pub mod progress;
pub mod refine;
pub mod session;
pub mod source;

pub use error::FrameshiftError;
pub use export::{ExportFormat, ExportReport};
pub use ffmpeg::FfmpegFrameSource;
pub use frame::{FrameId, FrameRecord, format_timestamp};
pub use plan::{SamplingPolicy, plan_timestamps};
pub use progress::{CancellationToken, ProgressSender, ProgressUpdate};
pub use refine::{RefinePhase, RefineStep, RefinementController, RefinementTicket};
pub use session::{ExtractionSession, SessionOptions, SessionStats};
pub use source::FrameSource;
