//! Interactive timestamp refinement.
//!
//! A [`RefinementController`] lets the user nudge one extracted frame's
//! timestamp forward or backward at several granularities, re-extracting on
//! demand, without touching the session's collection until the result is
//! explicitly accepted.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle ──begin_adjust──▶ Refining ──complete(Ok)──▶ Refined
//!                           │
//!                           └──complete(Err)──▶ Failed (display reverts)
//! ```
//!
//! While `Refining`, further adjustments are rejected outright — never
//! queued — so the displayed frame always matches the last *accepted*
//! request. Adjustments compose: each one is relative to the currently
//! displayed timestamp (the refined one if present, else the base).
//!
//! Completion is ticket-based. [`begin_adjust`](RefinementController::begin_adjust)
//! hands out a [`RefinementTicket`]; a result delivered with a stale ticket
//! (the controller was reset or re-anchored in the meantime) is dropped on
//! the floor, which is what keeps a late extraction from clobbering current
//! state. Callers that simply block on the source can use
//! [`refine_with`](RefinementController::refine_with) and ignore tickets.

use crate::{
    error::FrameshiftError,
    frame::{FrameId, FrameRecord, clamp_timestamp},
    session::ExtractionSession,
    source::FrameSource,
};

/// Nudge granularities, symmetric forward/backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStep {
    /// One video frame at an assumed 30 fps (~0.033 s).
    Fine,
    /// Half a second.
    Coarse,
    /// Two seconds.
    Medium,
    /// Ten seconds.
    Large,
}

impl RefineStep {
    /// The step size in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            RefineStep::Fine => 1.0 / 30.0,
            RefineStep::Coarse => 0.5,
            RefineStep::Medium => 2.0,
            RefineStep::Large => 10.0,
        }
    }
}

/// The controller's current phase.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinePhase {
    /// Showing the base frame, or an accepted chain of refinements.
    Idle,
    /// An adjustment is in flight; further adjustments are rejected.
    Refining {
        /// The timestamp the in-flight extraction targets.
        target: f64,
    },
    /// The last refinement succeeded and is being displayed.
    Refined,
    /// The last refinement failed; the display reverted to the last good
    /// frame. The reason is suitable for a transient notification.
    Failed {
        /// Why the re-extraction failed.
        reason: String,
    },
}

/// Proof that a completion corresponds to the adjustment that is actually in
/// flight. Tickets from before a reset or re-anchor no longer match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementTicket {
    generation: u64,
    target: f64,
}

impl RefinementTicket {
    /// The timestamp this ticket's extraction targets.
    pub fn target(&self) -> f64 {
        self.target
    }
}

/// State machine for nudging a single frame's timestamp.
///
/// Anchored on one record of an [`ExtractionSession`] (by id and timestamp —
/// the record itself stays in the session). Holds at most one refined
/// replacement record, which replaces the anchor only on
/// [`accept_into`](RefinementController::accept_into).
#[derive(Debug)]
pub struct RefinementController {
    base_id: FrameId,
    base_timestamp: f64,
    duration: f64,
    refined: Option<FrameRecord>,
    phase: RefinePhase,
    generation: u64,
}

impl RefinementController {
    /// Anchor a controller on a session record.
    ///
    /// Returns `None` when the id is not in the session (stale preview).
    pub fn for_frame(session: &ExtractionSession, id: FrameId) -> Option<Self> {
        let record = session.get(id)?;
        Some(Self {
            base_id: id,
            base_timestamp: record.timestamp(),
            duration: session.duration(),
            refined: None,
            phase: RefinePhase::Idle,
            generation: 0,
        })
    }

    /// The anchored record's id.
    pub fn base_id(&self) -> FrameId {
        self.base_id
    }

    /// The current phase.
    pub fn phase(&self) -> &RefinePhase {
        &self.phase
    }

    /// Whether an adjustment is in flight.
    pub fn in_progress(&self) -> bool {
        matches!(self.phase, RefinePhase::Refining { .. })
    }

    /// The refined replacement record, if the last refinement succeeded.
    pub fn refined(&self) -> Option<&FrameRecord> {
        self.refined.as_ref()
    }

    /// The timestamp currently on display: the refined one if present, else
    /// the base.
    pub fn displayed_timestamp(&self) -> f64 {
        self.refined
            .as_ref()
            .map_or(self.base_timestamp, FrameRecord::timestamp)
    }

    /// Start an adjustment of `delta` seconds relative to the displayed
    /// timestamp.
    ///
    /// The target is clamped into `[0, duration]`. Returns `Ok(None)` when
    /// clamping makes the adjustment a no-op (already at the boundary) — no
    /// transition happens and no extraction should be issued.
    ///
    /// # Errors
    ///
    /// Returns [`FrameshiftError::RefinementBusy`] while an adjustment is
    /// already in flight; the request is rejected, not queued, and the
    /// in-flight target is unchanged.
    pub fn begin_adjust(
        &mut self,
        delta: f64,
    ) -> Result<Option<RefinementTicket>, FrameshiftError> {
        if self.in_progress() {
            return Err(FrameshiftError::RefinementBusy);
        }

        let current = self.displayed_timestamp();
        let target = clamp_timestamp(current + delta, self.duration);
        if target == current {
            log::debug!("refinement no-op at {current:.3}s (delta {delta:+.3}s clamped)");
            return Ok(None);
        }

        self.generation += 1;
        self.phase = RefinePhase::Refining { target };
        Ok(Some(RefinementTicket {
            generation: self.generation,
            target,
        }))
    }

    /// Start an adjustment by a named step in the given direction
    /// (`forward = false` nudges backward).
    pub fn begin_step(
        &mut self,
        step: RefineStep,
        forward: bool,
    ) -> Result<Option<RefinementTicket>, FrameshiftError> {
        let delta = if forward {
            step.seconds()
        } else {
            -step.seconds()
        };
        self.begin_adjust(delta)
    }

    /// Deliver the outcome of the extraction issued for `ticket`.
    ///
    /// A stale ticket (reset or re-anchor happened since `begin_adjust`) is
    /// discarded: the record, if any, is dropped — removing its backing file
    /// — and the current state is untouched. Returns `true` when the outcome
    /// was applied.
    ///
    /// On success the replacement becomes the displayed frame
    /// (`Refined`); on failure the display reverts to the last good frame
    /// and the reason is kept in [`RefinePhase::Failed`].
    pub fn complete(
        &mut self,
        ticket: RefinementTicket,
        outcome: Result<FrameRecord, FrameshiftError>,
    ) -> bool {
        let live = matches!(self.phase, RefinePhase::Refining { .. })
            && ticket.generation == self.generation;
        if !live {
            log::debug!("discarding stale refinement result for {:.3}s", ticket.target);
            return false;
        }

        match outcome {
            Ok(record) => {
                self.refined = Some(record);
                self.phase = RefinePhase::Refined;
            }
            Err(error) => {
                log::warn!("refinement at {:.3}s failed: {error}", ticket.target);
                // `refined` keeps the previous good replacement, so the
                // display falls back to it (or to the base).
                self.phase = RefinePhase::Failed {
                    reason: error.to_string(),
                };
            }
        }
        true
    }

    /// Synchronous convenience: begin an adjustment, drive `source`, and
    /// complete with the result.
    ///
    /// Returns `Ok(true)` when a new frame is on display, `Ok(false)` for a
    /// clamped no-op.
    ///
    /// # Errors
    ///
    /// [`FrameshiftError::RefinementBusy`] if an adjustment is in flight, or
    /// [`FrameshiftError::RefinementFailed`] when the re-extraction fails
    /// (the display has already reverted).
    pub fn refine_with<S: FrameSource>(
        &mut self,
        source: &mut S,
        delta: f64,
    ) -> Result<bool, FrameshiftError> {
        let Some(ticket) = self.begin_adjust(delta)? else {
            return Ok(false);
        };
        let target = ticket.target();

        let outcome = source
            .extract_at(target)
            .and_then(|image| FrameRecord::from_image(target, self.duration, image));

        match outcome {
            Ok(record) => {
                self.complete(ticket, Ok(record));
                Ok(true)
            }
            Err(error) => {
                let reason = error.to_string();
                self.complete(ticket, Err(error));
                Err(FrameshiftError::RefinementFailed {
                    timestamp: target,
                    reason,
                })
            }
        }
    }

    /// Accept the refined frame: it replaces the anchored record at its
    /// position in `session`, and the controller re-anchors `Idle` on it.
    ///
    /// Returns `false` (and changes nothing) when there is nothing refined
    /// to accept, an adjustment is still in flight, or the anchor is no
    /// longer in the session.
    pub fn accept_into(&mut self, session: &mut ExtractionSession) -> bool {
        if self.in_progress() {
            return false;
        }
        let Some(replacement) = self.refined.take() else {
            return false;
        };

        let new_id = replacement.id();
        let new_timestamp = replacement.timestamp();
        match session.replace(self.base_id, replacement) {
            Ok(superseded) => {
                log::debug!(
                    "accepted refinement: {:.3}s replaces {:.3}s",
                    new_timestamp,
                    superseded.timestamp(),
                );
                drop(superseded);
                self.base_id = new_id;
                self.base_timestamp = new_timestamp;
                self.refined = None;
                self.phase = RefinePhase::Idle;
                self.generation += 1;
                true
            }
            Err(replacement) => {
                // Anchor vanished (session superseded); keep showing the
                // refinement rather than silently losing it.
                self.refined = Some(replacement);
                false
            }
        }
    }

    /// Re-anchor on a different record, unconditionally clearing any refined
    /// frame and failure state. Called when the user navigates to another
    /// frame, closes the preview, or the session resets.
    pub fn reset(&mut self, session: &ExtractionSession, id: FrameId) -> bool {
        let Some(record) = session.get(id) else {
            return false;
        };
        self.base_id = id;
        self.base_timestamp = record.timestamp();
        self.duration = session.duration();
        self.refined = None;
        self.phase = RefinePhase::Idle;
        self.generation += 1;
        true
    }
}
