//! Refinement state-machine tests.

mod common;

use common::SyntheticSource;
use frameshift::{
    ExtractionSession, FrameRecord, FrameshiftError, RefinePhase, RefineStep,
    RefinementController, SessionOptions,
};

fn session_of(duration: f64) -> (SyntheticSource, ExtractionSession) {
    let mut source = SyntheticSource::new(duration);
    let session = ExtractionSession::run(&mut source, 0.0, SessionOptions::new())
        .expect("session should succeed");
    source.requested.clear();
    (source, session)
}

fn controller_at(session: &ExtractionSession, timestamp: f64) -> RefinementController {
    let id = session
        .records()
        .iter()
        .find(|record| record.timestamp() == timestamp)
        .expect("frame at timestamp")
        .id();
    RefinementController::for_frame(session, id).expect("id is in session")
}

#[test]
fn step_sizes_match_the_four_granularities() {
    assert!((RefineStep::Fine.seconds() - 1.0 / 30.0).abs() < 1e-12);
    assert_eq!(RefineStep::Coarse.seconds(), 0.5);
    assert_eq!(RefineStep::Medium.seconds(), 2.0);
    assert_eq!(RefineStep::Large.seconds(), 10.0);
}

#[test]
fn adjustment_clamps_to_zero_never_negative() {
    let (_, session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);

    let ticket = controller
        .begin_adjust(-10.0)
        .expect("not busy")
        .expect("clamped but not a no-op");
    assert_eq!(ticket.target(), 0.0);
}

#[test]
fn adjustment_clamps_to_duration_at_the_far_end() {
    let (_, session) = session_of(15.0);
    let mut controller = controller_at(&session, 14.0);

    let ticket = controller
        .begin_adjust(RefineStep::Large.seconds())
        .expect("not busy")
        .expect("clamped but not a no-op");
    assert_eq!(ticket.target(), 15.0);
}

#[test]
fn fully_clamped_adjustment_is_a_no_op() {
    let (_, session) = session_of(15.0);
    let mut controller = controller_at(&session, 0.0);

    let outcome = controller.begin_adjust(-0.5).expect("not busy");
    assert!(outcome.is_none(), "already at 0, nothing to do");
    assert_eq!(*controller.phase(), RefinePhase::Idle);
}

#[test]
fn concurrent_adjustments_are_rejected_not_queued() {
    let (_, session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);

    let ticket = controller
        .begin_adjust(2.0)
        .expect("not busy")
        .expect("real adjustment");
    assert!(controller.in_progress());

    let second = controller.begin_adjust(-1.0);
    assert!(matches!(second, Err(FrameshiftError::RefinementBusy)));
    assert_eq!(
        *controller.phase(),
        RefinePhase::Refining { target: 7.0 },
        "rejected request must not alter the in-flight target",
    );

    // The original request still completes normally.
    let record = FrameRecord::in_memory(
        ticket.target(),
        session.duration(),
        SyntheticSource::frame_for(ticket.target()),
    );
    assert!(controller.complete(ticket, Ok(record)));
    assert_eq!(*controller.phase(), RefinePhase::Refined);
    assert_eq!(controller.displayed_timestamp(), 7.0);
}

#[test]
fn adjustments_compose_relative_to_the_displayed_timestamp() {
    let (mut source, session) = session_of(30.0);
    let mut controller = controller_at(&session, 5.0);

    assert!(controller.refine_with(&mut source, 2.0).expect("refines"));
    assert_eq!(controller.displayed_timestamp(), 7.0);

    assert!(controller.refine_with(&mut source, 0.5).expect("refines"));
    assert_eq!(controller.displayed_timestamp(), 7.5);

    assert!(controller.refine_with(&mut source, -RefineStep::Fine.seconds()).expect("refines"));
    assert!((controller.displayed_timestamp() - (7.5 - 1.0 / 30.0)).abs() < 1e-9);
}

#[test]
fn failed_refinement_reverts_to_the_last_good_frame() {
    let (mut source, session) = session_of(30.0);
    let mut controller = controller_at(&session, 5.0);

    assert!(controller.refine_with(&mut source, 1.0).expect("refines"));
    assert_eq!(controller.displayed_timestamp(), 6.0);

    source = SyntheticSource::new(30.0).failing_at(&[8.0]);
    let result = controller.refine_with(&mut source, 2.0);
    assert!(matches!(
        result,
        Err(FrameshiftError::RefinementFailed { .. })
    ));

    // Display reverted to the previous refinement, not the base.
    assert_eq!(controller.displayed_timestamp(), 6.0);
    assert!(matches!(controller.phase(), RefinePhase::Failed { .. }));

    // And the controller accepts new adjustments again.
    assert!(!controller.in_progress());
    assert!(controller.refine_with(&mut source, 1.0).expect("refines"));
    assert_eq!(controller.displayed_timestamp(), 7.0);
}

#[test]
fn stale_results_are_discarded_after_reset() {
    let (_, session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);

    let ticket = controller
        .begin_adjust(2.0)
        .expect("not busy")
        .expect("real adjustment");

    // User navigates away while the extraction is in flight.
    let other_id = session.records()[0].id();
    assert!(controller.reset(&session, other_id));

    let late = FrameRecord::in_memory(7.0, 15.0, SyntheticSource::frame_for(7.0));
    assert!(
        !controller.complete(ticket, Ok(late)),
        "late result for a superseded request must be dropped",
    );
    assert_eq!(*controller.phase(), RefinePhase::Idle);
    assert_eq!(controller.displayed_timestamp(), 0.0);
}

#[test]
fn accept_replaces_the_record_in_the_session() {
    let (mut source, mut session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);
    let base_id = controller.base_id();
    let base_path = session
        .get(base_id)
        .unwrap()
        .full_image_path()
        .unwrap()
        .to_path_buf();

    assert!(controller.refine_with(&mut source, 0.5).expect("refines"));
    assert!(controller.accept_into(&mut session));

    // Same position, new record.
    let replaced = &session.records()[5];
    assert_eq!(replaced.timestamp(), 5.5);
    assert_ne!(replaced.id(), base_id);
    assert!(session.get(base_id).is_none());

    // The superseded record's backing file is gone.
    assert!(!base_path.exists());

    // Controller re-anchored on the accepted record.
    assert_eq!(*controller.phase(), RefinePhase::Idle);
    assert_eq!(controller.base_id(), replaced.id());
    assert_eq!(controller.displayed_timestamp(), 5.5);
    assert!(controller.refined().is_none());
}

#[test]
fn accept_without_a_refinement_does_nothing() {
    let (_, mut session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);
    assert!(!controller.accept_into(&mut session));
    assert_eq!(session.len(), 15);
}

#[test]
fn reset_clears_refinement_state_unconditionally() {
    let (mut source, session) = session_of(15.0);
    let mut controller = controller_at(&session, 5.0);

    assert!(controller.refine_with(&mut source, 1.0).expect("refines"));
    assert!(controller.refined().is_some());

    let other_id = session.records()[9].id();
    assert!(controller.reset(&session, other_id));
    assert!(controller.refined().is_none());
    assert_eq!(*controller.phase(), RefinePhase::Idle);
    assert_eq!(controller.displayed_timestamp(), 9.0);
}

#[test]
fn controller_requires_a_live_anchor() {
    let (_, session) = session_of(5.0);
    let (_, other_session) = session_of(5.0);
    let foreign_id = other_session.records()[0].id();
    assert!(RefinementController::for_frame(&session, foreign_id).is_none());
}
