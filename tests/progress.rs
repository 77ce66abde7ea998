//! Progress channel and cancellation token behaviour.

use frameshift::{CancellationToken, ProgressSender};

// ── ProgressSender ─────────────────────────────────────────────────

#[test]
fn fractions_never_move_backwards() {
    let (mut sender, receiver) = ProgressSender::channel();
    sender.send(0.2, "a");
    sender.send(0.6, "b");
    sender.send(0.4, "regression");
    sender.send(0.9, "c");

    let fractions: Vec<f64> = receiver.try_iter().map(|u| u.fraction).collect();
    assert_eq!(fractions, vec![0.2, 0.6, 0.6, 0.9]);
}

#[test]
fn fractions_are_clamped_to_the_unit_interval() {
    let (mut sender, receiver) = ProgressSender::channel();
    sender.send(-0.5, "low");
    sender.send(1.7, "high");
    sender.send(f64::NAN, "nan");

    let fractions: Vec<f64> = receiver.try_iter().map(|u| u.fraction).collect();
    assert_eq!(fractions, vec![0.0, 1.0, 1.0]);
}

#[test]
fn completion_is_emitted_once() {
    let (mut sender, receiver) = ProgressSender::channel();
    sender.send(0.5, "half");
    sender.complete("done");
    sender.complete("done again");

    let updates: Vec<_> = receiver.try_iter().collect();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].fraction, 1.0);
    assert_eq!(updates[1].phase, "done");
}

#[test]
fn a_dropped_receiver_does_not_break_the_sender() {
    let (mut sender, receiver) = ProgressSender::channel();
    drop(receiver);
    sender.send(0.5, "nobody listening");
    sender.complete("still fine");
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn token_defaults_to_not_cancelled() {
    assert!(!CancellationToken::new().is_cancelled());
    assert!(!CancellationToken::default().is_cancelled());
}

#[test]
fn cancel_is_observed_by_all_clones() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancel_is_observed_across_threads() {
    let token = CancellationToken::new();
    let clone = token.clone();

    let handle = std::thread::spawn(move || {
        clone.cancel();
    });
    handle.join().expect("thread");
    assert!(token.is_cancelled());
}
