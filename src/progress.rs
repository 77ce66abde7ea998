//! Progress reporting and cancellation support.
//!
//! Progress is delivered as a stream of [`ProgressUpdate`] events pushed over
//! a channel to a single consumer, rather than through nested callbacks. The
//! sending half is a [`ProgressSender`] that enforces the reporting contract:
//! the completion fraction is monotonically non-decreasing, stays within
//! `[0, 1]`, and 1.0 is emitted exactly once, when a run completes.
//!
//! Cancellation is cooperative: clone a [`CancellationToken`], hand it to the
//! session, and call [`cancel`](CancellationToken::cancel) from any thread.
//! The extraction loop checks the token before each unit of work, so a
//! superseded session stops promptly and never writes late results anywhere.
//!
//! # Example
//!
//! ```
//! use frameshift::ProgressSender;
//!
//! let (mut sender, receiver) = ProgressSender::channel();
//! sender.send(0.5, "Halfway there");
//! sender.send(0.3, "Regressions are clamped"); // still reports 0.5
//!
//! assert_eq!(receiver.recv().unwrap().fraction, 0.5);
//! assert_eq!(receiver.recv().unwrap().fraction, 0.5);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crossbeam_channel::{Receiver, Sender, unbounded};

/// A snapshot of extraction progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Fraction complete in `[0, 1]`, non-decreasing across one run. A
    /// session emits exactly one terminal update at 1.0, on completion.
    pub fraction: f64,
    /// Human-readable description of the current phase.
    pub phase: String,
}

/// The sending half of a progress channel.
///
/// Updates that would move the fraction backwards are clamped to the highest
/// fraction reported so far. Sends to a dropped receiver are silently
/// discarded — a consumer that stopped listening must not break extraction.
#[derive(Debug)]
pub struct ProgressSender {
    tx: Sender<ProgressUpdate>,
    high_water: f64,
    completed: bool,
}

impl ProgressSender {
    /// Create a connected progress channel.
    pub fn channel() -> (ProgressSender, Receiver<ProgressUpdate>) {
        let (tx, rx) = unbounded();
        (
            ProgressSender {
                tx,
                high_water: 0.0,
                completed: false,
            },
            rx,
        )
    }

    /// Report progress. `fraction` is clamped into `[high-water, 1]`.
    pub fn send(&mut self, fraction: f64, phase: impl Into<String>) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            self.high_water
        };
        self.high_water = self.high_water.max(fraction);
        let _ = self.tx.send(ProgressUpdate {
            fraction: self.high_water,
            phase: phase.into(),
        });
    }

    /// Report completion: a single terminal update at exactly 1.0.
    ///
    /// Subsequent calls are ignored so 1.0 is observed at most once.
    pub fn complete(&mut self, phase: impl Into<String>) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.high_water = 1.0;
        let _ = self.tx.send(ProgressUpdate {
            fraction: 1.0,
            phase: phase.into(),
        });
    }
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and share it between threads; cancelling any clone is
/// observed by all of them. Starting a new session over the same video should
/// cancel the previous session's token — that is what guarantees a
/// late-arriving result from the superseded run is discarded instead of
/// landing in current state.
///
/// # Example
///
/// ```
/// use frameshift::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
