//! Adaptive timestamp planning.
//!
//! This module decides how many frames to sample from a video and at which
//! timestamps, given only the video's duration and a start offset. It is pure
//! math: no I/O, no randomness, no clock — identical inputs always produce
//! identical plans, which keeps "shift all frames" re-runs explainable and
//! tests reproducible.
//!
//! The policy is tiered. Short clips get per-second granularity; medium
//! videos target ~30 frames; long videos are capped near 40 frames so a
//! two-hour file never explodes into hundreds of extractions.
//!
//! # Example
//!
//! ```
//! use frameshift::SamplingPolicy;
//!
//! let policy = SamplingPolicy::default();
//! assert_eq!(policy.interval_for(15.0), 1.0);
//! assert_eq!(policy.interval_for(120.0), 4.0);
//!
//! let plan = policy.plan(120.0, 0.0);
//! assert_eq!(plan.len(), 30);
//! assert_eq!(plan[1], 4.0);
//! ```

/// Tiered sampling policy mapping a video duration to an extraction interval.
///
/// The defaults reproduce the shipped behaviour: ~30 frames for a typical
/// video, at most ~40 for long ones, never finer than 3 samples per second.
/// The floor is a policy constant, not a physical limit — callers that know
/// their source material may lower it.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct SamplingPolicy {
    /// Frame count aimed for on medium-length videos.
    pub target_frames: f64,
    /// Frame count cap applied to long videos.
    pub max_frames: f64,
    /// Smallest interval the policy will ever produce, in seconds.
    pub min_interval: f64,
    /// Durations below this (seconds) always use a 1-second interval.
    pub short_cutoff: f64,
    /// Durations above this (seconds) switch to the `max_frames` tier.
    pub long_cutoff: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            target_frames: 30.0,
            max_frames: 40.0,
            min_interval: 0.33,
            short_cutoff: 30.0,
            long_cutoff: 300.0,
        }
    }
}

impl SamplingPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the minimum interval floor.
    pub fn with_min_interval(mut self, min_interval: f64) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Compute the sampling interval for a video of the given duration.
    ///
    /// - `duration < short_cutoff`: 1.0 s, so short clips stay granular.
    /// - `short_cutoff ≤ duration ≤ long_cutoff`: `duration / target_frames`,
    ///   rounded to one decimal place for clean timestamps, floored at
    ///   `min_interval`.
    /// - `duration > long_cutoff`: same, but over `max_frames`.
    ///
    /// Total for any finite `duration ≥ 0`.
    pub fn interval_for(&self, duration: f64) -> f64 {
        if duration < self.short_cutoff {
            return 1.0;
        }

        let divisor = if duration <= self.long_cutoff {
            self.target_frames
        } else {
            self.max_frames
        };

        round_to_tenth(duration / divisor).max(self.min_interval)
    }

    /// Compute the full timestamp plan for a video: interval selection plus
    /// [`plan_timestamps`].
    pub fn plan(&self, duration: f64, offset: f64) -> Vec<f64> {
        plan_timestamps(duration, offset, self.interval_for(duration))
    }
}

/// Compute the ordered timestamp sequence `start, start + interval, ...`
/// where `start = max(0, offset)`, stopping strictly before `duration`.
///
/// An empty plan is a valid result (for example when `offset >= duration`,
/// or `duration == 0`) and is the caller's signal for "zero frames", not an
/// error. Timestamps are computed as `start + i * interval` rather than by
/// repeated addition, so long plans do not accumulate float drift.
pub fn plan_timestamps(duration: f64, offset: f64, interval: f64) -> Vec<f64> {
    let start = offset.max(0.0);
    if !(interval > 0.0) || !duration.is_finite() || start >= duration {
        return Vec::new();
    }

    let mut timestamps = Vec::new();
    let mut index = 0u64;
    loop {
        let timestamp = start + index as f64 * interval;
        if timestamp >= duration {
            break;
        }
        timestamps.push(timestamp);
        index += 1;
    }
    timestamps
}

/// Round to one decimal place, away from zero on ties.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
