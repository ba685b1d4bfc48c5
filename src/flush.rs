//! # Flush Policy
//!
//! After every processing pass the engine asks the policy whether the capture buffer
//! must be cleared. The buffer is either *accumulating* or, for the instant between
//! the decision and the reset, *flushed*; the policy only has to decide the transition.
//!
//! The buffer is cleared when
//!
//! * it is saturated, whatever else happened in the pass, or
//! * the pass found bytes but no enabled grammar matched them. With
//!   [`FlushPolicy::IdleAware`] this additionally requires the receiver to have been
//!   quiet for a while, so that a sentence which is still streaming in is not cut.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When an unproductive buffer is cleared.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Clear as soon as a pass matches nothing.
    Immediate,

    /// Clear when a pass matches nothing and no byte has arrived for `min_idle`.
    IdleAware { min_idle: Duration },
}

/// What a processing pass observed, as far as flushing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// The buffer cursor is at `capacity - 1`.
    pub saturated: bool,
    /// The buffer held at least one byte when the pass ran.
    pub had_data: bool,
    /// At least one enabled sentence type was decoded.
    pub decoded_any: bool,
    /// Time since the last byte arrived (or the last reset).
    pub idle: Duration,
}

/// Why the buffer was cleared.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The buffer could not take another byte.
    Saturated,
    /// Nothing in the buffer matched any grammar.
    NothingMatched,
}

/// The outcome of [`FlushPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushDecision {
    /// Keep accumulating.
    Keep,
    /// Zero the buffer and rewind its cursor.
    Clear(FlushReason),
}

impl FlushPolicy {
    /// Decides whether the buffer must be cleared after a pass.
    ///
    /// ```rust
    /// use nmea0183_capture::flush::{FlushDecision, FlushPolicy, FlushReason, PassSummary};
    /// use std::time::Duration;
    ///
    /// let policy = FlushPolicy::IdleAware { min_idle: Duration::from_millis(50) };
    /// let pass = PassSummary {
    ///     saturated: false,
    ///     had_data: true,
    ///     decoded_any: false,
    ///     idle: Duration::from_millis(10),
    /// };
    ///
    /// // Probably a sentence still arriving.
    /// assert_eq!(policy.decide(&pass), FlushDecision::Keep);
    ///
    /// let pass = PassSummary { idle: Duration::from_millis(80), ..pass };
    /// assert_eq!(policy.decide(&pass), FlushDecision::Clear(FlushReason::NothingMatched));
    /// ```
    pub fn decide(&self, pass: &PassSummary) -> FlushDecision {
        if pass.saturated {
            return FlushDecision::Clear(FlushReason::Saturated);
        }

        if !pass.had_data || pass.decoded_any {
            return FlushDecision::Keep;
        }

        let quiet = match self {
            FlushPolicy::Immediate => true,
            FlushPolicy::IdleAware { min_idle } => pass.idle >= *min_idle,
        };

        if quiet {
            FlushDecision::Clear(FlushReason::NothingMatched)
        } else {
            FlushDecision::Keep
        }
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        FlushPolicy::IdleAware {
            min_idle: Duration::from_millis(50),
        }
    }
}
