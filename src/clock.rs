//! # Ticks and collaborators
//!
//! The engine never reads a clock or touches a serial peripheral on its own. Time
//! comes in as a [`Timestamp`] (a millisecond tick, the way a HAL tick counter reports
//! it), either handed to [`Engine::process`] directly or pulled from a [`Clock`] by
//! the byte intake. Re-arming the receiver after each byte and after each pass is
//! delegated to a [`Rearm`] implementation.
//!
//! [`Engine::process`]: crate::Engine::process

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A millisecond tick.
///
/// Ticks are only ever compared with each other; the epoch is whatever the
/// time source counts from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Tick zero.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Creates a timestamp from a millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// Returns the millisecond count.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    ///
    /// ```rust
    /// use nmea0183_capture::Timestamp;
    /// use std::time::Duration;
    ///
    /// let a = Timestamp::from_millis(1_000);
    /// let b = Timestamp::from_millis(1_250);
    /// assert_eq!(b.saturating_duration_since(a), Duration::from_millis(250));
    /// assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    /// ```
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Returns the tick `duration` after `self`, saturating at the maximum tick.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }
}

/// Source of the current tick.
pub trait Clock {
    /// Returns the current tick.
    fn now(&self) -> Timestamp;
}

impl<F> Clock for F
where
    F: Fn() -> Timestamp,
{
    fn now(&self) -> Timestamp {
        self()
    }
}

/// Monotonic clock counting milliseconds since it was created.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        InstantClock {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        InstantClock::new()
    }
}

impl Clock for InstantClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX))
    }
}

/// A clock driven from outside, for hosts whose tick counter lives elsewhere
/// (a SysTick handler, a simulation loop, a test).
///
/// Clones share the same tick.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            millis: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::Release);
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(millis))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::Acquire))
    }
}

/// Re-arms the receiver so it delivers the next byte.
///
/// Called at the end of every [`ByteIntake::on_byte_received`] and every
/// [`Engine::process`].
///
/// [`ByteIntake::on_byte_received`]: crate::ByteIntake::on_byte_received
/// [`Engine::process`]: crate::Engine::process
pub trait Rearm {
    fn request_next_byte(&self);
}

/// No re-arming needed (the receiver free-runs).
impl Rearm for () {
    fn request_next_byte(&self) {}
}

impl<F> Rearm for F
where
    F: Fn(),
{
    fn request_next_byte(&self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(Timestamp::from_millis(10));
        let other = clock.clone();

        clock.advance(Duration::from_millis(40));
        assert_eq!(other.now(), Timestamp::from_millis(50));

        other.set(Timestamp::from_millis(5));
        assert_eq!(clock.now(), Timestamp::from_millis(5));
    }

    #[test]
    fn test_closure_clock_and_rearm() {
        let clock = || Timestamp::from_millis(7);
        assert_eq!(Clock::now(&clock), Timestamp::from_millis(7));

        let calls = std::cell::Cell::new(0);
        let rearm = || calls.set(calls.get() + 1);
        rearm.request_next_byte();
        rearm.request_next_byte();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_saturating_add() {
        let t = Timestamp::from_millis(u64::MAX - 1);
        assert_eq!(
            t.saturating_add(Duration::from_millis(10)),
            Timestamp::from_millis(u64::MAX)
        );
    }
}
