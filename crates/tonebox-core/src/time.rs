//! Millisecond timestamps and the clock collaborator.
//!
//! Timestamps are fixed-width `u32` milliseconds that wrap after roughly 49.7
//! days. Every comparison goes through [`elapsed_ms`] or [`is_after`], which
//! use wrapping arithmetic so a rollover never stalls an envelope or the
//! silence detector.

use core::cell::Cell;

/// A point in time in milliseconds, as returned by [`Clock::now_ms`].
pub type Millis = u32;

/// Milliseconds from `since` to `now`, tolerant of counter wraparound.
#[inline]
pub fn elapsed_ms(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Returns true if `now` is strictly later than `then`.
///
/// Valid as long as the two timestamps are less than half the counter range
/// (about 24 days) apart.
#[inline]
pub fn is_after(now: Millis, then: Millis) -> bool {
    (now.wrapping_sub(then) as i32) > 0
}

/// Source of time and cooperative scheduling for the engine.
///
/// `now_ms` must be monotonic (modulo wraparound). `yield_now` is called by
/// the blocking helpers between iterations; it should hand control to the
/// surrounding scheduler or sleep very briefly, and must return.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> Millis;

    /// Give other work a chance to run.
    fn yield_now(&self) {}
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }

    fn yield_now(&self) {
        (**self).yield_now();
    }
}

/// A clock that only moves when told to.
///
/// Used for deterministic tests and for driving envelopes from an external
/// time base. With a non-zero yield step, every [`Clock::yield_now`] call
/// advances the clock, which lets [`Sound::delay`](crate::Sound::delay) and
/// [`Sound::wait_for_silence`](crate::Sound::wait_for_silence) terminate.
///
/// # Example
///
/// ```rust
/// use tonebox_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100);
/// clock.advance(25);
/// assert_eq!(clock.now_ms(), 125);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
    yield_step: Cell<u32>,
}

impl ManualClock {
    /// Create a clock reading `start` milliseconds that does not advance on yield.
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
            yield_step: Cell::new(0),
        }
    }

    /// Advance by `step_ms` on every `yield_now`.
    pub fn with_yield_step(self, step_ms: u32) -> Self {
        self.yield_step.set(step_ms);
        self
    }

    /// Set the absolute time.
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    /// Move the clock forward, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Change the per-yield step.
    pub fn set_yield_step(&self, step_ms: u32) {
        self.yield_step.set(step_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }

    fn yield_now(&self) {
        self.advance(self.yield_step.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_across_wraparound() {
        let before = u32::MAX - 4;
        let after = 5;
        assert_eq!(elapsed_ms(after, before), 10);
    }

    #[test]
    fn is_after_is_strict() {
        assert!(is_after(11, 10));
        assert!(!is_after(10, 10));
        assert!(!is_after(9, 10));
    }

    #[test]
    fn is_after_across_wraparound() {
        assert!(is_after(3, u32::MAX - 3));
        assert!(!is_after(u32::MAX - 3, 3));
    }

    #[test]
    fn manual_clock_yield_step() {
        let clock = ManualClock::new(0).with_yield_step(2);
        clock.yield_now();
        clock.yield_now();
        assert_eq!(clock.now_ms(), 4);

        clock.set_yield_step(0);
        clock.yield_now();
        assert_eq!(clock.now_ms(), 4);
    }

    #[test]
    fn clock_by_reference() {
        let clock = ManualClock::new(7);
        let by_ref = &clock;
        assert_eq!(by_ref.now_ms(), 7);
    }
}
