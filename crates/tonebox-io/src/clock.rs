//! Wall-clock and frame-counting time sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tonebox_core::{Clock, Millis, SAMPLE_RATE};

/// Monotonic wall clock measured from its creation.
///
/// `yield_now` sleeps for a short interval so the blocking engine helpers do
/// not spin a core at 100%. The interval should stay well below one chunk
/// duration (about 5.3 ms) or the output ring may drain between ticks.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    yield_interval: Duration,
}

impl SystemClock {
    /// Default sleep per [`Clock::yield_now`].
    pub const DEFAULT_YIELD: Duration = Duration::from_millis(1);

    /// Start a clock at 0 ms.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            yield_interval: Self::DEFAULT_YIELD,
        }
    }

    /// Use a different sleep per yield. `Duration::ZERO` yields the thread instead.
    pub fn with_yield_interval(mut self, interval: Duration) -> Self {
        self.yield_interval = interval;
        self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        // Truncation wraps like a hardware millisecond counter
        self.origin.elapsed().as_millis() as Millis
    }

    fn yield_now(&self) {
        if self.yield_interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.yield_interval);
        }
    }
}

/// Clock derived from the number of frames a sink has accepted.
///
/// Time only advances when audio is consumed, so an engine paired with a
/// file sink renders as fast as the CPU allows while envelopes see exactly
/// the timeline a listener would hear.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameClock {
    /// Clock reading `frames` at the engine's [`SAMPLE_RATE`].
    pub fn new(frames: Arc<AtomicU64>) -> Self {
        Self::with_sample_rate(frames, SAMPLE_RATE)
    }

    /// Clock reading `frames` at an arbitrary rate (clamped to at least 1 Hz).
    pub fn with_sample_rate(frames: Arc<AtomicU64>, sample_rate: u32) -> Self {
        Self {
            frames,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Frames counted so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl Clock for FrameClock {
    fn now_ms(&self) -> Millis {
        (self.frames() * 1000 / u64::from(self.sample_rate)) as Millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new().with_yield_interval(Duration::from_millis(2));
        let a = clock.now_ms();
        clock.yield_now();
        let b = clock.now_ms();
        assert!(b >= a + 1, "expected time to pass: {a} -> {b}");
    }

    #[test]
    fn frame_clock_follows_counter() {
        let counter = Arc::new(AtomicU64::new(0));
        let clock = FrameClock::new(Arc::clone(&counter));
        assert_eq!(clock.now_ms(), 0);

        counter.fetch_add(48_000, Ordering::Relaxed);
        assert_eq!(clock.now_ms(), 1000);

        counter.fetch_add(47, Ordering::Relaxed);
        assert_eq!(clock.now_ms(), 1000);
        counter.fetch_add(1, Ordering::Relaxed);
        assert_eq!(clock.now_ms(), 1001);
    }

    #[test]
    fn frame_clock_custom_rate() {
        let counter = Arc::new(AtomicU64::new(44_100));
        let clock = FrameClock::with_sample_rate(counter, 44_100);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(clock.frames(), 44_100);
    }
}
