//! Timestamp-driven ADSR envelope.
//!
//! The envelope has no stored stage. Its level is a pure function of the
//! voice's start time, optional stop (release) time, and "now", recomputed on
//! every evaluation. A voice can therefore be rendered at any cadence, even an
//! irregular one, without the envelope drifting, and tests can pin the level
//! at any instant by choosing the timestamps.
//!
//! ```text
//!  level
//!   1.0 ┤    /\
//!       │   /  \______________ sustain
//!       │  /                  \
//!   0.0 ┼─/────────────────────\──▶ t
//!       start  +A   +A+D      stop  stop+R
//! ```

use crate::config::{
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN, LATE_STOP_TAIL_MS,
};
use crate::time::{Millis, elapsed_ms, is_after};

/// Result of evaluating an envelope at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeLevel {
    /// Still sounding at the given level in [0, 1].
    Active(f32),
    /// The release has run its full length; the voice should go idle.
    Finished,
}

impl EnvelopeLevel {
    /// Level as a plain fraction, 0.0 once finished.
    pub fn value(self) -> f32 {
        match self {
            EnvelopeLevel::Active(level) => level,
            EnvelopeLevel::Finished => 0.0,
        }
    }
}

/// Attack-decay-sustain-release shape with linear segments.
///
/// ## Parameters
/// - `attack_ms`: Ramp 0 -> 1 after start (default 10)
/// - `decay_ms`: Ramp 1 -> sustain after the attack (default 0)
/// - `sustain`: Level held until release (0.0 to 1.0, default 1.0)
/// - `release_ms`: Ramp sustain -> 0 after the stop time (default 10)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    attack_ms: u32,
    decay_ms: u32,
    sustain: f32,
    release_ms: u32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(
            DEFAULT_ATTACK_MS,
            DEFAULT_DECAY_MS,
            DEFAULT_SUSTAIN,
            DEFAULT_RELEASE_MS,
        )
    }
}

impl Adsr {
    /// Create an envelope. `sustain` is clamped to [0, 1]; NaN becomes 0.
    pub fn new(attack_ms: u32, decay_ms: u32, sustain: f32, release_ms: u32) -> Self {
        let sustain = if sustain.is_nan() {
            0.0
        } else {
            sustain.clamp(0.0, 1.0)
        };
        Self {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        }
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> u32 {
        self.attack_ms
    }

    /// Decay time in milliseconds.
    pub fn decay_ms(&self) -> u32 {
        self.decay_ms
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> u32 {
        self.release_ms
    }

    /// Attack plus decay: the earliest offset from start at which a release may begin.
    pub fn attack_decay_ms(&self) -> u32 {
        self.attack_ms.saturating_add(self.decay_ms)
    }

    /// Attack plus decay plus release: the shortest lifetime that plays the whole shape.
    pub fn full_length_ms(&self) -> u32 {
        self.attack_decay_ms().saturating_add(self.release_ms)
    }

    /// Release start for a stop requested at `now` on a voice started at `start`.
    ///
    /// Never earlier than `start + attack + decay`. If that point has already
    /// passed, the release begins [`LATE_STOP_TAIL_MS`] from now.
    pub fn release_point(&self, start: Millis, now: Millis) -> Millis {
        let earliest = start.wrapping_add(self.attack_decay_ms());
        if is_after(now, earliest) {
            now.wrapping_add(LATE_STOP_TAIL_MS)
        } else {
            earliest
        }
    }

    /// Evaluate the envelope at `now`.
    pub fn evaluate(&self, now: Millis, start: Millis, stop: Option<Millis>) -> EnvelopeLevel {
        let d = elapsed_ms(now, start);

        let mut level = if d < self.attack_ms {
            d as f32 / self.attack_ms as f32
        } else if self.decay_ms > 0 && self.sustain < 1.0 && d < self.attack_decay_ms() {
            let into_decay = (d - self.attack_ms) as f32 / self.decay_ms as f32;
            1.0 - into_decay * (1.0 - self.sustain)
        } else {
            self.sustain
        };

        if let Some(stop) = stop
            && is_after(now, stop)
        {
            let r = elapsed_ms(now, stop);
            if r >= self.release_ms {
                return EnvelopeLevel::Finished;
            }
            level = self.sustain - (r as f32 / self.release_ms as f32) * self.sustain;
        }

        EnvelopeLevel::Active(level)
    }
}
