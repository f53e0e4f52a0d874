//! Chunk-at-a-time waveform generators.
//!
//! Unlike a per-sample oscillator, [`render`] fills a whole buffer from a
//! starting phase and a fixed phase step, so a voice only has to carry its
//! phase between chunks. Periodic waveforms are naive (not band-limited):
//! the target is a small speaker at a modest sample rate, and the shapes
//! are defined by their breakpoints below.

use core::f32::consts::TAU;
use core::fmt;
use core::str::FromStr;
use libm::{floorf, roundf, sinf};

use crate::config::AMPLITUDE_SCALE;

/// Tone generator shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// 50% duty square, high for the first half cycle (inclusive of 0.5).
    Square,
    /// Triangle through (0,0), (0.25,1), (0.75,-1), (1,0).
    Triangle,
    /// Sawtooth through (0,0), (0.5,1), then jumping to -1 and back to 0.
    Sawtooth,
    /// Uniform white noise, independent of phase.
    Noise,
}

impl Waveform {
    /// All waveforms, in declaration order.
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Noise,
    ];

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Noise => "noise",
        }
    }

    /// Whether the output depends on the phase accumulator.
    pub fn is_periodic(self) -> bool {
        !matches!(self, Waveform::Noise)
    }

    /// Unit-amplitude value at normalized phase `t` in [0, 1).
    ///
    /// Returns 0.0 for [`Waveform::Noise`], which has no phase-domain shape.
    #[inline]
    pub fn shape(self, t: f32) -> f32 {
        match self {
            Waveform::Sine => sinf(TAU * t),
            Waveform::Square => {
                if t <= 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if t < 0.25 {
                    t * 4.0
                } else if t < 0.75 {
                    2.0 - t * 4.0
                } else {
                    t * 4.0 - 4.0
                }
            }
            Waveform::Sawtooth => {
                if t < 0.5 {
                    t * 2.0
                } else {
                    t * 2.0 - 2.0
                }
            }
            Waveform::Noise => 0.0,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown waveform name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownWaveform;

impl fmt::Display for UnknownWaveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown waveform (expected sine, square, triangle, sawtooth or noise)")
    }
}

impl FromStr for Waveform {
    type Err = UnknownWaveform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let w = if s.eq_ignore_ascii_case("sine") || s.eq_ignore_ascii_case("sin") {
            Waveform::Sine
        } else if s.eq_ignore_ascii_case("square") {
            Waveform::Square
        } else if s.eq_ignore_ascii_case("triangle") || s.eq_ignore_ascii_case("tri") {
            Waveform::Triangle
        } else if s.eq_ignore_ascii_case("sawtooth") || s.eq_ignore_ascii_case("saw") {
            Waveform::Sawtooth
        } else if s.eq_ignore_ascii_case("noise") {
            Waveform::Noise
        } else {
            return Err(UnknownWaveform);
        };
        Ok(w)
    }
}

/// Fractional part of a non-negative phase, always in [0, 1).
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let t = phase - floorf(phase);
    // floorf rounding can leave exactly 1.0 for values just below an integer
    if t >= 1.0 { 0.0 } else { t }
}

/// Perceptual amplitude for a linear level in [0, 1].
///
/// `round((level * 181)^2)`: a power-law curve that reaches 32761 at full
/// level instead of scaling linearly to `i16::MAX`.
#[inline]
pub fn scale_amplitude(level: f32) -> u16 {
    let scaled = level.clamp(0.0, 1.0) * AMPLITUDE_SCALE;
    roundf(scaled * scaled) as u16
}

/// Xorshift32 noise source.
///
/// Seedable so noise voices are reproducible. A zero seed is replaced with a
/// fixed non-zero value because xorshift has an all-zero fixed point.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    state: u32,
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl NoiseSource {
    /// Seed used by [`NoiseSource::default`].
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    /// Create a noise source from a seed.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { Self::DEFAULT_SEED } else { seed },
        }
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform integer in `[-amplitude, amplitude)`; 0 when `amplitude` is 0.
    #[inline]
    pub fn next_sample(&mut self, amplitude: u16) -> i16 {
        if amplitude == 0 {
            return 0;
        }
        let span = 2 * u32::from(amplitude);
        let v = (self.next_u32() % span) as i32 - i32::from(amplitude);
        v as i16
    }
}

/// Fill `out` with one chunk of `waveform`.
///
/// Sample `i` is taken at phase `wrap_phase(phase + i * step)` and scaled by
/// `amplitude`. Periodic samples lie in `[-amplitude, amplitude]`, noise in
/// `[-amplitude, amplitude)`. Amplitudes above `i16::MAX` are clamped. The
/// caller advances its own phase afterwards.
pub fn render(
    waveform: Waveform,
    phase: f32,
    step: f32,
    amplitude: u16,
    noise: &mut NoiseSource,
    out: &mut [i16],
) {
    let amplitude = amplitude.min(i16::MAX as u16);
    if waveform == Waveform::Noise {
        for sample in out.iter_mut() {
            *sample = noise.next_sample(amplitude);
        }
        return;
    }

    let amp = f32::from(amplitude);
    for (i, sample) in out.iter_mut().enumerate() {
        let t = wrap_phase(phase + i as f32 * step);
        *sample = (waveform.shape(t) * amp) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_high_through_half_cycle() {
        assert_eq!(Waveform::Square.shape(0.0), 1.0);
        assert_eq!(Waveform::Square.shape(0.5), 1.0);
        assert_eq!(Waveform::Square.shape(0.500_1), -1.0);
    }

    #[test]
    fn triangle_breakpoints() {
        let tri = Waveform::Triangle;
        assert!((tri.shape(0.0)).abs() < 1e-6);
        assert!((tri.shape(0.25) - 1.0).abs() < 1e-6);
        assert!((tri.shape(0.5)).abs() < 1e-6);
        assert!((tri.shape(0.75) + 1.0).abs() < 1e-6);
        assert!((tri.shape(0.999) + 0.004).abs() < 1e-3);
    }

    #[test]
    fn sawtooth_breakpoints() {
        let saw = Waveform::Sawtooth;
        assert!((saw.shape(0.0)).abs() < 1e-6);
        assert!((saw.shape(0.25) - 0.5).abs() < 1e-6);
        assert!((saw.shape(0.5) + 1.0).abs() < 1e-6);
        assert!((saw.shape(0.75) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn sine_quarter_cycle_peaks() {
        assert!((Waveform::Sine.shape(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Sine.shape(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn amplitude_curve() {
        assert_eq!(scale_amplitude(0.0), 0);
        assert_eq!(scale_amplitude(1.0), 32761);
        assert_eq!(scale_amplitude(0.5), 8190);
        // Clamped outside [0, 1]
        assert_eq!(scale_amplitude(2.0), 32761);
        assert_eq!(scale_amplitude(-1.0), 0);
    }

    #[test]
    fn wrap_phase_stays_in_unit_interval() {
        assert_eq!(wrap_phase(0.0), 0.0);
        assert!((wrap_phase(1.25) - 0.25).abs() < 1e-6);
        assert!((wrap_phase(7.5) - 0.5).abs() < 1e-6);
        assert!(wrap_phase(0.999_999_9) < 1.0);
    }

    #[test]
    fn noise_zero_amplitude_is_silent() {
        let mut noise = NoiseSource::new(42);
        let mut buf = [1i16; 64];
        render(Waveform::Noise, 0.0, 0.0, 0, &mut noise, &mut buf);
        assert!(buf.iter().all(|&s| s == 0));
    }

    #[test]
    fn noise_is_reproducible_for_a_seed() {
        let mut a = NoiseSource::new(7);
        let mut b = NoiseSource::new(7);
        let mut buf_a = [0i16; 128];
        let mut buf_b = [0i16; 128];
        render(Waveform::Noise, 0.0, 0.0, 1000, &mut a, &mut buf_a);
        render(Waveform::Noise, 0.0, 0.0, 1000, &mut b, &mut buf_b);
        assert_eq!(buf_a, buf_b);
        assert!(buf_a.iter().any(|&s| s != buf_a[0]));
    }

    #[test]
    fn noise_zero_seed_is_replaced() {
        let mut noise = NoiseSource::new(0);
        assert_ne!(noise.next_u32(), 0);
    }

    #[test]
    fn render_sine_starts_at_zero() {
        let mut noise = NoiseSource::default();
        let mut buf = [0i16; 32];
        render(Waveform::Sine, 0.0, 440.0 / 48000.0, 32761, &mut noise, &mut buf);
        assert_eq!(buf[0], 0);
        assert!(buf[1] > 0);
    }

    #[test]
    fn parse_names() {
        assert_eq!("sine".parse(), Ok(Waveform::Sine));
        assert_eq!("Saw".parse(), Ok(Waveform::Sawtooth));
        assert_eq!("TRIANGLE".parse(), Ok(Waveform::Triangle));
        assert_eq!("pulse".parse::<Waveform>(), Err(UnknownWaveform));
        for w in Waveform::ALL {
            assert_eq!(w.name().parse(), Ok(w));
        }
    }
}
