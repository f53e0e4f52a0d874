//! A single tone generator.
//!
//! A [`Voice`] owns its waveform, frequency, envelope shape, gain, timing
//! window and one chunk of rendered samples. It knows nothing about the mixer:
//! the [`Sound`](crate::Sound) engine asks every registered voice for a chunk
//! via [`Voice::fill_buffer`] and sums whatever comes back.

use crate::config::{CHUNK_LEN, DEFAULT_GAIN, SAMPLE_RATE};
use crate::envelope::{Adsr, EnvelopeLevel};
use crate::time::Millis;
use crate::waveform::{NoiseSource, Waveform, render, scale_amplitude, wrap_phase};

/// One independent sound source.
///
/// ## Parameters
/// - `waveform`: Fixed at construction
/// - `frequency`: Hz; 0 means inert (never contributes samples)
/// - `envelope`: [`Adsr`] shape, fixed at construction
/// - `gain`: Static loudness multiplier (0.0 to 1.0, default 0.5)
///
/// Timing methods take the current time explicitly so a voice can be driven
/// by any clock; [`Sound`](crate::Sound) provides wrappers that read its own.
///
/// # Example
///
/// ```rust
/// use tonebox_core::{Adsr, Voice, Waveform};
///
/// let mut voice = Voice::new(Waveform::Triangle, 330.0)
///     .with_envelope(Adsr::new(10, 40, 0.5, 100))
///     .with_gain(0.8);
///
/// voice.start(0);
/// assert!(voice.fill_buffer(5));
/// assert!((voice.envelope() - 0.5).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct Voice {
    waveform: Waveform,
    frequency: f32,
    adsr: Adsr,
    gain: f32,
    start_time: Option<Millis>,
    stop_time: Option<Millis>,
    /// Position within one cycle, [0, 1)
    phase: f32,
    /// Last evaluated envelope level
    envelope: f32,
    noise: NoiseSource,
    buffer: [i16; CHUNK_LEN],
}

impl Voice {
    /// Create an idle voice with the default envelope and gain.
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency: sanitize_frequency(frequency),
            adsr: Adsr::default(),
            gain: DEFAULT_GAIN,
            start_time: None,
            stop_time: None,
            phase: 0.0,
            envelope: 0.0,
            noise: NoiseSource::default(),
            buffer: [0; CHUNK_LEN],
        }
    }

    /// Use the given envelope shape.
    pub fn with_envelope(mut self, adsr: Adsr) -> Self {
        self.adsr = adsr;
        self
    }

    /// Use the given gain, clamped to [0, 1].
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.set_gain(gain);
        self
    }

    /// Seed the noise generator (only audible for [`Waveform::Noise`]).
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise = NoiseSource::new(seed);
        self
    }

    /// Waveform of this voice.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Change the frequency. Negative or non-finite values make the voice inert.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = sanitize_frequency(frequency);
    }

    /// Gain in [0, 1].
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Change the gain, clamped to [0, 1]; NaN becomes 0.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
    }

    /// Envelope shape.
    pub fn adsr(&self) -> &Adsr {
        &self.adsr
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Envelope level computed by the most recent [`fill_buffer`](Self::fill_buffer).
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// When the current note started, if sounding.
    pub fn start_time(&self) -> Option<Millis> {
        self.start_time
    }

    /// When the release begins, if scheduled.
    pub fn stop_time(&self) -> Option<Millis> {
        self.stop_time
    }

    /// Whether the voice has been started and not yet gone idle.
    pub fn is_sounding(&self) -> bool {
        self.start_time.is_some()
    }

    /// Samples from the last successful [`fill_buffer`](Self::fill_buffer).
    pub fn samples(&self) -> &[i16; CHUNK_LEN] {
        &self.buffer
    }

    /// Begin the envelope at `now`, clear any scheduled release and reset phase.
    pub fn start(&mut self, now: Millis) {
        self.start_time = Some(now);
        self.stop_time = None;
        self.phase = 0.0;
    }

    /// Schedule the release.
    ///
    /// The release never begins before attack and decay have finished; if that
    /// point is already past, it begins shortly after `now`. No effect on a
    /// voice that is not sounding.
    pub fn stop(&mut self, now: Millis) {
        if let Some(start) = self.start_time {
            self.stop_time = Some(self.adsr.release_point(start, now));
        }
    }

    /// Start now and schedule the release so the note lasts at least
    /// `max(duration_ms, attack + decay + release)` before its release begins.
    pub fn play_for(&mut self, now: Millis, duration_ms: u32) {
        let duration = duration_ms.max(self.adsr.full_length_ms());
        self.start(now);
        self.stop_time = Some(now.wrapping_add(duration));
    }

    /// Render one chunk for `now`.
    ///
    /// Returns false, leaving the buffer untouched, when the voice is inert
    /// (frequency 0) or idle. Otherwise evaluates the envelope, renders the
    /// waveform scaled by `gain * envelope`, advances the phase by one chunk
    /// and returns true. The chunk in which the release completes is rendered
    /// silent and the voice returns to idle.
    pub fn fill_buffer(&mut self, now: Millis) -> bool {
        if self.frequency <= 0.0 {
            return false;
        }
        let Some(start) = self.start_time else {
            return false;
        };

        self.envelope = match self.adsr.evaluate(now, start, self.stop_time) {
            EnvelopeLevel::Active(level) => level,
            EnvelopeLevel::Finished => {
                self.start_time = None;
                self.stop_time = None;
                0.0
            }
        };

        let amplitude = scale_amplitude(self.gain * self.envelope);
        let step = self.frequency / SAMPLE_RATE as f32;
        render(
            self.waveform,
            self.phase,
            step,
            amplitude,
            &mut self.noise,
            &mut self.buffer,
        );

        self.phase = wrap_phase(self.phase + CHUNK_LEN as f32 * step);
        true
    }
}

fn sanitize_frequency(frequency: f32) -> f32 {
    if frequency.is_finite() && frequency > 0.0 {
        frequency
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(waveform: Waveform, freq: f32) -> Voice {
        Voice::new(waveform, freq)
            .with_envelope(Adsr::new(0, 0, 1.0, 10))
            .with_gain(1.0)
    }

    #[test]
    fn new_voice_is_idle() {
        let mut voice = Voice::new(Waveform::Sine, 440.0);
        assert!(!voice.is_sounding());
        assert!(!voice.fill_buffer(0));
    }

    #[test]
    fn inert_voice_never_fills() {
        let mut voice = flat(Waveform::Square, 0.0);
        voice.start(0);
        assert!(!voice.fill_buffer(1));
        voice.play_for(5, 100);
        assert!(!voice.fill_buffer(10));
        voice.stop(20);
        assert!(!voice.fill_buffer(30));
    }

    #[test]
    fn sine_starts_at_zero_crossing() {
        let mut voice = flat(Waveform::Sine, 440.0);
        voice.start(0);
        assert!(voice.fill_buffer(0));
        assert_eq!(voice.samples()[0], 0);
        assert_eq!(voice.envelope(), 1.0);
    }

    #[test]
    fn square_full_gain_peak() {
        let mut voice = flat(Waveform::Square, 100.0);
        voice.start(0);
        voice.fill_buffer(0);
        assert_eq!(voice.samples()[0], 32761);
    }

    #[test]
    fn phase_advances_by_one_chunk() {
        let mut voice = flat(Waveform::Sine, 440.0);
        voice.start(0);
        voice.fill_buffer(0);
        let expected = wrap_phase(CHUNK_LEN as f32 * 440.0 / SAMPLE_RATE as f32);
        assert!((voice.phase() - expected).abs() < 1e-6);
    }

    #[test]
    fn start_resets_phase_and_stop() {
        let mut voice = flat(Waveform::Sine, 1000.0);
        voice.play_for(0, 50);
        voice.fill_buffer(0);
        assert!(voice.phase() > 0.0);

        voice.start(10);
        assert_eq!(voice.phase(), 0.0);
        assert_eq!(voice.stop_time(), None);
        assert_eq!(voice.start_time(), Some(10));
    }

    #[test]
    fn stop_mid_attack_waits_for_attack() {
        let mut voice = Voice::new(Waveform::Sine, 440.0).with_envelope(Adsr::new(10, 0, 1.0, 10));
        voice.start(100);
        voice.stop(105);
        assert_eq!(voice.stop_time(), Some(110));
    }

    #[test]
    fn stop_on_idle_voice_is_noop() {
        let mut voice = Voice::new(Waveform::Sine, 440.0);
        voice.stop(50);
        assert_eq!(voice.stop_time(), None);
        assert!(!voice.is_sounding());
    }

    #[test]
    fn play_for_extends_short_requests() {
        let mut voice = Voice::new(Waveform::Sine, 440.0).with_envelope(Adsr::new(10, 20, 0.5, 30));
        voice.play_for(1000, 0);
        assert_eq!(voice.start_time(), Some(1000));
        assert_eq!(voice.stop_time(), Some(1060));

        voice.play_for(2000, 500);
        assert_eq!(voice.stop_time(), Some(2500));
    }

    #[test]
    fn finished_release_goes_idle_with_a_silent_chunk() {
        let mut voice = flat(Waveform::Square, 440.0);
        voice.play_for(0, 10);
        assert!(voice.fill_buffer(5));
        assert!(voice.samples().iter().any(|&s| s != 0));

        // stop at 10, release 10 ms -> finished at 20
        assert!(voice.fill_buffer(20));
        assert!(voice.samples().iter().all(|&s| s == 0));
        assert!(!voice.is_sounding());
        assert!(!voice.fill_buffer(21));
    }

    #[test]
    fn gain_and_frequency_are_sanitized() {
        let mut voice = Voice::new(Waveform::Sine, -5.0).with_gain(3.0);
        assert_eq!(voice.frequency(), 0.0);
        assert_eq!(voice.gain(), 1.0);
        voice.set_frequency(f32::NAN);
        assert_eq!(voice.frequency(), 0.0);
        voice.set_gain(f32::NAN);
        assert_eq!(voice.gain(), 0.0);
        voice.set_frequency(220.0);
        assert_eq!(voice.frequency(), 220.0);
    }

    #[test]
    fn seeded_noise_voices_match() {
        let mut a = flat(Waveform::Noise, 1.0).with_noise_seed(99);
        let mut b = flat(Waveform::Noise, 1.0).with_noise_seed(99);
        a.start(0);
        b.start(0);
        a.fill_buffer(0);
        b.fill_buffer(0);
        assert_eq!(a.samples(), b.samples());
    }
}
