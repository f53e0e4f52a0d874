//! Property-based tests for tonebox-core.
//!
//! Tests sample bounds, phase range, envelope monotonicity, inert voices and
//! voice lifetimes using proptest for randomized parameters and timelines.

use proptest::prelude::*;
use tonebox_core::{
    Adsr, Clock, EnvelopeLevel, ManualClock, MemorySink, NoiseSource, Sound, Voice, Waveform,
    render, scale_amplitude,
};

fn any_waveform() -> impl Strategy<Value = Waveform> {
    prop::sample::select(Waveform::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every rendered sample stays within the amplitude, for any buffer
    /// length and any ratio of frequency to sample rate.
    #[test]
    fn samples_within_amplitude(
        waveform in any_waveform(),
        amplitude in 0u16..=32767,
        phase in 0.0f32..1.0,
        step in 0.0f32..0.5,
        len in 1usize..2048,
        seed in any::<u32>(),
    ) {
        let mut noise = NoiseSource::new(seed);
        let mut out = vec![0i16; len];
        render(waveform, phase, step, amplitude, &mut noise, &mut out);

        let amp = i32::from(amplitude);
        for &s in &out {
            let s = i32::from(s);
            prop_assert!(s >= -amp && s <= amp, "{waveform} sample {s} outside ±{amp}");
            if waveform == Waveform::Noise && amp > 0 {
                prop_assert!(s < amp, "noise sample {s} reached {amp}");
            }
        }
    }

    /// Phase stays in [0, 1) however many chunks are rendered.
    #[test]
    fn phase_stays_in_unit_range(
        waveform in any_waveform(),
        freq in 0.1f32..24_000.0,
        chunks in 1usize..200,
    ) {
        let mut voice = Voice::new(waveform, freq).with_envelope(Adsr::new(0, 0, 1.0, 0));
        voice.start(0);
        for t in 0..chunks {
            voice.fill_buffer(t as u32);
            let phase = voice.phase();
            prop_assert!((0.0..1.0).contains(&phase), "phase {phase} after {t} chunks");
        }
    }

    /// The attack ramp never decreases.
    #[test]
    fn attack_is_non_decreasing(
        attack in 1u32..5000,
        decay in 0u32..1000,
        sustain in 0.0f32..=1.0,
        start in any::<u32>(),
    ) {
        let env = Adsr::new(attack, decay, sustain, 10);
        let mut prev = 0.0f32;
        for d in 0..attack.min(1000) {
            let level = env.evaluate(start.wrapping_add(d), start, None).value();
            prop_assert!(level >= prev, "attack level fell from {prev} to {level} at {d} ms");
            prev = level;
        }
    }

    /// The release ramp never increases and eventually finishes.
    #[test]
    fn release_is_non_increasing(
        release in 1u32..2000,
        sustain in 0.0f32..=1.0,
        stop in 0u32..10_000,
    ) {
        let env = Adsr::new(0, 0, sustain, release);
        let mut prev = f32::INFINITY;
        for r in 0..release {
            match env.evaluate(stop + r, 0, Some(stop)) {
                EnvelopeLevel::Active(level) => {
                    prop_assert!(level <= prev, "release level rose from {prev} to {level}");
                    prev = level;
                }
                EnvelopeLevel::Finished => prop_assert!(false, "finished early at {r} ms"),
            }
        }
        prop_assert_eq!(env.evaluate(stop + release, 0, Some(stop)), EnvelopeLevel::Finished);
    }

    /// A voice with zero frequency never fills, whatever is done to it.
    #[test]
    fn zero_frequency_voice_is_inert(
        ops in prop::collection::vec((0u8..3, 0u32..1000), 1..30),
    ) {
        let mut voice = Voice::new(Waveform::Square, 0.0);
        let mut now = 0u32;
        for (op, arg) in ops {
            now += arg;
            match op {
                0 => voice.start(now),
                1 => voice.stop(now),
                _ => voice.play_for(now, arg),
            }
            prop_assert!(!voice.fill_buffer(now));
        }
    }

    /// play_for keeps the voice alive for at least attack + decay + release.
    #[test]
    fn play_for_covers_full_envelope(
        attack in 0u32..200,
        decay in 0u32..200,
        sustain in 0.0f32..=1.0,
        release in 0u32..200,
        duration in 0u32..300,
    ) {
        let env = Adsr::new(attack, decay, sustain, release);
        let clock = ManualClock::new(1_000).with_yield_step(1);
        let mut sound = Sound::new(MemorySink::new(), &clock);
        let id = sound.add_voice(Voice::new(Waveform::Sine, 440.0).with_envelope(env));
        sound.play_for(id, duration);

        while sound.voice(id).is_some_and(Voice::is_sounding) {
            sound.tick();
            clock.advance(1);
        }
        let lifetime = clock.now_ms() - 1_000;
        prop_assert!(
            lifetime >= env.full_length_ms(),
            "lifetime {lifetime} shorter than envelope {}",
            env.full_length_ms()
        );
    }

    /// Amplitude scaling is monotonic and bounded by the 16-bit range.
    #[test]
    fn amplitude_scaling_bounded(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scale_amplitude(lo) <= scale_amplitude(hi));
        prop_assert!(scale_amplitude(hi) <= 32_761);
    }
}
