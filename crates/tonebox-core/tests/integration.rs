//! Integration tests for tonebox-core.
//!
//! Drives the full voice -> registry -> mixer -> sink path with a manual
//! clock: envelope timing seen through the engine, chunk layout, silence
//! tracking, backpressure, and voice lifetimes.

use tonebox_core::{
    Adsr, CHUNK_BYTES, CHUNK_LEN, Clock, ManualClock, MemorySink, SAMPLE_RATE, Sound, Voice,
    Waveform, scale_amplitude,
};

fn flat(waveform: Waveform, freq: f32) -> Voice {
    Voice::new(waveform, freq)
        .with_envelope(Adsr::new(0, 0, 1.0, 0))
        .with_gain(1.0)
}

// ============================================================================
// Chunk basics
// ============================================================================

#[test]
fn sine_first_sample_is_zero() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
    let id = sound.add_voice(flat(Waveform::Sine, 440.0));
    assert!(sound.start(id));
    sound.tick();

    assert_eq!(sound.output_frame(0), (0, 0));
    // One quarter period in: 48000 / 440 / 4 ~= 27 samples
    let (peak, _) = sound.output_frame(27);
    assert!(peak > 32_000, "expected near-peak sample, got {peak}");
}

#[test]
fn stop_mid_attack_waits_for_attack() {
    let clock = ManualClock::new(0);
    let mut sound = Sound::new(MemorySink::new(), &clock);
    let id = sound.add_voice(
        Voice::new(Waveform::Square, 440.0).with_envelope(Adsr::new(10, 0, 1.0, 10)),
    );
    sound.start(id);
    clock.set(5);
    sound.stop(id);

    assert_eq!(sound.voice(id).and_then(Voice::stop_time), Some(10));
}

#[test]
fn no_voices_gives_silent_chunk() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(777));
    sound.tick();
    assert_eq!(sound.silent_since(), Some(777));
    assert!(sound.output_chunk().iter().all(|&b| b == 0));
}

#[test]
fn refusing_sink_never_rebuilds_chunk() {
    let clock = ManualClock::new(0);
    let mut sound = Sound::new(MemorySink::refusing(), &clock);
    let id = sound.add_voice(flat(Waveform::Square, 440.0));
    sound.start(id);

    sound.tick();
    let first = *sound.output_chunk();
    for _ in 0..1000 {
        clock.advance(1);
        sound.tick();
        assert_eq!(sound.bytes_remaining(), CHUNK_BYTES);
    }
    assert_eq!(sound.chunks_rendered(), 1);
    assert_eq!(sound.output_chunk(), &first);
    assert!(sound.sink().is_empty());
}

// ============================================================================
// Mixing
// ============================================================================

#[test]
fn mix_is_sum_of_voices() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
    let a = sound.add_voice(flat(Waveform::Square, 100.0).with_gain(0.25));
    let b = sound.add_voice(flat(Waveform::Square, 100.0).with_gain(0.5));
    sound.start(a);
    sound.start(b);
    sound.tick();

    let expected = i32::from(scale_amplitude(0.25)) + i32::from(scale_amplitude(0.5));
    assert_eq!(sound.mix_chunk()[0], expected);
    assert_eq!(i32::from(sound.output_frame(0).0), expected);
}

#[test]
fn negative_saturation_does_not_wrap() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
    for _ in 0..3 {
        let id = sound.add_voice(flat(Waveform::Square, 100.0));
        sound.start(id);
    }
    sound.tick();

    // 100 Hz square is negative in the second half of its 480-sample period
    let half = (SAMPLE_RATE / 100 / 2) as usize;
    assert!(half < CHUNK_LEN);
    let (l, r) = sound.output_frame(half + 1);
    assert_eq!((l, r), (i16::MIN, i16::MIN));
    assert_eq!(sound.output_frame(0).0, i16::MAX);
}

#[test]
fn inert_voice_is_excluded() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
    let id = sound.add_voice(flat(Waveform::Sine, 0.0));
    sound.start(id);
    sound.tick();
    assert_eq!(sound.silent_since(), Some(0));
    assert!(sound.mix_chunk().iter().all(|&m| m == 0));
}

#[test]
fn streamed_bytes_match_chunks_in_order() {
    let clock = ManualClock::new(0);
    let mut sound = Sound::new(MemorySink::with_write_limit(300), &clock);
    let id = sound.add_voice(flat(Waveform::Sawtooth, 220.0));
    sound.start(id);

    let mut expected = Vec::new();
    for _ in 0..3 {
        sound.tick();
        expected.extend_from_slice(sound.output_chunk());
        while sound.bytes_remaining() > 0 {
            sound.tick();
        }
        clock.advance(5);
    }
    assert_eq!(sound.chunks_rendered(), 3);
    assert_eq!(sound.sink().bytes(), &expected[..]);
    assert!(sound.sink().frames().all(|(l, r)| l == r));
}

// ============================================================================
// Lifetimes and silence
// ============================================================================

#[test]
fn play_for_runs_whole_envelope_then_goes_silent() {
    let clock = ManualClock::new(10_000).with_yield_step(1);
    let mut sound = Sound::new(MemorySink::new(), &clock);
    let id = sound.add_voice(
        Voice::new(Waveform::Triangle, 330.0).with_envelope(Adsr::new(20, 30, 0.5, 40)),
    );
    sound.play_for(id, 0);

    sound.wait_for_silence(0);
    let silent_at = clock.now_ms();
    assert!(!sound.voice(id).is_some_and(Voice::is_sounding));
    assert!(silent_at - 10_000 >= 90, "voice ended after {} ms", silent_at - 10_000);
}

#[test]
fn silence_requires_continuous_quiet() {
    let clock = ManualClock::new(0);
    let mut sound = Sound::new(MemorySink::new(), &clock);
    sound.tick();

    clock.set(50);
    let id = sound.add_voice(flat(Waveform::Square, 440.0));
    sound.play_for(id, 0);
    sound.tick();
    assert!(!sound.is_silent(0));

    // Zero-length release: the first chunk past the stop instant is the last
    clock.set(60);
    sound.tick();
    clock.set(61);
    sound.tick();
    assert_eq!(sound.silent_since(), Some(61));
    clock.set(160);
    assert!(!sound.is_silent(100));
    clock.set(161);
    assert!(sound.is_silent(100));
}

#[test]
fn removed_voice_stops_contributing() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
    let a = sound.add_voice(flat(Waveform::Square, 100.0));
    sound.start(a);
    sound.tick();
    assert_ne!(sound.mix_chunk()[0], 0);

    let voice = sound.remove_voice(a);
    assert!(voice.is_some_and(|v| v.is_sounding()));
    sound.tick();
    assert!(sound.mix_chunk().iter().all(|&m| m == 0));
    assert!(sound.voices().is_empty());
}

#[test]
fn into_parts_returns_collaborators() {
    let mut sound = Sound::new(MemorySink::new(), ManualClock::new(3));
    sound.add_voice(flat(Waveform::Sine, 440.0));
    sound.tick();
    let (sink, clock, voices) = sound.into_parts();
    assert_eq!(sink.len(), CHUNK_BYTES);
    assert_eq!(clock.now_ms(), 3);
    assert_eq!(voices.len(), 1);
}
