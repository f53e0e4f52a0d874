//! Build-time audio format constants.
//!
//! These describe the output sink's fixed configuration and the size of one
//! mix chunk. They are not runtime-tunable: the sink is configured once at
//! startup with the same values and the engine assumes they never change.

/// Samples per second per channel for every generated waveform and for streaming.
pub const SAMPLE_RATE: u32 = 48_000;

/// Mono samples produced per regeneration.
///
/// Trades latency (one chunk is buffered ahead of the sink) against how often
/// the voices have to be re-rendered.
pub const CHUNK_LEN: usize = 256;

/// Output channels. The mix is always duplicated into left and right.
pub const CHANNELS: usize = 2;

/// Bytes per signed 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Bytes per interleaved stereo frame.
pub const FRAME_BYTES: usize = CHANNELS * BYTES_PER_SAMPLE;

/// Bytes in one fully serialized output chunk.
pub const CHUNK_BYTES: usize = CHUNK_LEN * FRAME_BYTES;

/// Perceptual amplitude factor: `(1.0 * 181)^2` is just under `i16::MAX`.
pub const AMPLITUDE_SCALE: f32 = 181.0;

/// Release delay used when a stop request arrives after attack and decay
/// have already finished.
pub const LATE_STOP_TAIL_MS: u32 = 10;

/// Default attack time of a new voice, in milliseconds.
pub const DEFAULT_ATTACK_MS: u32 = 10;

/// Default decay time of a new voice, in milliseconds.
pub const DEFAULT_DECAY_MS: u32 = 0;

/// Default sustain level of a new voice.
pub const DEFAULT_SUSTAIN: f32 = 1.0;

/// Default release time of a new voice, in milliseconds.
pub const DEFAULT_RELEASE_MS: u32 = 10;

/// Default gain of a new voice.
pub const DEFAULT_GAIN: f32 = 0.5;

/// Duration of one chunk in milliseconds (fractional).
pub const fn chunk_duration_ms() -> f32 {
    CHUNK_LEN as f32 * 1000.0 / SAMPLE_RATE as f32
}
