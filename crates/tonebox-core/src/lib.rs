//! Tonebox Core - polyphonic waveform voices and a chunked stereo mixer
//!
//! This crate is the signal-generation and mixing engine for a small device
//! whose audio output is a fixed-size, periodically drained hardware buffer.
//! It is designed to be driven cooperatively from the caller's main loop:
//! no operation blocks except the two explicitly blocking helpers.
//!
//! # Core Components
//!
//! ## Voices
//!
//! - [`Voice`] - One independent tone generator (waveform, frequency, ADSR, gain)
//! - [`Waveform`] - Sine, Square, Triangle, Sawtooth, Noise
//! - [`Adsr`] - Envelope shape, evaluated purely from timestamps
//!
//! ## Mixing
//!
//! - [`Sound`] - Owns the voice registry and the output chunk, builds a chunk when
//!   the previous one is fully drained and streams it to an [`OutputSink`]
//! - [`VoiceRegistry`] / [`VoiceId`] - Slot arena holding the live voices
//!
//! ## Collaborators
//!
//! - [`OutputSink`] - Non-blocking byte sink (I2S DMA, host ring buffer, file)
//! - [`SpeakerControl`] - Output stage power toggle, used once by [`Sound::begin`]
//! - [`Clock`] - Millisecond timestamp plus a cooperative yield
//!
//! # Example
//!
//! ```rust
//! use tonebox_core::{Adsr, ManualClock, MemorySink, Sound, Voice, Waveform};
//!
//! let mut sound = Sound::new(MemorySink::new(), ManualClock::new(0));
//!
//! let beep = Voice::new(Waveform::Square, 880.0)
//!     .with_envelope(Adsr::new(5, 20, 0.6, 50))
//!     .with_gain(0.4);
//! let id = sound.add_voice(beep);
//! sound.play_for(id, 100);
//!
//! // Called from the caller's loop; never blocks.
//! sound.tick();
//! assert!(sound.sink().len() > 0);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets. The crate needs
//! `alloc` for the voice registry.
//!
//! ```toml
//! [dependencies]
//! tonebox-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod config;
pub mod engine;
pub mod envelope;
pub mod registry;
pub mod sink;
pub mod time;
pub mod voice;
pub mod waveform;

// Re-export main types at crate root
pub use config::{
    AMPLITUDE_SCALE, BYTES_PER_SAMPLE, CHANNELS, CHUNK_BYTES, CHUNK_LEN, FRAME_BYTES,
    LATE_STOP_TAIL_MS, SAMPLE_RATE,
};
pub use engine::{Sound, clip_to_i16};
pub use envelope::{Adsr, EnvelopeLevel};
pub use registry::{VoiceId, VoiceRegistry};
pub use sink::{MemorySink, OutputSink, SpeakerControl};
pub use time::{Clock, ManualClock, Millis, elapsed_ms, is_after};
pub use voice::Voice;
pub use waveform::{NoiseSource, UnknownWaveform, Waveform, render, scale_amplitude, wrap_phase};
