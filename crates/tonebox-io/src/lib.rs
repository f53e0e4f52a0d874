//! Host collaborators for the Tonebox mixing engine.
//!
//! [`tonebox_core::Sound`] only needs a non-blocking byte sink, a clock and a
//! speaker switch. This crate provides those for a desktop host:
//!
//! - **Live output**: [`CpalSink`] streams chunks to a sound card through a
//!   lock-free ring, so engine writes never wait on the audio callback
//! - **Offline capture**: [`WavSink`] writes chunks to a 16-bit stereo WAV file
//!   and, together with [`FrameClock`], renders faster than real time
//! - **Time**: [`SystemClock`] for live playback, [`FrameClock`] for rendering
//! - **Devices**: [`list_output_devices`] and [`default_output_device`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tonebox_core::{Sound, Voice, Waveform};
//! use tonebox_io::{CpalSink, HostSpeaker, SinkConfig, SystemClock};
//!
//! let sink = CpalSink::open(&SinkConfig::default())?;
//! let mut sound = Sound::new(sink, SystemClock::new());
//! sound.begin(&mut HostSpeaker::new());
//!
//! let id = sound.add_voice(Voice::new(Waveform::Sine, 440.0));
//! sound.play_for(id, 500);
//! sound.wait_for_silence(100);
//! ```

mod clock;
mod cpal_sink;
mod devices;
mod speaker;
mod wav_sink;

pub use clock::{FrameClock, SystemClock};
pub use cpal_sink::{CpalSink, SinkConfig};
pub use devices::{OutputDevice, default_output_device, list_output_devices};
pub use speaker::HostSpeaker;
pub use wav_sink::{WavSink, wav_spec};

/// Error types for host audio output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device cannot play the engine's fixed output format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for host audio output.
pub type Result<T> = std::result::Result<T, Error>;
