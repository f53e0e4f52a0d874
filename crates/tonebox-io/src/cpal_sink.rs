//! Live output through cpal.
//!
//! The engine runs on the caller's thread; cpal pulls samples on its own
//! audio thread. A single-producer single-consumer ring sits in between:
//!
//! ```text
//!  Sound::tick ──► CpalSink::write ──► rtrb ring (i16, interleaved) ──► audio callback ──► f32 device buffer
//! ```
//!
//! `write` never blocks: when the ring is full it accepts fewer bytes (or
//! none) and the engine retries the rest on its next tick, exactly like a
//! hardware DMA FIFO.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tonebox_core::{CHANNELS, CHUNK_LEN, FRAME_BYTES, OutputSink, SAMPLE_RATE};

use crate::devices::{device_name, find_output_device};
use crate::{Error, Result};

/// Output stream configuration.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Device name fragment or index (uses the default if `None`).
    pub device: Option<String>,
    /// Requested device buffer size in frames (host default if `None`).
    pub buffer_frames: Option<u32>,
    /// Ring capacity in frames. Bounds the latency between a tick and the speaker.
    pub ring_frames: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            device: None,
            buffer_frames: None,
            ring_frames: CHUNK_LEN * 8,
        }
    }
}

/// Non-blocking sink feeding a cpal output stream.
///
/// The stream is opened for [`SAMPLE_RATE`] Hz, [`CHANNELS`] channels, and
/// plays until the sink is dropped. Only whole frames are accepted.
pub struct CpalSink {
    producer: Producer<i16>,
    underruns: Arc<AtomicU64>,
    reported_underruns: u64,
    device_name: String,
    _stream: cpal::Stream,
}

impl CpalSink {
    /// Open and start an output stream.
    pub fn open(config: &SinkConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_output_device(&host, config.device.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());

        let stream_config = cpal::StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: SAMPLE_RATE,
            buffer_size: config
                .buffer_frames
                .map_or(cpal::BufferSize::Default, cpal::BufferSize::Fixed),
        };

        let capacity = config.ring_frames.max(CHUNK_LEN) * CHANNELS;
        let (producer, mut consumer) = RingBuffer::<i16>::new(capacity);

        let underruns = Arc::new(AtomicU64::new(0));
        let callback_underruns = Arc::clone(&underruns);
        let mut started = false;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut starved = false;
                    for sample in data.iter_mut() {
                        *sample = match consumer.pop() {
                            Ok(s) => {
                                started = true;
                                f32::from(s) / 32768.0
                            }
                            Err(_) => {
                                starved = true;
                                0.0
                            }
                        };
                    }
                    // Silence before the first chunk arrives is not an underrun
                    if starved && started {
                        callback_underruns.fetch_add(1, Ordering::Relaxed);
                    }
                },
                move |err| {
                    tracing::warn!("output stream error: {err}");
                },
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::StreamConfigNotSupported => Error::UnsupportedFormat(
                    format!("{name}: {SAMPLE_RATE} Hz, {CHANNELS} channels"),
                ),
                other => Error::Stream(other.to_string()),
            })?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels = CHANNELS,
            sample_rate = SAMPLE_RATE,
            ring_frames = capacity / CHANNELS,
            "output stream started"
        );

        Ok(Self {
            producer,
            underruns,
            reported_underruns: 0,
            device_name: name,
            _stream: stream,
        })
    }

    /// Name of the device the stream plays on.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Number of audio callbacks that ran out of samples after playback began.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Frames of free space in the ring.
    pub fn free_frames(&self) -> usize {
        self.producer.slots() / CHANNELS
    }

    /// True once the audio callback has consumed everything written so far.
    pub fn is_drained(&self) -> bool {
        self.producer.slots() == self.producer.buffer().capacity()
    }
}

impl OutputSink for CpalSink {
    fn write(&mut self, bytes: &[u8]) -> usize {
        let frames = (bytes.len() / FRAME_BYTES).min(self.free_frames());
        let Ok(chunk) = self.producer.write_chunk_uninit(frames * CHANNELS) else {
            return 0;
        };
        let samples = bytes[..frames * FRAME_BYTES]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]));
        let written = chunk.fill_from_iter(samples);

        let underruns = self.underruns();
        if underruns > self.reported_underruns {
            tracing::warn!(total = underruns, "output underrun");
            self.reported_underruns = underruns;
        }

        written / CHANNELS * FRAME_BYTES
    }
}
