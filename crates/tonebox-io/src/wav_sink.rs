//! Offline capture of the engine's output to a WAV file.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hound::{SampleFormat, WavWriter};
use tonebox_core::{CHANNELS, FRAME_BYTES, OutputSink, SAMPLE_RATE};

use crate::Result;

/// WAV format matching the engine's output chunk: 16-bit PCM stereo.
pub fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: CHANNELS as u16,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Sink that writes every accepted frame to a WAV stream.
///
/// Accepts all whole frames it is offered and counts them in a shared
/// counter, which a [`FrameClock`](crate::FrameClock) turns into time.
///
/// The first write error is latched and reported by [`finalize`](Self::finalize).
/// Frames offered after a failure are dropped but still counted, so an engine
/// loop waiting on the frame clock keeps making progress.
pub struct WavSink<W: Write + Seek> {
    writer: WavWriter<W>,
    frames: Arc<AtomicU64>,
    error: Option<hound::Error>,
}

impl WavSink<BufWriter<File>> {
    /// Create (or truncate) a WAV file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let writer = WavWriter::create(path.as_ref(), wav_spec())?;
        tracing::debug!(path = %path.as_ref().display(), "WAV capture opened");
        Ok(Self::from_writer(writer))
    }
}

impl<W: Write + Seek> WavSink<W> {
    /// Write WAV data to an arbitrary seekable stream.
    pub fn new(inner: W) -> Result<Self> {
        Ok(Self::from_writer(WavWriter::new(inner, wav_spec())?))
    }

    fn from_writer(writer: WavWriter<W>) -> Self {
        Self {
            writer,
            frames: Arc::new(AtomicU64::new(0)),
            error: None,
        }
    }

    /// Shared counter of frames accepted so far.
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }

    /// Frames accepted so far.
    pub fn frames_written(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// True if a write has failed.
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Flush the header and close the stream, returning the number of frames.
    ///
    /// Reports the first latched write error, if any.
    pub fn finalize(self) -> Result<u64> {
        let frames = self.frames_written();
        let finalized = self.writer.finalize();
        if let Some(err) = self.error {
            return Err(err.into());
        }
        finalized?;
        tracing::debug!(frames, "WAV capture finalized");
        Ok(frames)
    }
}

impl<W: Write + Seek> OutputSink for WavSink<W> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        let frames = bytes.len() / FRAME_BYTES;
        let whole = &bytes[..frames * FRAME_BYTES];

        if self.error.is_none() {
            for pair in whole.chunks_exact(2) {
                if let Err(err) = self.writer.write_sample(i16::from_le_bytes([pair[0], pair[1]])) {
                    tracing::warn!("WAV write failed: {err}");
                    self.error = Some(err);
                    break;
                }
            }
        }

        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
        whole.len()
    }
}
