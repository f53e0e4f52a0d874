//! Output-side collaborators: the byte sink and the speaker power toggle.
//!
//! The sink receives interleaved little-endian 16-bit stereo frames exactly
//! as laid out in the engine's output chunk. It is configured once, before
//! the first tick, for [`SAMPLE_RATE`](crate::SAMPLE_RATE), 16-bit signed
//! samples and two channels.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Non-blocking, best-effort destination for output bytes.
///
/// `write` must return immediately (zero wait) with the number of leading
/// bytes of `bytes` it accepted, which may be anything from 0 to
/// `bytes.len()`. Refusing bytes is backpressure, not an error: the engine
/// offers the remainder again on the next tick, starting exactly where the
/// accepted prefix ended.
pub trait OutputSink {
    /// Accept up to `bytes.len()` bytes without waiting.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }
}

/// Power switch for the physical output stage.
///
/// Called once during engine initialization; there is no runtime
/// interaction afterwards.
pub trait SpeakerControl {
    /// Turn the output stage on or off.
    fn set_speaker_enabled(&mut self, enabled: bool);
}

/// In-memory sink that records accepted bytes.
///
/// An optional per-call limit models a hardware FIFO that only has room for
/// part of a chunk; [`MemorySink::refusing`] never accepts anything.
///
/// # Example
///
/// ```rust
/// use tonebox_core::{MemorySink, OutputSink};
///
/// let mut sink = MemorySink::with_write_limit(3);
/// assert_eq!(sink.write(&[1, 2, 3, 4, 5]), 3);
/// assert_eq!(sink.bytes(), &[1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Vec<u8>,
    write_limit: Option<usize>,
    writes: usize,
}

impl MemorySink {
    /// Sink that accepts everything it is offered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that accepts at most `limit` bytes per write.
    pub fn with_write_limit(limit: usize) -> Self {
        Self {
            write_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Sink that accepts nothing, as if its buffer were permanently full.
    pub fn refusing() -> Self {
        Self::with_write_limit(0)
    }

    /// Change the per-write limit (`None` for unlimited).
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    /// All bytes accepted so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes accepted so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing has been accepted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of `write` calls received, including refused ones.
    pub fn write_calls(&self) -> usize {
        self.writes
    }

    /// Accepted audio decoded as `(left, right)` frames.
    pub fn frames(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.data.chunks_exact(4).map(|f| {
            (
                i16::from_le_bytes([f[0], f[1]]),
                i16::from_le_bytes([f[2], f[3]]),
            )
        })
    }

    /// Forget everything accepted so far.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> usize {
        self.writes += 1;
        let n = self
            .write_limit
            .map_or(bytes.len(), |limit| limit.min(bytes.len()));
        self.data.extend_from_slice(&bytes[..n]);
        n
    }
}
