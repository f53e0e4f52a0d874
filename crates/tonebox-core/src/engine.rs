//! The mixing and streaming engine.
//!
//! [`Sound`] alternates between two jobs, decided on every [`Sound::tick`]:
//!
//! - **Regenerate** (only when the previous chunk is fully drained): ask each
//!   registered voice for a chunk, sum into a 32-bit accumulator, saturate to
//!   16 bits and serialize as dual-mono interleaved stereo.
//! - **Drain**: offer the undelivered tail of the chunk to the sink with zero
//!   wait, and remember how much it took.
//!
//! Synthesis is the expensive part and runs once per chunk; the cheap write
//! is attempted on every tick so the sink never starves while the caller's
//! loop is running.
//!
//! ```text
//!  tick ──► bytes_remaining == 0 ? ──yes──► voices ─► Σ i32 ─► clip ─► L/R bytes
//!                 │                                                       │
//!                 no                                                      ▼
//!                 └──────────────────────────────► sink.write(tail) ◄─────┘
//! ```

use crate::config::{CHUNK_BYTES, CHUNK_LEN, FRAME_BYTES};
use crate::registry::{VoiceId, VoiceRegistry};
use crate::sink::{OutputSink, SpeakerControl};
use crate::time::{Clock, Millis, elapsed_ms};
use crate::voice::Voice;

/// Saturate a mixed sample to the signed 16-bit range.
///
/// Clipping instead of wrapping turns an overloaded mix into audible but
/// tolerable distortion rather than broadband noise.
#[inline]
pub fn clip_to_i16(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Polyphonic mixer streaming to a non-blocking sink.
///
/// Owns the voice registry, the accumulator and the serialized output chunk.
/// Single-threaded and cooperative: call [`tick`](Self::tick) from every
/// iteration of the main loop, or use [`delay`](Self::delay) /
/// [`wait_for_silence`](Self::wait_for_silence) which keep ticking while
/// they wait.
///
/// # Example
///
/// ```rust
/// use tonebox_core::{ManualClock, MemorySink, Sound, Voice, Waveform, CHUNK_BYTES};
///
/// let clock = ManualClock::new(0).with_yield_step(1);
/// let mut sound = Sound::new(MemorySink::new(), clock);
///
/// let id = sound.add_voice(Voice::new(Waveform::Sine, 440.0));
/// sound.play_for(id, 20);
/// sound.wait_for_silence(0);
///
/// assert!(sound.sink().len() >= CHUNK_BYTES);
/// assert!(!sound.voice(id).unwrap().is_sounding());
/// ```
pub struct Sound<S, C> {
    sink: S,
    clock: C,
    voices: VoiceRegistry,
    mix_chunk: [i32; CHUNK_LEN],
    output_chunk: [u8; CHUNK_BYTES],
    bytes_remaining: usize,
    silent_since: Option<Millis>,
    chunks_rendered: u64,
    speaker_enabled: bool,
}

impl<S: OutputSink, C: Clock> Sound<S, C> {
    /// Create an engine around an already configured sink and a clock.
    pub fn new(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            voices: VoiceRegistry::new(),
            mix_chunk: [0; CHUNK_LEN],
            output_chunk: [0; CHUNK_BYTES],
            bytes_remaining: 0,
            silent_since: None,
            chunks_rendered: 0,
            speaker_enabled: false,
        }
    }

    /// One-time initialization: power the speaker and start counting silence.
    ///
    /// Repeated calls leave the speaker alone.
    pub fn begin<P: SpeakerControl + ?Sized>(&mut self, speaker: &mut P) {
        if !self.speaker_enabled {
            speaker.set_speaker_enabled(true);
            self.speaker_enabled = true;
        }
        let now = self.clock.now_ms();
        self.silent_since.get_or_insert(now);
        #[cfg(feature = "tracing")]
        tracing::debug!(now, "sound engine started");
    }

    // --- Voices ---

    /// Register a voice and return its handle.
    pub fn add_voice(&mut self, voice: Voice) -> VoiceId {
        let id = self.voices.insert(voice);
        #[cfg(feature = "tracing")]
        tracing::debug!("voice_add: {id}");
        id
    }

    /// Deregister a voice, handing it back. Returns `None` for stale handles.
    pub fn remove_voice(&mut self, id: VoiceId) -> Option<Voice> {
        let voice = self.voices.remove(id);
        #[cfg(feature = "tracing")]
        if voice.is_some() {
            tracing::debug!("voice_remove: {id}");
        }
        voice
    }

    /// Look up a voice.
    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(id)
    }

    /// Look up a voice mutably.
    pub fn voice_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices.get_mut(id)
    }

    /// The voice registry.
    pub fn voices(&self) -> &VoiceRegistry {
        &self.voices
    }

    /// Start a voice at the engine's current time. Returns false for stale handles.
    ///
    /// Starting an audible voice ends the current silent run immediately,
    /// before the next chunk is built.
    pub fn start(&mut self, id: VoiceId) -> bool {
        let now = self.clock.now_ms();
        let Some(voice) = self.voices.get_mut(id) else {
            return false;
        };
        voice.start(now);
        self.note_started(id);
        true
    }

    /// Schedule a voice's release at the engine's current time.
    pub fn stop(&mut self, id: VoiceId) -> bool {
        let now = self.clock.now_ms();
        self.voices.get_mut(id).map(|v| v.stop(now)).is_some()
    }

    /// Start a voice now and release it after `duration_ms` (or its full envelope).
    pub fn play_for(&mut self, id: VoiceId, duration_ms: u32) -> bool {
        let now = self.clock.now_ms();
        let Some(voice) = self.voices.get_mut(id) else {
            return false;
        };
        voice.play_for(now, duration_ms);
        self.note_started(id);
        true
    }

    // Inert voices never contribute, so they leave the silent run alone.
    fn note_started(&mut self, id: VoiceId) {
        if self.voices.get(id).is_some_and(|v| v.frequency() > 0.0) {
            self.silent_since = None;
        }
    }

    // --- Streaming ---

    /// Service the audio path once. Never blocks.
    ///
    /// Builds a new chunk if the previous one has been fully accepted, then
    /// offers the remaining bytes of the current chunk to the sink.
    pub fn tick(&mut self) {
        if self.bytes_remaining == 0 {
            self.regenerate();
        }

        let offset = CHUNK_BYTES - self.bytes_remaining;
        let accepted = self.sink.write(&self.output_chunk[offset..]);
        self.bytes_remaining -= accepted.min(self.bytes_remaining);
    }

    fn regenerate(&mut self) {
        // One timestamp for every voice in this chunk
        let now = self.clock.now_ms();
        self.mix_chunk.fill(0);
        self.silent_since.get_or_insert(now);

        let mix = &mut self.mix_chunk;
        let silent_since = &mut self.silent_since;
        #[cfg(feature = "tracing")]
        let mut contributing = 0usize;
        self.voices.for_each_mut(|_, voice| {
            if voice.fill_buffer(now) {
                *silent_since = None;
                #[cfg(feature = "tracing")]
                {
                    contributing += 1;
                }
                for (acc, &sample) in mix.iter_mut().zip(voice.samples().iter()) {
                    *acc += i32::from(sample);
                }
            }
        });

        for (frame, &m) in self
            .output_chunk
            .chunks_exact_mut(FRAME_BYTES)
            .zip(self.mix_chunk.iter())
        {
            let [lo, hi] = clip_to_i16(m).to_le_bytes();
            frame.copy_from_slice(&[lo, hi, lo, hi]);
        }

        self.bytes_remaining = CHUNK_BYTES;
        self.chunks_rendered += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(now, contributing, chunk = self.chunks_rendered, "chunk rendered");
    }

    /// True once no voice has contributed for at least `threshold_ms`.
    ///
    /// Silence is measured from the first regeneration of an uninterrupted
    /// run in which no voice produced output. False if the engine is not
    /// currently silent.
    pub fn is_silent(&self, threshold_ms: u32) -> bool {
        self.silent_since
            .is_some_and(|since| elapsed_ms(self.clock.now_ms(), since) >= threshold_ms)
    }

    /// Keep ticking (yielding between ticks) until [`is_silent`](Self::is_silent) holds.
    pub fn wait_for_silence(&mut self, threshold_ms: u32) {
        while !self.is_silent(threshold_ms) {
            self.tick();
            self.clock.yield_now();
        }
    }

    /// Keep ticking (yielding between ticks) for at least `duration_ms`.
    pub fn delay(&mut self, duration_ms: u32) {
        let start = self.clock.now_ms();
        while elapsed_ms(self.clock.now_ms(), start) < duration_ms {
            self.tick();
            self.clock.yield_now();
        }
    }

    // --- Introspection ---

    /// Bytes of the current chunk the sink has not yet accepted.
    pub fn bytes_remaining(&self) -> usize {
        self.bytes_remaining
    }

    /// Start of the current silent run, or `None` while a voice is sounding.
    ///
    /// Set by the first silent regeneration of a run and kept across later
    /// silent chunks, so it marks when the quiet began, not the latest chunk.
    pub fn silent_since(&self) -> Option<Millis> {
        self.silent_since
    }

    /// Number of chunks built so far.
    pub fn chunks_rendered(&self) -> u64 {
        self.chunks_rendered
    }

    /// The wide accumulator from the last regeneration.
    pub fn mix_chunk(&self) -> &[i32; CHUNK_LEN] {
        &self.mix_chunk
    }

    /// The serialized output chunk (interleaved little-endian stereo).
    pub fn output_chunk(&self) -> &[u8; CHUNK_BYTES] {
        &self.output_chunk
    }

    /// Frame `index` of the output chunk as `(left, right)`.
    pub fn output_frame(&self, index: usize) -> (i16, i16) {
        let f = &self.output_chunk[index * FRAME_BYTES..(index + 1) * FRAME_BYTES];
        (
            i16::from_le_bytes([f[0], f[1]]),
            i16::from_le_bytes([f[2], f[3]]),
        )
    }

    /// The output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The output sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take the engine apart.
    pub fn into_parts(self) -> (S, C, VoiceRegistry) {
        (self.sink, self.clock, self.voices)
    }
}
