//! Serializable voice definition.

use serde::{Deserialize, Serialize};
use tonebox_core::config::{
    DEFAULT_ATTACK_MS, DEFAULT_DECAY_MS, DEFAULT_GAIN, DEFAULT_RELEASE_MS, DEFAULT_SUSTAIN,
};
use tonebox_core::{Adsr, Voice, Waveform};

use crate::error::ConfigError;

/// Default note length when a patch does not give one.
pub const DEFAULT_DURATION_MS: u32 = 500;

/// One voice of a patch: a tone plus how long to hold it.
///
/// # TOML Format
///
/// ```toml
/// [[voices]]
/// waveform = "square"
/// frequency = 880.0
/// attack_ms = 5
/// decay_ms = 40
/// sustain = 0.6
/// release_ms = 80
/// gain = 0.4
/// duration_ms = 150
/// ```
///
/// Every field except `frequency` may be omitted. Noise voices still need a
/// non-zero frequency: a frequency of 0 marks a voice as silent regardless of
/// its waveform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceConfig {
    /// Waveform name: `sine`, `square`, `triangle`, `sawtooth` or `noise`.
    #[serde(default)]
    pub waveform: Waveform,

    /// Frequency in Hz.
    pub frequency: f32,

    /// Attack time in milliseconds.
    #[serde(default = "default_attack_ms")]
    pub attack_ms: u32,

    /// Decay time in milliseconds.
    #[serde(default = "default_decay_ms")]
    pub decay_ms: u32,

    /// Sustain level, 0.0 to 1.0.
    #[serde(default = "default_sustain")]
    pub sustain: f32,

    /// Release time in milliseconds.
    #[serde(default = "default_release_ms")]
    pub release_ms: u32,

    /// Gain, 0.0 to 1.0.
    #[serde(default = "default_gain")]
    pub gain: f32,

    /// Requested note length before the release begins. Extended to the full
    /// envelope length if shorter.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,

    /// Noise seed for reproducible noise voices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

fn default_attack_ms() -> u32 {
    DEFAULT_ATTACK_MS
}

fn default_decay_ms() -> u32 {
    DEFAULT_DECAY_MS
}

fn default_sustain() -> f32 {
    DEFAULT_SUSTAIN
}

fn default_release_ms() -> u32 {
    DEFAULT_RELEASE_MS
}

fn default_gain() -> f32 {
    DEFAULT_GAIN
}

fn default_duration_ms() -> u32 {
    DEFAULT_DURATION_MS
}

impl VoiceConfig {
    /// Create a voice definition with default envelope, gain and duration.
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            attack_ms: DEFAULT_ATTACK_MS,
            decay_ms: DEFAULT_DECAY_MS,
            sustain: DEFAULT_SUSTAIN,
            release_ms: DEFAULT_RELEASE_MS,
            gain: DEFAULT_GAIN,
            duration_ms: DEFAULT_DURATION_MS,
            seed: None,
        }
    }

    /// Set the envelope.
    pub fn with_envelope(mut self, attack_ms: u32, decay_ms: u32, sustain: f32, release_ms: u32) -> Self {
        self.attack_ms = attack_ms;
        self.decay_ms = decay_ms;
        self.sustain = sustain;
        self.release_ms = release_ms;
        self
    }

    /// Set the gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Set the note length.
    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Short label such as `square 880 Hz`, used in messages.
    pub fn label(&self) -> String {
        format!("{} {} Hz", self.waveform, self.frequency)
    }

    /// Envelope shape of this voice.
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack_ms, self.decay_ms, self.sustain, self.release_ms)
    }

    /// Time from start until the voice falls silent when played for `duration_ms`.
    pub fn lifetime_ms(&self) -> u32 {
        let adsr = self.adsr();
        self.duration_ms
            .max(adsr.full_length_ms())
            .saturating_add(adsr.release_ms())
    }

    /// Check ranges. The core clamps out-of-range values silently; a patch
    /// file should say what is wrong instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frequency.is_finite() || self.frequency < 0.0 {
            return Err(ConfigError::invalid_voice(
                self.label(),
                "frequency must be a finite number >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.gain) {
            return Err(ConfigError::invalid_voice(
                self.label(),
                format!("gain {} outside 0.0..=1.0", self.gain),
            ));
        }
        if !(0.0..=1.0).contains(&self.sustain) {
            return Err(ConfigError::invalid_voice(
                self.label(),
                format!("sustain {} outside 0.0..=1.0", self.sustain),
            ));
        }
        Ok(())
    }

    /// Build an idle core voice.
    pub fn to_voice(&self) -> Voice {
        let voice = Voice::new(self.waveform, self.frequency)
            .with_envelope(self.adsr())
            .with_gain(self.gain);
        match self.seed {
            Some(seed) => voice.with_noise_seed(seed),
            None => voice,
        }
    }
}
