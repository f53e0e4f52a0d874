//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::voice_config::VoiceConfig;

/// A named set of voices started together.
///
/// Patches are stored as TOML files. Every voice starts at the same instant
/// and is released after its own `duration_ms`.
///
/// # TOML Format
///
/// ```toml
/// name = "Chord"
/// description = "A major triad"
///
/// [[voices]]
/// waveform = "triangle"
/// frequency = 261.63
///
/// [[voices]]
/// waveform = "triangle"
/// frequency = 329.63
/// gain = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Voices, in mixing order.
    #[serde(default)]
    pub voices: Vec<VoiceConfig>,
}

impl Patch {
    /// Create a new empty patch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            voices: Vec::new(),
        }
    }

    /// Create a patch with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a voice to the patch.
    pub fn with_voice(mut self, voice: VoiceConfig) -> Self {
        self.voices.push(voice);
        self
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that the patch has voices and every voice is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voices.is_empty() {
            return Err(ConfigError::EmptyPatch(self.name.clone()));
        }
        self.voices.iter().try_for_each(VoiceConfig::validate)
    }

    /// Number of voices.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// True if the patch has no voices.
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Iterate over voices.
    pub fn iter(&self) -> impl Iterator<Item = &VoiceConfig> {
        self.voices.iter()
    }

    /// Time until the last voice falls silent.
    pub fn lifetime_ms(&self) -> u32 {
        self.voices
            .iter()
            .map(VoiceConfig::lifetime_ms)
            .max()
            .unwrap_or(0)
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
