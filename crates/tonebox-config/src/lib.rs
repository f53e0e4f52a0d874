//! Patch files for the Tonebox mixer.
//!
//! A patch is a named list of voices that start together, each with its own
//! waveform, envelope, gain and note length. Patches are stored as TOML and
//! turned into core [`Voice`](tonebox_core::Voice)s with [`VoiceConfig::to_voice`].
//!
//! # Features
//!
//! - **Patch files**: Load, save and validate TOML patches
//! - **Factory patches**: Built-in patches that need no files on disk
//! - **Paths**: Platform-specific user patch directory and name resolution
//!
//! # Example
//!
//! ```rust
//! use tonebox_config::{Patch, VoiceConfig};
//! use tonebox_core::Waveform;
//!
//! let patch = Patch::new("Doorbell")
//!     .with_voice(VoiceConfig::new(Waveform::Sine, 659.25).with_duration(300))
//!     .with_voice(VoiceConfig::new(Waveform::Sine, 523.25).with_duration(600));
//! patch.validate().unwrap();
//!
//! let text = patch.to_toml().unwrap();
//! assert_eq!(Patch::from_toml(&text).unwrap(), patch);
//! ```

mod error;
mod patch;
mod voice_config;

/// Factory patches bundled with the library.
pub mod factory_patches;

/// Platform-specific paths for user patches.
pub mod paths;

pub use error::ConfigError;
pub use factory_patches::{
    FACTORY_PATCH_NAMES, factory_patches, get_factory_patch, is_factory_patch,
};
pub use patch::Patch;
pub use paths::{
    ensure_user_patches_dir, find_patch, list_user_patches, patch_name_from_path, resolve_patch,
    user_patches_dir,
};
pub use voice_config::{DEFAULT_DURATION_MS, VoiceConfig};
