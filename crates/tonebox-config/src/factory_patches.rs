//! Built-in patches.
//!
//! These are embedded at compile time and always available, so the CLI can
//! play something without any files on disk.

use crate::Patch;

/// Names of the built-in patches.
pub static FACTORY_PATCH_NAMES: &[&str] = &["beep", "chord", "alarm", "noise-burst", "sweep-stack"];

static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("beep", BEEP_PATCH),
    ("chord", CHORD_PATCH),
    ("alarm", ALARM_PATCH),
    ("noise-burst", NOISE_BURST_PATCH),
    ("sweep-stack", SWEEP_STACK_PATCH),
];

/// Short notification beep, the device's default voice settings.
const BEEP_PATCH: &str = r#"
name = "Beep"
description = "Short square beep with the default envelope"

[[voices]]
waveform = "square"
frequency = 880.0
duration_ms = 120
"#;

/// C major triad.
const CHORD_PATCH: &str = r#"
name = "Chord"
description = "C major triad on soft triangles"

[[voices]]
waveform = "triangle"
frequency = 261.63
attack_ms = 30
decay_ms = 120
sustain = 0.7
release_ms = 250
gain = 0.4
duration_ms = 800

[[voices]]
waveform = "triangle"
frequency = 329.63
attack_ms = 30
decay_ms = 120
sustain = 0.7
release_ms = 250
gain = 0.4
duration_ms = 800

[[voices]]
waveform = "triangle"
frequency = 392.0
attack_ms = 30
decay_ms = 120
sustain = 0.7
release_ms = 250
gain = 0.4
duration_ms = 800
"#;

/// Two detuned squares, loud enough to clip.
const ALARM_PATCH: &str = r#"
name = "Alarm"
description = "Harsh detuned squares driven into the clipper"

[[voices]]
waveform = "square"
frequency = 1000.0
attack_ms = 2
release_ms = 20
gain = 1.0
duration_ms = 600

[[voices]]
waveform = "square"
frequency = 1013.0
attack_ms = 2
release_ms = 20
gain = 1.0
duration_ms = 600
"#;

/// Percussive white noise.
const NOISE_BURST_PATCH: &str = r#"
name = "Noise Burst"
description = "Snare-like noise hit with a reproducible seed"

[[voices]]
waveform = "noise"
frequency = 1.0
attack_ms = 1
decay_ms = 60
sustain = 0.1
release_ms = 80
gain = 0.6
duration_ms = 0
seed = 12345
"#;

/// One voice of every periodic waveform an octave apart.
const SWEEP_STACK_PATCH: &str = r#"
name = "Sweep Stack"
description = "Sine, triangle, sawtooth and square stacked in octaves"

[[voices]]
waveform = "sine"
frequency = 110.0
attack_ms = 100
release_ms = 300
gain = 0.35
duration_ms = 1000

[[voices]]
waveform = "triangle"
frequency = 220.0
attack_ms = 100
release_ms = 300
gain = 0.3
duration_ms = 1000

[[voices]]
waveform = "sawtooth"
frequency = 440.0
attack_ms = 100
release_ms = 300
gain = 0.2
duration_ms = 1000

[[voices]]
waveform = "square"
frequency = 880.0
attack_ms = 100
release_ms = 300
gain = 0.15
duration_ms = 1000
"#;

/// Get all built-in patches.
pub fn factory_patches() -> Vec<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Get a built-in patch by key (`noise-burst`) or display name (`Noise Burst`).
///
/// The match is case-insensitive.
///
/// # Example
///
/// ```rust
/// use tonebox_config::get_factory_patch;
///
/// let chord = get_factory_patch("Chord").unwrap();
/// assert_eq!(chord.len(), 3);
/// assert!(get_factory_patch("nonexistent").is_none());
/// ```
pub fn get_factory_patch(name: &str) -> Option<Patch> {
    let name_lower = name.to_lowercase();

    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(key, toml)| Some((*key, Patch::from_toml(toml).ok()?)))
        .find(|(key, patch)| *key == name_lower || patch.name.to_lowercase() == name_lower)
        .map(|(_, patch)| patch)
}

/// Check if a name refers to a built-in patch.
pub fn is_factory_patch(name: &str) -> bool {
    get_factory_patch(name).is_some()
}
