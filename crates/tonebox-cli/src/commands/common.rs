//! Shared CLI helpers used across multiple commands.

use clap::{Args, ValueEnum};
use tonebox_config::{Patch, VoiceConfig, resolve_patch};
use tonebox_core::{Clock, OutputSink, Sound, VoiceId, Waveform};

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    #[value(alias = "saw")]
    Sawtooth,
    Noise,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Triangle => Waveform::Triangle,
            CliWaveform::Sawtooth => Waveform::Sawtooth,
            CliWaveform::Noise => Waveform::Noise,
        }
    }
}

/// What to play: a patch, or voices described on the command line.
#[derive(Args, Clone, Debug)]
pub struct VoiceArgs {
    /// Built-in patch name, patch file, or user patch name (overrides the tone options)
    #[arg(short, long)]
    pub patch: Option<String>,

    /// Waveform
    #[arg(short, long, value_enum, default_value_t = CliWaveform::Sine)]
    pub waveform: CliWaveform,

    /// Frequency in Hz (repeat for several voices)
    #[arg(short, long = "freq", default_value = "440.0")]
    pub freqs: Vec<f32>,

    /// Attack time in ms
    #[arg(long, default_value = "10")]
    pub attack: u32,

    /// Decay time in ms
    #[arg(long, default_value = "0")]
    pub decay: u32,

    /// Sustain level (0-1)
    #[arg(long, default_value = "1.0")]
    pub sustain: f32,

    /// Release time in ms
    #[arg(long, default_value = "10")]
    pub release: u32,

    /// Gain per voice (0-1)
    #[arg(short, long, default_value = "0.5")]
    pub gain: f32,

    /// Note length in ms before the release begins
    #[arg(short, long, default_value = "500")]
    pub duration: u32,

    /// Noise seed
    #[arg(long)]
    pub seed: Option<u32>,
}

impl VoiceArgs {
    /// Patch built from the tone options.
    fn to_patch(&self) -> Patch {
        self.freqs.iter().fold(Patch::new("command line"), |patch, &freq| {
            let mut voice = VoiceConfig::new(self.waveform.into(), freq)
                .with_envelope(self.attack, self.decay, self.sustain, self.release)
                .with_gain(self.gain)
                .with_duration(self.duration);
            voice.seed = self.seed;
            patch.with_voice(voice)
        })
    }
}

/// Resolve the requested patch and check it.
pub fn load_patch(args: &VoiceArgs) -> anyhow::Result<Patch> {
    let patch = match &args.patch {
        Some(name) => resolve_patch(name).map_err(|e| {
            anyhow::anyhow!("{e}. Use 'tonebox patches list' to see available patches.")
        })?,
        None => args.to_patch(),
    };
    patch.validate()?;
    tracing::debug!(patch = %patch.name, voices = patch.len(), "patch loaded");
    Ok(patch)
}

/// Add every voice of `patch` to the engine and start it for its duration.
pub fn start_patch<S: OutputSink, C: Clock>(sound: &mut Sound<S, C>, patch: &Patch) -> Vec<VoiceId> {
    patch
        .iter()
        .map(|config| {
            let id = sound.add_voice(config.to_voice());
            sound.play_for(id, config.duration_ms);
            id
        })
        .collect()
}

/// One line per voice, for progress output.
pub fn describe_patch(patch: &Patch) -> String {
    let mut out = format!("{} ({} voice", patch.name, patch.len());
    if patch.len() != 1 {
        out.push('s');
    }
    out.push(')');
    for voice in patch.iter() {
        out.push_str(&format!(
            "\n  {:9} {:>9.2} Hz  gain {:.2}  {} ms",
            voice.waveform.name(),
            voice.frequency,
            voice.gain,
            voice.duration_ms
        ));
    }
    out
}
