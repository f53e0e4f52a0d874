//! Offline render to a WAV file.

use super::common::{VoiceArgs, describe_patch, load_patch, start_patch};
use clap::Args;
use std::path::PathBuf;
use tonebox_core::{SAMPLE_RATE, Sound};
use tonebox_io::{FrameClock, HostSpeaker, WavSink};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Silence in ms rendered after the last voice ends
    #[arg(long, default_value = "50")]
    tail: u32,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let patch = load_patch(&args.voice)?;
    println!("Rendering {}", describe_patch(&patch));

    let sink = WavSink::create(&args.output)?;
    let clock = FrameClock::new(sink.frame_counter());
    let mut sound = Sound::new(sink, clock);

    let mut speaker = HostSpeaker::new();
    sound.begin(&mut speaker);
    start_patch(&mut sound, &patch);
    sound.wait_for_silence(args.tail);

    let (sink, _, _) = sound.into_parts();
    let frames = sink.finalize()?;

    println!(
        "Rendered {} frames ({:.3}s) to {}",
        frames,
        frames as f64 / f64::from(SAMPLE_RATE),
        args.output.display()
    );
    Ok(())
}
