//! Live playback through an audio device.

use super::common::{VoiceArgs, describe_patch, load_patch, start_patch};
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tonebox_io::{CpalSink, HostSpeaker, SinkConfig, SystemClock};

/// How long to wait for the device to play out queued samples.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    voice: VoiceArgs,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Device buffer size in frames
    #[arg(long)]
    buffer_frames: Option<u32>,

    /// Silence in ms before playback is considered finished
    #[arg(long, default_value = "50")]
    tail: u32,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let patch = load_patch(&args.voice)?;

    let config = SinkConfig {
        device: args.output,
        buffer_frames: args.buffer_frames,
        ..SinkConfig::default()
    };
    let sink = CpalSink::open(&config)?;
    println!("Output: {}", sink.device_name());
    println!("Playing {}", describe_patch(&patch));
    println!("\nPress Ctrl+C to stop.\n");

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let mut speaker = HostSpeaker::new();
    let mut sound = tonebox_core::Sound::new(sink, SystemClock::new());
    sound.begin(&mut speaker);
    let ids = start_patch(&mut sound, &patch);

    let mut released = false;
    while !sound.is_silent(args.tail) {
        if !released && interrupted.load(Ordering::SeqCst) {
            println!("Stopping...");
            tracing::info!(voices = ids.len(), "interrupted, releasing voices");
            for &id in &ids {
                sound.stop(id);
            }
            released = true;
        }
        sound.delay(10);
    }

    // Samples still queued in the ring are played by the callback alone.
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while !sound.sink().is_drained() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }

    let underruns = sound.sink().underruns();
    if !sound.sink().is_drained() {
        tracing::warn!("output ring not drained after {:?}", DRAIN_TIMEOUT);
    }
    if underruns > 0 {
        println!("Done ({underruns} underrun(s)).");
    } else {
        println!("Done.");
    }
    Ok(())
}
