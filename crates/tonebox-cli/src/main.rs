//! Tonebox CLI - play and render polyphonic waveform patches.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonebox")]
#[command(author, version, about = "Tonebox waveform synth and mixer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a patch or a tone on an audio device
    Play(commands::play::PlayArgs),

    /// Render a patch or a tone to a WAV file
    Render(commands::render::RenderArgs),

    /// List, show and export patches
    Patches(commands::patches::PatchesArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Patches(args) => commands::patches::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
