//! Patch management commands.
//!
//! Lists, shows and exports built-in and user patches.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tonebox_config::{
    Patch, ensure_user_patches_dir, factory_patches, list_user_patches, patch_name_from_path,
    resolve_patch, user_patches_dir,
};

#[derive(Args)]
pub struct PatchesArgs {
    #[command(subcommand)]
    command: Option<PatchesCommand>,
}

#[derive(Subcommand)]
enum PatchesCommand {
    /// List available patches (built-in and user)
    List {
        /// Show only built-in patches
        #[arg(long)]
        factory: bool,

        /// Show only user patches
        #[arg(long)]
        user: bool,
    },

    /// Show details of a patch
    Show {
        /// Patch name or path
        name: String,
    },

    /// Write a patch as TOML for customization
    Export {
        /// Patch name or path
        name: String,

        /// Destination file (defaults to the user patch directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the user patch directory
    Paths,
}

pub fn run(args: PatchesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(PatchesCommand::List {
        factory: false,
        user: false,
    }) {
        PatchesCommand::List { factory, user } => list_patches(factory, user),
        PatchesCommand::Show { name } => show_patch(&name),
        PatchesCommand::Export {
            name,
            output,
            force,
        } => export_patch(&name, output, force),
        PatchesCommand::Paths => {
            println!("User patches: {}", user_patches_dir().display());
            Ok(())
        }
    }
}

fn list_patches(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    if !user_only {
        println!("Built-in Patches:");
        println!("=================");
        for patch in factory_patches() {
            let desc = patch.description.as_deref().unwrap_or("");
            println!("  {:16} - {}", patch.name, desc);
        }
        println!();
    }

    if !factory_only {
        println!("User Patches:");
        println!("=============");
        let user_patches = list_user_patches();
        if user_patches.is_empty() {
            println!("  (none)");
            println!();
            println!("  Start from a built-in one with: tonebox patches export <name>");
        } else {
            for path in user_patches {
                let name = patch_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
                match Patch::load(&path) {
                    Ok(patch) => {
                        let desc = patch.description.as_deref().unwrap_or("");
                        println!("  {:16} - {}", name, desc);
                    }
                    Err(_) => println!("  {:16} - (error loading)", name),
                }
            }
        }
        println!();
    }

    Ok(())
}

fn show_patch(name: &str) -> anyhow::Result<()> {
    let patch = resolve_patch(name)?;

    println!("Patch: {}", patch.name);
    println!("{}", "=".repeat(7 + patch.name.len()));
    println!();

    if let Some(desc) = &patch.description {
        println!("Description: {}", desc);
        println!();
    }

    println!("Voices ({}):", patch.len());
    for (i, voice) in patch.iter().enumerate() {
        println!(
            "  {}. {}, gain {:.2}, A {} / D {} / S {:.2} / R {} ms, held {} ms",
            i + 1,
            voice.label(),
            voice.gain,
            voice.attack_ms,
            voice.decay_ms,
            voice.sustain,
            voice.release_ms,
            voice.duration_ms
        );
    }
    println!();
    println!("Length: {} ms", patch.lifetime_ms());
    println!();
    println!("{}", patch.to_toml()?);

    Ok(())
}

fn export_patch(name: &str, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let patch = resolve_patch(name)?;

    let path = match output {
        Some(path) => path,
        None => {
            let stem = name.to_lowercase().replace(' ', "-");
            ensure_user_patches_dir()?.join(format!("{}.toml", stem))
        }
    };

    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    patch.save(&path)?;
    println!("Exported patch '{}' to {}", patch.name, path.display());
    Ok(())
}
