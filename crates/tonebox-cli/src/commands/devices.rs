//! Audio device listing command.

use clap::Args;
use tonebox_io::list_output_devices;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        );
    }

    println!();
    println!("Tip: Use device index or partial name with --output:");
    println!("  tonebox play --output 0 --patch chord");
    println!("  tonebox play --output \"USB\" --freq 440");
    Ok(())
}
