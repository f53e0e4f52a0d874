//! Output device discovery.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use tonebox_core::SAMPLE_RATE;

use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

impl OutputDevice {
    fn from_device(device: &Device, default_name: Option<&str>) -> Option<Self> {
        let name = device_name(device).ok()?;
        let (default_sample_rate, channels) = device
            .default_output_config()
            .map(|c| (c.sample_rate(), c.channels()))
            .unwrap_or((SAMPLE_RATE, 2));
        Some(Self {
            is_default: default_name == Some(name.as_str()),
            name,
            default_sample_rate,
            channels,
        })
    }
}

/// List all output devices of the default host.
pub fn list_output_devices() -> Result<Vec<OutputDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .filter_map(|d| OutputDevice::from_device(&d, default_name.as_deref()))
        .collect();
    Ok(devices)
}

/// The default output device, if the host has one.
pub fn default_output_device() -> Result<Option<OutputDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok();
        OutputDevice::from_device(&d, name.as_deref())
    }))
}

/// Find an output device by index or case-insensitive partial name, or the default.
pub(crate) fn find_output_device(host: &Host, search: Option<&str>) -> Result<Device> {
    let Some(search) = search else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = search.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    let search_lower = search.to_lowercase();
    devices
        .into_iter()
        .find(|d| device_name(d).is_ok_and(|n| n.to_lowercase().contains(&search_lower)))
        .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{}'", search)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_output_devices_does_not_fail() {
        // Device availability depends on the system
        let result = list_output_devices();
        assert!(result.is_ok());
    }

    #[test]
    fn default_device_is_marked_default() {
        if let Ok(Some(device)) = default_output_device() {
            assert!(device.is_default);
            assert!(!device.name.is_empty());
        }
    }

    #[test]
    fn unknown_device_name_is_not_found() {
        let host = cpal::default_host();
        let result = find_output_device(&host, Some("no-such-device-7f3a9c"));
        assert!(matches!(result, Err(Error::DeviceNotFound(_) | Error::Stream(_))));
    }
}
