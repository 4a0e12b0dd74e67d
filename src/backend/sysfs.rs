//! Linux sysfs backlight backend.
//!
//! Controls the first device under `/sys/class/backlight`, scaling percentages
//! against the device's `max_brightness`. Writing the `brightness` attribute
//! requires the appropriate permissions (typically the `video` group or a
//! udev rule).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::BrightnessBackend;
use crate::common::constants::BACKLIGHT_SYS_DIR;

pub struct SysfsBacklight {
    device_dir: PathBuf,
    device_name: String,
    max_brightness: u32,
}

impl SysfsBacklight {
    /// Open the first backlight device found under the sysfs class directory.
    pub fn new(debug_enabled: bool) -> Result<Self> {
        let device_dir = first_backlight_device()?;
        let device_name = device_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        let max_raw = fs::read_to_string(device_dir.join("max_brightness"))
            .with_context(|| format!("Failed to read max_brightness for {device_name}"))?;
        let max_brightness: u32 = max_raw
            .trim()
            .parse()
            .with_context(|| format!("Unparsable max_brightness for {device_name}"))?;

        if debug_enabled {
            log_decorated!("Backlight device: {device_name} (max raw value {max_brightness})");
        }

        Ok(Self {
            device_dir,
            device_name,
            max_brightness,
        })
    }

    fn raw_value(&self, percent: u8) -> u32 {
        // Round to nearest raw step so 100% maps exactly to max
        (u32::from(percent) * self.max_brightness + 50) / 100
    }
}

impl BrightnessBackend for SysfsBacklight {
    fn set_brightness(&mut self, percent: u8) -> Result<()> {
        let raw = self.raw_value(percent.min(100));
        fs::write(self.device_dir.join("brightness"), raw.to_string()).with_context(|| {
            format!(
                "Failed to write brightness for {} (missing permissions?)",
                self.device_name
            )
        })
    }

    fn backend_name(&self) -> &'static str {
        "sysfs backlight"
    }
}

fn first_backlight_device() -> Result<PathBuf> {
    let entries = fs::read_dir(BACKLIGHT_SYS_DIR)
        .with_context(|| format!("Failed to read {BACKLIGHT_SYS_DIR}"))?;

    let mut devices: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    devices.sort();

    devices
        .into_iter()
        .next()
        .context("No compatible backlight device was found")
}
