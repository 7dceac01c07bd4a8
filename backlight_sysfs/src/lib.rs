//! Backlight control through /sys/class/backlight.

#[macro_use]
extern crate log;

use std::fs;
use std::path::{Path, PathBuf};

use duskd_core::backlight::Backlight;
use duskd_core::error::DuskError;
use duskd_core::version::VersionInfo;

const SYSFS_BACKLIGHT: &str = "/sys/class/backlight";

/// A backlight driven through the kernel's sysfs interface.
///
/// Raw values are scaled against the device's `max_brightness` so the rest
/// of the daemon works in percent.
pub struct SysfsBacklight {
    device: PathBuf,
    max: u32,
}

impl SysfsBacklight {
    /// Picks the first controller under /sys/class/backlight.
    pub fn new() -> Result<Self, DuskError> {
        let class = Path::new(SYSFS_BACKLIGHT);

        let entries = fs::read_dir(class)
            .map_err(|e| DuskError::query("backlight class", e))?;

        for entry in entries {
            let entry = entry.map_err(|e| DuskError::query("backlight class", e))?;
            debug!("found backlight classed object: {:?}", entry.path());

            match Self::open(entry.path()) {
                Ok(backlight) => return Ok(backlight),
                Err(e) => warn!("skipping {:?}: {}", entry.path(), e),
            }
        }

        Err(DuskError::DeviceUnavailable(
            "no backlight device found".into(),
        ))
    }

    /// Uses a specific controller by name, e.g. `intel_backlight`.
    pub fn with_device(name: &str) -> Result<Self, DuskError> {
        Self::open(Path::new(SYSFS_BACKLIGHT).join(name))
    }

    fn open(device: PathBuf) -> Result<Self, DuskError> {
        let max = read_value(&device.join("max_brightness"))?;
        if max == 0 {
            return Err(DuskError::DeviceUnavailable(format!(
                "{}: max_brightness is 0",
                device.display()
            )));
        }

        info!("using backlight device {:?} (max {})", device, max);

        Ok(SysfsBacklight { device, max })
    }

    fn from_percent(&self, percent: u32) -> u32 {
        ((u64::from(percent) * u64::from(self.max) + 50) / 100) as u32
    }

    fn to_percent(&self, raw: u32) -> u32 {
        ((u64::from(raw) * 100 + u64::from(self.max) / 2) / u64::from(self.max)) as u32
    }
}

impl Backlight for SysfsBacklight {
    fn brightness(&mut self) -> Result<u32, DuskError> {
        let raw = read_value(&self.device.join("brightness"))?;
        Ok(self.to_percent(raw))
    }

    fn set_brightness(&mut self, percent: u32) -> Result<(), DuskError> {
        let raw = self.from_percent(percent.min(100));

        fs::write(self.device.join("brightness"), raw.to_string())
            .map_err(|e| DuskError::query("backlight write", e))?;

        trace!("wrote raw brightness {} for {}%", raw, percent);

        Ok(())
    }
}

impl VersionInfo for SysfsBacklight {
    fn version() -> String {
        format!("sysfs ({})", env!("CARGO_PKG_VERSION"))
    }
}

fn read_value(path: &Path) -> Result<u32, DuskError> {
    let text = fs::read_to_string(path).map_err(|e| DuskError::query("backlight read", e))?;

    text.trim()
        .parse::<u32>()
        .map_err(|e| DuskError::query("backlight read", e))
}
