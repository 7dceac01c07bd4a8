//! Serialized access to the brightness actuator.

use std::sync::Mutex;

use crate::backlight::Backlight;
use crate::error::DuskError;

/// Wraps the backlight device behind a single lock so that the dimming loop
/// and the input path never interleave writes, and skips writes that would
/// not change the device's current level.
pub struct BrightnessControl {
    device: Mutex<Box<dyn Backlight>>,
}

impl BrightnessControl {
    pub fn new(device: Box<dyn Backlight>) -> Self {
        BrightnessControl {
            device: Mutex::new(device),
        }
    }

    /// Reads the device's current brightness percentage.
    pub fn current(&self) -> Result<u32, DuskError> {
        let mut device = self.device.lock().unwrap();
        device.brightness()
    }

    /// Pushes a brightness percentage, unless the device already reports it.
    pub fn set(&self, percent: u32) -> Result<(), DuskError> {
        let mut device = self.device.lock().unwrap();

        match device.brightness() {
            Ok(current) if current == percent => {
                trace!("brightness already at {}%, skipping write", percent);
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("failed to read current brightness: {}", e);
            }
        }

        device.set_brightness(percent)?;
        debug!("brightness set to {}%", percent);

        Ok(())
    }
}
