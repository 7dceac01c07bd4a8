//! No-op device backends for hosts without real hardware.

use std::sync::mpsc::Sender;

use duskd_core::activity::{ActivitySource, InputEvent};
use duskd_core::backlight::Backlight;
use duskd_core::error::DuskError;
use duskd_core::power::{ChargeState, PowerProbe};
use duskd_core::version::VersionInfo;

/// Remembers the last requested brightness and nothing else.
pub struct NullBacklight {
    level: u32,
}

impl NullBacklight {
    pub fn new() -> Result<Self, DuskError> {
        Ok(NullBacklight { level: 100 })
    }
}

impl Backlight for NullBacklight {
    fn brightness(&mut self) -> Result<u32, DuskError> {
        Ok(self.level)
    }

    fn set_brightness(&mut self, percent: u32) -> Result<(), DuskError> {
        self.level = percent;
        Ok(())
    }
}

impl VersionInfo for NullBacklight {
    fn version() -> String {
        format!("null ({})", env!("CARGO_PKG_VERSION"))
    }
}

/// Always reports a charging battery.
pub struct NullPower;

impl NullPower {
    pub fn new() -> Result<Self, DuskError> {
        Ok(NullPower)
    }
}

impl PowerProbe for NullPower {
    fn charge_state(&mut self) -> Result<ChargeState, DuskError> {
        Ok(ChargeState::Charging)
    }
}

impl VersionInfo for NullPower {
    fn version() -> String {
        format!("null ({})", env!("CARGO_PKG_VERSION"))
    }
}

/// Delivers no input events, ever.
pub struct NullActivity {
    // Keeps the channel open so the consumer side stays alive.
    _events: Option<Sender<InputEvent>>,
}

impl NullActivity {
    pub fn new() -> Result<Self, DuskError> {
        Ok(NullActivity { _events: None })
    }
}

impl ActivitySource for NullActivity {
    fn start(&mut self, events: Sender<InputEvent>) -> Result<(), DuskError> {
        self._events = Some(events);
        Ok(())
    }
}

impl VersionInfo for NullActivity {
    fn version() -> String {
        format!("null ({})", env!("CARGO_PKG_VERSION"))
    }
}
