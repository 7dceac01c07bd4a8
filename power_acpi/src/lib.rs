//! Battery charge-state queries via the system's power supply information.

#[macro_use]
extern crate log;

use battery::{Battery, Manager, State};

use duskd_core::error::DuskError;
use duskd_core::power::{ChargeState, PowerProbe};
use duskd_core::version::VersionInfo;

/// Probes the first battery reported by the platform.
pub struct AcpiPower {
    manager: Manager,
    battery: Battery,
}

impl AcpiPower {
    pub fn new() -> Result<Self, DuskError> {
        let manager = Manager::new().map_err(|e| DuskError::query("battery manager", e))?;

        let battery = manager
            .batteries()
            .map_err(|e| DuskError::query("battery enumeration", e))?
            .next()
            .ok_or_else(|| DuskError::DeviceUnavailable("no battery found".into()))?
            .map_err(|e| DuskError::query("battery device", e))?;

        if let Some(model) = battery.model() {
            debug!("battery model {:?}", model);
        }

        Ok(AcpiPower { manager, battery })
    }
}

impl PowerProbe for AcpiPower {
    fn charge_state(&mut self) -> Result<ChargeState, DuskError> {
        self.manager
            .refresh(&mut self.battery)
            .map_err(|e| DuskError::query("battery refresh", e))?;

        match self.battery.state() {
            State::Charging => Ok(ChargeState::Charging),
            State::Discharging => Ok(ChargeState::Discharging),
            State::Empty => Ok(ChargeState::Critical),
            // Seen when plugged in but not actively charging.
            State::Full | State::Unknown => Ok(ChargeState::Ambiguous),
            other => Err(DuskError::query(
                "battery state",
                format!("unidentified state {:?}", other),
            )),
        }
    }
}

impl VersionInfo for AcpiPower {
    fn version() -> String {
        format!("battery ({})", env!("CARGO_PKG_VERSION"))
    }
}
