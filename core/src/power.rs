use crate::error::DuskError;

/// Charge states a power probe can report.
///
/// `Ambiguous` covers the "plugged in but not actively charging" readings
/// some firmwares produce instead of a charging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Discharging,
    Critical,
    Ambiguous,
}

/// Classified power source, selecting which screen profile applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    OnBattery,
    OnExternalPower,
    Unknown,
}

impl PowerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerMode::OnBattery => "BAT",
            PowerMode::OnExternalPower => "PWR",
            PowerMode::Unknown => "INVALID",
        }
    }
}

/// Queries the machine's battery for its current charge state.
pub trait PowerProbe: Send {
    fn charge_state(&mut self) -> Result<ChargeState, DuskError>;
}
