use std::fmt::Display;

use thiserror::Error;

/// The shared error vocabulary for duskd.
///
/// Mirrors the error conditions of the original kernel module: a device that
/// cannot be opened at startup (`DeviceUnavailable`, fatal), a failed query
/// during a cycle (`QueryFailed`, a one-cycle no-op), an unclassifiable power
/// mode (`InvalidPowerMode`, fatal to the loop), and a rejected configuration
/// write (`ConfigOutOfRange`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuskError {
    /// A required device could not be opened. Fatal at startup.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A device query failed for one cycle.
    #[error("{context}: {detail}")]
    QueryFailed { context: String, detail: String },

    /// The power source could not be classified into a known mode.
    #[error("invalid power mode")]
    InvalidPowerMode,

    /// A configuration write was out of the accepted range.
    #[error("configuration out of range: {setting} = {value}")]
    ConfigOutOfRange { setting: &'static str, value: u32 },
}

impl DuskError {
    /// Build a [`DuskError::QueryFailed`] from a context label and any
    /// displayable source (an error value or a message).
    pub fn query(context: impl Into<String>, source: impl Display) -> DuskError {
        DuskError::QueryFailed {
            context: context.into(),
            detail: source.to_string(),
        }
    }
}
