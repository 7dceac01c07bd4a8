use crate::error::DuskError;

/// A display backlight device.
///
/// Brightness is expressed as a percentage in [0, 100]; implementations
/// translate to whatever raw scale the hardware uses.
pub trait Backlight: Send {
    /// Reads the current brightness percentage.
    fn brightness(&mut self) -> Result<u32, DuskError>;

    /// Applies a brightness percentage.
    fn set_brightness(&mut self, percent: u32) -> Result<(), DuskError>;
}
