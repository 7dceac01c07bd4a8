use duskd_core::error::DuskError;

#[cfg(feature = "linux")]
pub use duskd_input_evdev::EvdevInput as ActivityImpl;
#[cfg(feature = "linux")]
pub use duskd_power_acpi::AcpiPower as PowerImpl;

#[cfg(feature = "null")]
pub use duskd_backend_null::NullActivity as ActivityImpl;
#[cfg(feature = "null")]
pub use duskd_backend_null::NullPower as PowerImpl;

#[cfg(feature = "linux")]
pub use duskd_backlight_sysfs::SysfsBacklight as BacklightImpl;

#[cfg(feature = "null")]
pub use duskd_backend_null::NullBacklight as BacklightImpl;

#[cfg(feature = "linux")]
pub fn open_backlight(device: Option<&str>) -> Result<BacklightImpl, DuskError> {
    match device {
        Some(name) => BacklightImpl::with_device(name),
        None => BacklightImpl::new(),
    }
}

#[cfg(feature = "null")]
pub fn open_backlight(_device: Option<&str>) -> Result<BacklightImpl, DuskError> {
    BacklightImpl::new()
}
