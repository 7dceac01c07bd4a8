#[macro_use]
extern crate log;

pub mod activity;
pub mod backlight;
pub mod brightness;
pub mod error;
pub mod power;
pub mod version;
