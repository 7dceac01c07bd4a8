use std::fs::File;
use std::io::Read;
use std::path::Path;

use toml;

use crate::profiles::{ProfileStore, ScreenProfile};

#[derive(Deserialize, Debug, Default)]
pub struct DuskdConfig {
    /// Verbosity level, 0-255.
    pub debug: Option<u8>,
    /// A specific controller under /sys/class/backlight; autodetected
    /// when absent.
    pub backlight_device: Option<String>,
    pub screen: Option<ScreenSection>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ScreenSection {
    pub power: Option<ProfileOverrides>,
    pub battery: Option<ProfileOverrides>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProfileOverrides {
    pub brightness_low: Option<u32>,
    pub brightness_high: Option<u32>,
    pub timeout_secs: Option<u32>,
    pub increment_level: Option<u8>,
}

impl ProfileOverrides {
    /// Folds the overrides onto `base`. Out-of-range values are dropped
    /// with a warning rather than clamped.
    fn apply(&self, name: &str, base: &mut ScreenProfile) {
        if let Some(value) = self.brightness_low {
            if value <= 100 {
                base.brightness_low = value;
            } else {
                warn!(
                    "config: screen.{}.brightness_low {} out of range, keeping {}",
                    name, value, base.brightness_low
                );
            }
        }

        if let Some(value) = self.brightness_high {
            if value <= 100 {
                base.brightness_high = value;
            } else {
                warn!(
                    "config: screen.{}.brightness_high {} out of range, keeping {}",
                    name, value, base.brightness_high
                );
            }
        }

        if let Some(value) = self.timeout_secs {
            if value > 0 {
                base.timeout_secs = value;
            } else {
                warn!(
                    "config: screen.{}.timeout_secs 0 is invalid, keeping {}",
                    name, base.timeout_secs
                );
            }
        }

        if let Some(value) = self.increment_level {
            base.increment_level = value;
        }
    }
}

/// Loads a configuration file.
pub fn load_config(path: &Path) -> Result<DuskdConfig, String> {
    let mut f =
        File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;

    let mut config_string = String::new();
    f.read_to_string(&mut config_string)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    toml::from_str(&config_string).map_err(|e| format!("cannot parse {}: {}", path.display(), e))
}

/// Builds the profile store from defaults plus any config overrides.
pub fn build_profiles(config: &DuskdConfig) -> ProfileStore {
    let mut power = ScreenProfile::power_defaults();
    let mut battery = ScreenProfile::battery_defaults();

    if let Some(screen) = &config.screen {
        if let Some(overrides) = &screen.power {
            overrides.apply("power", &mut power);
        }
        if let Some(overrides) = &screen.battery {
            overrides.apply("battery", &mut battery);
        }
    }

    ProfileStore::new(power, battery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{ProfileField, ProfileId};

    #[test]
    fn empty_config_yields_defaults() {
        let config: DuskdConfig = toml::from_str("").unwrap();
        let store = build_profiles(&config);

        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessHigh), 100);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessLow), 3);
    }

    #[test]
    fn overrides_land_in_the_right_profile() {
        let config: DuskdConfig = toml::from_str(
            r#"
            debug = 1

            [screen.battery]
            brightness_high = 50
            timeout_secs = 30

            [screen.power]
            brightness_low = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.debug, Some(1));

        let store = build_profiles(&config);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 50);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::TimeoutSecs), 30);
        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessLow), 60);

        // Untouched fields keep their defaults.
        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessHigh), 100);
    }

    #[test]
    fn invalid_values_keep_the_defaults() {
        let config: DuskdConfig = toml::from_str(
            r#"
            [screen.battery]
            brightness_high = 250
            timeout_secs = 0
            "#,
        )
        .unwrap();

        let store = build_profiles(&config);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 40);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::TimeoutSecs), 10);
    }
}
