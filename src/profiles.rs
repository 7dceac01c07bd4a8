//! Per-power-source screen profiles.

use std::sync::Mutex;

use duskd_core::power::PowerMode;

/// Which profile a caller is addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileId {
    Power,
    Battery,
}

impl ProfileId {
    /// The profile applying to a classified power mode, if any.
    pub fn for_mode(mode: PowerMode) -> Option<ProfileId> {
        match mode {
            PowerMode::OnExternalPower => Some(ProfileId::Power),
            PowerMode::OnBattery => Some(ProfileId::Battery),
            PowerMode::Unknown => None,
        }
    }
}

/// The tunable fields of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    BrightnessLow,
    BrightnessHigh,
    TimeoutSecs,
}

impl ProfileField {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileField::BrightnessLow => "brightness_low",
            ProfileField::BrightnessHigh => "brightness_high",
            ProfileField::TimeoutSecs => "timeout_secs",
        }
    }
}

/// Brightness and timeout settings for one power source.
#[derive(Debug, Clone)]
pub struct ScreenProfile {
    /// Dimmed brightness level.
    pub brightness_low: u32,
    /// High/on brightness level.
    pub brightness_high: u32,
    /// Inactivity duration after which we switch from high to low.
    pub timeout_secs: u32,
    /// Step used by the brightness keys.
    pub increment_level: u8,
}

impl ScreenProfile {
    pub fn power_defaults() -> Self {
        ScreenProfile {
            brightness_low: 30,
            brightness_high: 100,
            timeout_secs: 10,
            increment_level: 10,
        }
    }

    pub fn battery_defaults() -> Self {
        ScreenProfile {
            brightness_low: 3,
            brightness_high: 40,
            timeout_secs: 10,
            increment_level: 10,
        }
    }
}

/// Reported by a relative brightness change that ran into 0 or 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saturated;

struct Profiles {
    power: ScreenProfile,
    battery: ScreenProfile,
}

/// Holds both profiles behind a single lock.
///
/// This is a low-frequency control surface, so one lock covering both
/// profiles is simpler than anything finer-grained.
pub struct ProfileStore {
    inner: Mutex<Profiles>,
}

impl ProfileStore {
    pub fn new(power: ScreenProfile, battery: ScreenProfile) -> Self {
        ProfileStore {
            inner: Mutex::new(Profiles { power, battery }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            ScreenProfile::power_defaults(),
            ScreenProfile::battery_defaults(),
        )
    }

    pub fn get(&self, id: ProfileId, field: ProfileField) -> u32 {
        let inner = self.inner.lock().unwrap();
        let profile = select(&inner, id);

        match field {
            ProfileField::BrightnessLow => profile.brightness_low,
            ProfileField::BrightnessHigh => profile.brightness_high,
            ProfileField::TimeoutSecs => profile.timeout_secs,
        }
    }

    pub fn set(&self, id: ProfileId, field: ProfileField, value: u32) {
        let mut inner = self.inner.lock().unwrap();
        let profile = select_mut(&mut inner, id);

        match field {
            ProfileField::BrightnessLow => profile.brightness_low = value,
            ProfileField::BrightnessHigh => profile.brightness_high = value,
            ProfileField::TimeoutSecs => profile.timeout_secs = value,
        }
    }

    pub fn increment_level(&self, id: ProfileId) -> u8 {
        let inner = self.inner.lock().unwrap();
        select(&inner, id).increment_level
    }

    /// Moves `brightness_high` by `relative`, clamped to [0, 100].
    ///
    /// A change that would cross a boundary is applied up to the boundary
    /// and still reported as `Saturated`; a change from an already saturated
    /// value is a no-op reported as `Saturated`.
    pub fn change_rel_brightness(&self, id: ProfileId, relative: i32) -> Result<(), Saturated> {
        let mut inner = self.inner.lock().unwrap();
        let profile = select_mut(&mut inner, id);
        let brightness = profile.brightness_high;

        if relative < 0 {
            if brightness == 0 {
                return Err(Saturated);
            }

            let decrease = relative.unsigned_abs();
            if decrease > brightness {
                profile.brightness_high = 0;
                return Err(Saturated);
            }

            profile.brightness_high = brightness - decrease;
        } else {
            if brightness == 100 {
                return Err(Saturated);
            }

            let increase = relative as u32;
            if brightness + increase > 100 {
                profile.brightness_high = 100;
                return Err(Saturated);
            }

            profile.brightness_high = brightness + increase;
        }

        Ok(())
    }
}

fn select(profiles: &Profiles, id: ProfileId) -> &ScreenProfile {
    match id {
        ProfileId::Power => &profiles.power,
        ProfileId::Battery => &profiles.battery,
    }
}

fn select_mut(profiles: &mut Profiles, id: ProfileId) -> &mut ScreenProfile {
    match id {
        ProfileId::Power => &mut profiles.power,
        ProfileId::Battery => &mut profiles.battery,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_per_source_policy() {
        let store = ProfileStore::with_defaults();

        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessHigh), 100);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 40);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessLow), 3);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::TimeoutSecs), 10);
        assert_eq!(store.increment_level(ProfileId::Power), 10);
    }

    #[test]
    fn set_is_visible_to_get() {
        let store = ProfileStore::with_defaults();

        store.set(ProfileId::Battery, ProfileField::TimeoutSecs, 60);
        assert_eq!(store.get(ProfileId::Battery, ProfileField::TimeoutSecs), 60);

        // The other profile is untouched.
        assert_eq!(store.get(ProfileId::Power, ProfileField::TimeoutSecs), 10);
    }

    #[test]
    fn relative_change_moves_high_level() {
        let store = ProfileStore::with_defaults();

        assert!(store.change_rel_brightness(ProfileId::Battery, 10).is_ok());
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 50);

        assert!(store.change_rel_brightness(ProfileId::Battery, -20).is_ok());
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 30);
    }

    #[test]
    fn increase_clamps_at_100_and_reports_saturation() {
        let store = ProfileStore::with_defaults();
        store.set(ProfileId::Power, ProfileField::BrightnessHigh, 95);

        // 95 + 10 crosses the boundary: clamps to 100 and reports it.
        assert_eq!(
            store.change_rel_brightness(ProfileId::Power, 10),
            Err(Saturated)
        );
        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessHigh), 100);

        // Further increases are pure no-ops.
        assert_eq!(
            store.change_rel_brightness(ProfileId::Power, 10),
            Err(Saturated)
        );
        assert_eq!(store.get(ProfileId::Power, ProfileField::BrightnessHigh), 100);
    }

    #[test]
    fn decrease_clamps_at_0_and_reports_saturation() {
        let store = ProfileStore::with_defaults();
        store.set(ProfileId::Battery, ProfileField::BrightnessHigh, 5);

        assert_eq!(
            store.change_rel_brightness(ProfileId::Battery, -10),
            Err(Saturated)
        );
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 0);

        assert_eq!(
            store.change_rel_brightness(ProfileId::Battery, -10),
            Err(Saturated)
        );
        assert_eq!(store.get(ProfileId::Battery, ProfileField::BrightnessHigh), 0);
    }
}
