//! The administrative control surface.
//!
//! Everything an external settings tree binds against: validated profile
//! writes, the dim blocker, read-only probes for the current brightness and
//! power source, and the verbosity knob.

use std::sync::{Arc, Mutex};

use log::LevelFilter;

use duskd_core::brightness::BrightnessControl;
use duskd_core::error::DuskError;

use crate::power::PowerModeClassifier;
use crate::profiles::{ProfileField, ProfileId, ProfileStore};
use crate::state::BlockDim;

pub struct ControlSurface {
    store: Arc<ProfileStore>,
    classifier: Arc<PowerModeClassifier>,
    brightness: Arc<BrightnessControl>,
    block_dim: Arc<BlockDim>,
    debug: Mutex<u8>,
}

impl ControlSurface {
    pub fn new(
        store: Arc<ProfileStore>,
        classifier: Arc<PowerModeClassifier>,
        brightness: Arc<BrightnessControl>,
        block_dim: Arc<BlockDim>,
    ) -> Self {
        ControlSurface {
            store,
            classifier,
            brightness,
            block_dim,
            debug: Mutex::new(0),
        }
    }

    pub fn profile_value(&self, id: ProfileId, field: ProfileField) -> u32 {
        self.store.get(id, field)
    }

    /// Writes a profile field. Out-of-range values are rejected and the
    /// previous value is retained; a timeout of 0 is invalid, not "never".
    pub fn set_profile_value(
        &self,
        id: ProfileId,
        field: ProfileField,
        value: u32,
    ) -> Result<(), DuskError> {
        let valid = match field {
            ProfileField::BrightnessLow | ProfileField::BrightnessHigh => value <= 100,
            ProfileField::TimeoutSecs => value > 0,
        };

        if !valid {
            return Err(DuskError::ConfigOutOfRange {
                setting: field.name(),
                value,
            });
        }

        self.store.set(id, field, value);

        // Profile writes invalidate the cached classification.
        self.classifier.invalidate();

        Ok(())
    }

    pub fn block_dim(&self) {
        self.block_dim.block();
    }

    pub fn unblock_dim(&self) {
        self.block_dim.unblock();
    }

    pub fn block_dim_count(&self) -> u32 {
        self.block_dim.count()
    }

    /// What the actuator currently reports.
    pub fn current_brightness(&self) -> Result<u32, DuskError> {
        self.brightness.current()
    }

    /// The classified power source, rendered for display.
    pub fn power_source(&self) -> &'static str {
        self.classifier.classify().as_str()
    }

    pub fn debug_level(&self) -> u8 {
        *self.debug.lock().unwrap()
    }

    /// Adjusts runtime verbosity: 0 keeps the normal log output, 1 adds
    /// debug lines, anything higher adds traces.
    pub fn set_debug_level(&self, level: u8) {
        *self.debug.lock().unwrap() = level;

        let filter = match level {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        log::set_max_level(filter);

        debug!("control: verbosity set to {}", level);
    }
}
