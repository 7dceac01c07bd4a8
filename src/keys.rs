//! Brightness-key handling.

use std::sync::Arc;

use crate::power::PowerModeClassifier;
use crate::profiles::{ProfileId, ProfileStore};

pub const KEY_BRIGHTNESS_DOWN: u16 = 224;
pub const KEY_BRIGHTNESS_UP: u16 = 225;

#[derive(Debug, Clone, Copy)]
enum Adjust {
    Up,
    Down,
}

/// Keycode to action table.
const BINDINGS: &[(u16, Adjust)] = &[
    (KEY_BRIGHTNESS_UP, Adjust::Up),
    (KEY_BRIGHTNESS_DOWN, Adjust::Down),
];

/// Applies the brightness keys to the current power mode's profile.
pub struct KeyHandler {
    store: Arc<ProfileStore>,
    classifier: Arc<PowerModeClassifier>,
}

impl KeyHandler {
    pub fn new(store: Arc<ProfileStore>, classifier: Arc<PowerModeClassifier>) -> Self {
        KeyHandler { store, classifier }
    }

    /// Returns whether the code mapped to a brightness action. An adjustment
    /// that runs into 0 or 100 still counts as handled.
    pub fn handle_key(&self, code: u16) -> bool {
        let adjust = match BINDINGS.iter().find(|(bound, _)| *bound == code) {
            Some((_, adjust)) => *adjust,
            None => {
                trace!("keys: no binding for code {}", code);
                return false;
            }
        };

        let mode = self.classifier.classify();
        let profile = match ProfileId::for_mode(mode) {
            Some(profile) => profile,
            None => {
                error!("keys: cannot establish a profile for an unclassified power source");
                return true;
            }
        };

        let step = i32::from(self.store.increment_level(profile));
        let relative = match adjust {
            Adjust::Up => step,
            Adjust::Down => -step,
        };

        trace!("keys: adjusting {:?} brightness by {}", profile, relative);

        if self.store.change_rel_brightness(profile, relative).is_err() {
            debug!("keys: brightness already at its limit");
        }

        true
    }
}
