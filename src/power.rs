//! Power source classification.

use std::sync::Mutex;
use std::time::Instant;

use duskd_core::power::{ChargeState, PowerMode, PowerProbe};

/// How long a classification may be served from cache.
const CACHE_SECS: u64 = 5;

struct CachedMode {
    mode: PowerMode,
    at: Instant,
}

/// Maps raw battery charge states onto the profile-selecting power mode.
///
/// Successful classifications are cached briefly to bound the query rate;
/// `invalidate` drops the cache so the next call hits the probe again.
pub struct PowerModeClassifier {
    probe: Mutex<Box<dyn PowerProbe>>,
    cache: Mutex<Option<CachedMode>>,
}

impl PowerModeClassifier {
    pub fn new(probe: Box<dyn PowerProbe>) -> Self {
        PowerModeClassifier {
            probe: Mutex::new(probe),
            cache: Mutex::new(None),
        }
    }

    pub fn classify(&self) -> PowerMode {
        {
            let cache = self.cache.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if cached.at.elapsed().as_secs() < CACHE_SECS {
                    return cached.mode;
                }
            }
        }

        let state = {
            let mut probe = self.probe.lock().unwrap();
            probe.charge_state()
        };

        let mode = match state {
            Ok(ChargeState::Charging) => PowerMode::OnExternalPower,
            // Critical is treated as discharging, not a distinct urgent mode.
            Ok(ChargeState::Discharging) | Ok(ChargeState::Critical) => PowerMode::OnBattery,
            // Plugged in but not charging.
            Ok(ChargeState::Ambiguous) => PowerMode::OnExternalPower,
            Err(e) => {
                error!("power: failed to query charge state: {}", e);
                return PowerMode::Unknown;
            }
        };

        trace!("power: classified source as {}", mode.as_str());

        let mut cache = self.cache.lock().unwrap();
        *cache = Some(CachedMode {
            mode,
            at: Instant::now(),
        });

        mode
    }

    /// Drops the cached classification.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap();
        *cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedProbe;
    use duskd_core::error::DuskError;
    use std::sync::atomic::Ordering;

    fn classifier_for(state: Result<ChargeState, DuskError>) -> PowerModeClassifier {
        let (probe, _) = ScriptedProbe::new(vec![state]);
        PowerModeClassifier::new(Box::new(probe))
    }

    #[test]
    fn charging_is_external_power() {
        let c = classifier_for(Ok(ChargeState::Charging));
        assert_eq!(c.classify(), PowerMode::OnExternalPower);
    }

    #[test]
    fn discharging_and_critical_are_battery() {
        let c = classifier_for(Ok(ChargeState::Discharging));
        assert_eq!(c.classify(), PowerMode::OnBattery);

        let c = classifier_for(Ok(ChargeState::Critical));
        assert_eq!(c.classify(), PowerMode::OnBattery);
    }

    #[test]
    fn ambiguous_is_external_power() {
        let c = classifier_for(Ok(ChargeState::Ambiguous));
        assert_eq!(c.classify(), PowerMode::OnExternalPower);
    }

    #[test]
    fn probe_failure_is_unknown() {
        let c = classifier_for(Err(DuskError::query("battery", "gone")));
        assert_eq!(c.classify(), PowerMode::Unknown);
    }

    #[test]
    fn classification_is_cached() {
        let (probe, queries) = ScriptedProbe::new(vec![Ok(ChargeState::Discharging)]);
        let c = PowerModeClassifier::new(Box::new(probe));

        assert_eq!(c.classify(), PowerMode::OnBattery);
        assert_eq!(c.classify(), PowerMode::OnBattery);
        assert_eq!(queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_a_fresh_query() {
        let (probe, queries) = ScriptedProbe::new(vec![
            Ok(ChargeState::Discharging),
            Ok(ChargeState::Charging),
        ]);
        let c = PowerModeClassifier::new(Box::new(probe));

        assert_eq!(c.classify(), PowerMode::OnBattery);
        c.invalidate();
        assert_eq!(c.classify(), PowerMode::OnExternalPower);
        assert_eq!(queries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let (probe, queries) = ScriptedProbe::new(vec![
            Err(DuskError::query("battery", "flaky")),
            Ok(ChargeState::Charging),
        ]);
        let c = PowerModeClassifier::new(Box::new(probe));

        assert_eq!(c.classify(), PowerMode::Unknown);
        assert_eq!(c.classify(), PowerMode::OnExternalPower);
        assert_eq!(queries.load(Ordering::SeqCst), 2);
    }
}
