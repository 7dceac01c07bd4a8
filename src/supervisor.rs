//! The dimming supervisor.
//!
//! One long-lived loop per process: every cycle it classifies the power
//! source, compares idle time against the applicable profile's timeout,
//! pushes the resulting brightness and re-arms its timed wait. A concurrent
//! interrupt path, driven by the activity monitor, can force the level back
//! to `High` at any point. The timer path only ever dims; brightening
//! happens exclusively through input events or the brightness keys.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use duskd_core::brightness::BrightnessControl;
use duskd_core::error::DuskError;

use crate::activity::ActivityMonitor;
use crate::power::PowerModeClassifier;
use crate::profiles::{ProfileField, ProfileId, ProfileStore};
use crate::state::BlockDim;

/// Wait before retrying when a profile carries a zeroed timeout.
const RETRY_SECS: u64 = 5;

/// The level the supervisor currently wants the screen at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessLevel {
    Dim,
    High,
}

/// Lifecycle of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    ShuttingDown,
    Stopped,
}

struct LoopCtl {
    active: bool,
    state: RunState,
    next_deadline: Option<Instant>,
    error: Option<DuskError>,
}

struct Shared {
    /// Loop flags and deadline; the condvar below is bound to this lock.
    ctl: Mutex<LoopCtl>,
    wake: Condvar,
    /// Shared between the timer path and the interrupt path. The profile
    /// store lock must never be taken while this one is held.
    level: RwLock<BrightnessLevel>,
    /// Input events are discarded until the loop thread is up, and again
    /// once teardown begins.
    drop_events: AtomicBool,
    store: Arc<ProfileStore>,
    classifier: Arc<PowerModeClassifier>,
    brightness: Arc<BrightnessControl>,
    monitor: Arc<ActivityMonitor>,
    block_dim: Arc<BlockDim>,
}

pub struct Supervisor {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Supervisor {
    /// Pushes the high brightness for the detected power mode once, then
    /// starts the control loop on its own thread. The activity monitor's
    /// input handler is wired from inside that thread, so no event can
    /// reach a supervisor that is not yet running.
    pub fn start(
        store: Arc<ProfileStore>,
        classifier: Arc<PowerModeClassifier>,
        brightness: Arc<BrightnessControl>,
        monitor: Arc<ActivityMonitor>,
        block_dim: Arc<BlockDim>,
    ) -> Result<Supervisor, DuskError> {
        let shared = Arc::new(Shared {
            ctl: Mutex::new(LoopCtl {
                active: true,
                state: RunState::Running,
                next_deadline: None,
                error: None,
            }),
            wake: Condvar::new(),
            level: RwLock::new(BrightnessLevel::High),
            drop_events: AtomicBool::new(true),
            store,
            classifier,
            brightness,
            monitor,
            block_dim,
        });

        match target_brightness(&shared) {
            Ok(percent) => {
                if let Err(e) = shared.brightness.set(percent) {
                    error!("supervisor: failed to push initial brightness: {}", e);
                }
            }
            Err(e) => error!("supervisor: cannot compute initial brightness: {}", e),
        }

        let loop_shared = shared.clone();
        let thread = thread::Builder::new()
            .name("duskd-supervisor".into())
            .spawn(move || run(loop_shared))
            .map_err(|e| DuskError::query("supervisor thread", e))?;

        Ok(Supervisor {
            shared,
            thread: Some(thread),
        })
    }

    pub fn current_level(&self) -> BrightnessLevel {
        *self.shared.level.read().unwrap()
    }

    pub fn run_state(&self) -> RunState {
        self.shared.ctl.lock().unwrap().state
    }

    /// The error that terminated the loop, if any.
    pub fn last_error(&self) -> Option<DuskError> {
        self.shared.ctl.lock().unwrap().error.clone()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.shared.ctl.lock().unwrap().next_deadline
    }

    /// Forces an immediate re-check instead of waiting for the deadline.
    pub fn poke(&self) {
        let _ctl = self.shared.ctl.lock().unwrap();
        self.shared.wake.notify_all();
    }

    /// A handle other components can use to poke the loop.
    pub fn wake_handle(&self) -> Arc<dyn Fn() + Send + Sync> {
        let shared = self.shared.clone();
        Arc::new(move || {
            let _ctl = shared.ctl.lock().unwrap();
            shared.wake.notify_all();
        })
    }

    /// Cooperative shutdown: signal the loop, wait for it to confirm exit,
    /// then join the thread. In-flight actuator writes always complete.
    pub fn shutdown(mut self) {
        debug!("supervisor: shutdown requested");

        self.shared.drop_events.store(true, Ordering::Release);
        self.shared.monitor.clear_input_handler();

        let mut ctl = self.shared.ctl.lock().unwrap();
        if ctl.active {
            ctl.active = false;
            ctl.state = RunState::ShuttingDown;
            self.shared.wake.notify_all();
        }
        while ctl.state != RunState::Stopped {
            ctl = self.shared.wake.wait(ctl).unwrap();
        }
        drop(ctl);

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }

        debug!("supervisor: stopped");
    }
}

fn run(shared: Arc<Shared>) {
    trace!("supervisor: loop thread start");

    // Only now may input events reach us.
    let intr = shared.clone();
    shared
        .monitor
        .set_input_handler(Arc::new(move || input_interrupt(&intr)));
    shared.drop_events.store(false, Ordering::Release);

    let mut ctl = shared.ctl.lock().unwrap();
    while ctl.active {
        drop(ctl);
        let cycle = run_cycle(&shared);
        ctl = shared.ctl.lock().unwrap();

        match cycle {
            Ok(next_wait) => {
                ctl.next_deadline = Some(Instant::now() + next_wait);
                trace!("supervisor: sleeping for {:?}", next_wait);

                let (guard, _) = shared.wake.wait_timeout(ctl, next_wait).unwrap();
                ctl = guard;
            }
            Err(e) => {
                error!("supervisor: {} - exiting", e);
                ctl.error = Some(e);
                ctl.active = false;
            }
        }
    }

    ctl.state = RunState::Stopped;
    drop(ctl);

    // A dead loop must not keep brightening the screen on input.
    shared.drop_events.store(true, Ordering::Release);

    shared.wake.notify_all();
    trace!("supervisor: loop thread stopped");
}

/// One cycle of the loop. Returns how long to wait for the next one.
fn run_cycle(shared: &Shared) -> Result<Duration, DuskError> {
    let mode = shared.classifier.classify();
    let profile = match ProfileId::for_mode(mode) {
        Some(profile) => profile,
        // By original design an unclassifiable power source is fatal to the
        // loop, not retried.
        None => return Err(DuskError::InvalidPowerMode),
    };

    let timeout_secs = shared.store.get(profile, ProfileField::TimeoutSecs);
    trace!("supervisor: timeout at {} seconds", timeout_secs);

    if timeout_secs == 0 {
        error!("supervisor: configured timeout is 0, skipping cycle");
        return Ok(Duration::from_secs(RETRY_SECS));
    }

    let elapsed = shared.monitor.seconds_since_input();
    trace!("supervisor: last input {} seconds ago", elapsed);

    if elapsed >= timeout_secs {
        if shared.block_dim.count() == 0 {
            let mut level = shared.level.write().unwrap();
            *level = BrightnessLevel::Dim;
        } else {
            debug!(
                "supervisor: dimming blocked by {} holder(s)",
                shared.block_dim.count()
            );
        }
    }
    // No `else` raising the level here: the timer path only dims.

    match target_brightness(shared) {
        Ok(percent) => {
            if let Err(e) = shared.brightness.set(percent) {
                error!("supervisor: failed to push brightness: {}", e);
            }
        }
        Err(e) => error!("supervisor: cannot compute brightness: {}", e),
    }

    let next_secs = if elapsed < timeout_secs {
        timeout_secs - elapsed
    } else {
        timeout_secs
    };

    Ok(Duration::from_secs(u64::from(next_secs)))
}

/// Brightness for the current level under the current power mode's profile.
fn target_brightness(shared: &Shared) -> Result<u32, DuskError> {
    let mode = shared.classifier.classify();
    let profile = ProfileId::for_mode(mode).ok_or(DuskError::InvalidPowerMode)?;

    // Copy the level out before consulting the store; holding both locks at
    // once would invert against the key-handler path.
    let level = *shared.level.read().unwrap();

    let field = match level {
        BrightnessLevel::Dim => ProfileField::BrightnessLow,
        BrightnessLevel::High => ProfileField::BrightnessHigh,
    };

    Ok(shared.store.get(profile, field))
}

/// Runs on the activity monitor's delivery thread for every input event.
fn input_interrupt(shared: &Shared) {
    if shared.drop_events.load(Ordering::Acquire) {
        trace!("supervisor: dropping input event, loop not ready");
        return;
    }

    {
        let mut level = shared.level.write().unwrap();
        *level = BrightnessLevel::High;
    }

    match target_brightness(shared) {
        Ok(percent) => {
            if let Err(e) = shared.brightness.set(percent) {
                error!("supervisor: failed to restore brightness: {}", e);
            }
        }
        Err(e) => error!("supervisor: cannot compute brightness: {}", e),
    }
}
