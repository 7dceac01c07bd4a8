//! Shared fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use duskd_core::activity::{ActivitySource, InputEvent};
use duskd_core::backlight::Backlight;
use duskd_core::error::DuskError;
use duskd_core::power::{ChargeState, PowerProbe};

/// Replays a scripted sequence of charge states, repeating the final entry,
/// and counts how often it is queried.
pub struct ScriptedProbe {
    states: Vec<Result<ChargeState, DuskError>>,
    queries: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(
        states: Vec<Result<ChargeState, DuskError>>,
    ) -> (ScriptedProbe, Arc<AtomicUsize>) {
        let queries = Arc::new(AtomicUsize::new(0));
        (
            ScriptedProbe {
                states,
                queries: queries.clone(),
            },
            queries,
        )
    }
}

impl PowerProbe for ScriptedProbe {
    fn charge_state(&mut self) -> Result<ChargeState, DuskError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.states.len() > 1 {
            self.states.remove(0)
        } else {
            self.states[0].clone()
        }
    }
}

struct FakeDevice {
    level: u32,
    writes: Vec<u32>,
}

/// Observer handle onto a `FakeBacklight`.
#[derive(Clone)]
pub struct BacklightLog {
    inner: Arc<Mutex<FakeDevice>>,
}

impl BacklightLog {
    pub fn writes(&self) -> Vec<u32> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn last_write(&self) -> Option<u32> {
        self.inner.lock().unwrap().writes.last().copied()
    }
}

/// In-memory backlight that records every write that reaches it.
pub struct FakeBacklight {
    inner: Arc<Mutex<FakeDevice>>,
}

impl FakeBacklight {
    pub fn new(initial: u32) -> (FakeBacklight, BacklightLog) {
        let inner = Arc::new(Mutex::new(FakeDevice {
            level: initial,
            writes: Vec::new(),
        }));

        (
            FakeBacklight {
                inner: inner.clone(),
            },
            BacklightLog { inner },
        )
    }
}

impl Backlight for FakeBacklight {
    fn brightness(&mut self) -> Result<u32, DuskError> {
        Ok(self.inner.lock().unwrap().level)
    }

    fn set_brightness(&mut self, percent: u32) -> Result<(), DuskError> {
        let mut device = self.inner.lock().unwrap();
        device.level = percent;
        device.writes.push(percent);
        Ok(())
    }
}

/// Activity source that lets tests inject events by hand.
#[derive(Clone)]
pub struct ManualSource {
    sender: Arc<Mutex<Option<Sender<InputEvent>>>>,
}

impl ManualSource {
    pub fn new() -> Self {
        ManualSource {
            sender: Arc::new(Mutex::new(None)),
        }
    }

    pub fn send(&self, event: InputEvent) {
        self.sender
            .lock()
            .unwrap()
            .as_ref()
            .expect("source not started")
            .send(event)
            .unwrap();
    }
}

impl ActivitySource for ManualSource {
    fn start(&mut self, events: Sender<InputEvent>) -> Result<(), DuskError> {
        *self.sender.lock().unwrap() = Some(events);
        Ok(())
    }
}

/// Polls `cond` until it holds or `timeout` passes.
pub fn wait_until(mut cond: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}
