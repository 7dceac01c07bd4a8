//! Adapter between the input-event source and the rest of the daemon.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use duskd_core::activity::ActivitySource;
use duskd_core::error::DuskError;

type InputHook = Arc<dyn Fn() + Send + Sync>;
type KeyHook = Arc<dyn Fn(u16) + Send + Sync>;

/// Tracks when the user last produced input and fans events out to the
/// supervisor's interrupt path and the brightness-key dispatcher.
///
/// The record is stamped for every event; handlers may come and go
/// independently of the delivering source.
pub struct ActivityMonitor {
    last_input: Mutex<Instant>,
    on_input: Mutex<Option<InputHook>>,
    on_key: Mutex<Option<KeyHook>>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        ActivityMonitor {
            last_input: Mutex::new(Instant::now()),
            on_input: Mutex::new(None),
            on_key: Mutex::new(None),
        }
    }

    /// Starts consuming events from `source` on a dedicated thread.
    pub fn start(
        self: &Arc<Self>,
        mut source: Box<dyn ActivitySource>,
    ) -> Result<(), DuskError> {
        let (tx, rx) = mpsc::channel();
        source.start(tx)?;

        let monitor = self.clone();

        thread::Builder::new()
            .name("duskd-activity".into())
            .spawn(move || {
                // The source owns the delivery threads; keep it alive for as
                // long as we are consuming.
                let _source = source;

                for event in rx {
                    monitor.note_input();

                    let hook = monitor.on_input.lock().unwrap().clone();
                    if let Some(hook) = hook {
                        (*hook)();
                    }

                    if let Some(code) = event.keycode {
                        let hook = monitor.on_key.lock().unwrap().clone();
                        if let Some(hook) = hook {
                            (*hook)(code);
                        }
                    }
                }

                trace!("activity: event channel closed");
            })
            .map_err(|e| DuskError::query("activity thread", e))?;

        Ok(())
    }

    /// Seconds since the last observed input, clamped at zero.
    pub fn seconds_since_input(&self) -> u32 {
        let last_input = *self.last_input.lock().unwrap();
        Instant::now().saturating_duration_since(last_input).as_secs() as u32
    }

    pub fn set_input_handler(&self, handler: InputHook) {
        *self.on_input.lock().unwrap() = Some(handler);
    }

    pub fn clear_input_handler(&self) {
        *self.on_input.lock().unwrap() = None;
    }

    pub fn set_key_handler(&self, handler: KeyHook) {
        *self.on_key.lock().unwrap() = Some(handler);
    }

    fn note_input(&self) {
        let mut last_input = self.last_input.lock().unwrap();
        *last_input = Instant::now();
        trace!("activity: input recorded");
    }

    /// Pretends the last input happened `secs` seconds ago.
    #[cfg(test)]
    pub(crate) fn backdate(&self, secs: u64) {
        use std::time::Duration;

        let mut last_input = self.last_input.lock().unwrap();
        if let Some(earlier) = Instant::now().checked_sub(Duration::from_secs(secs)) {
            *last_input = earlier;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ManualSource;
    use duskd_core::activity::InputEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn started_monitor() -> (Arc<ActivityMonitor>, ManualSource) {
        let monitor = Arc::new(ActivityMonitor::new());
        let source = ManualSource::new();
        monitor.start(Box::new(source.clone())).unwrap();
        (monitor, source)
    }

    fn settle() {
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn events_reset_idle_time() {
        let (monitor, source) = started_monitor();
        monitor.backdate(45);
        assert!(monitor.seconds_since_input() >= 44);

        source.send(InputEvent { keycode: None });
        settle();

        assert_eq!(monitor.seconds_since_input(), 0);
    }

    #[test]
    fn input_handler_runs_per_event() {
        let (monitor, source) = started_monitor();
        let hits = Arc::new(AtomicUsize::new(0));

        let counted = hits.clone();
        monitor.set_input_handler(Arc::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }));

        source.send(InputEvent { keycode: None });
        source.send(InputEvent { keycode: Some(30) });
        settle();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn key_handler_only_sees_keycodes() {
        let (monitor, source) = started_monitor();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        monitor.set_key_handler(Arc::new(move |code| {
            sink.lock().unwrap().push(code);
        }));

        source.send(InputEvent { keycode: None });
        source.send(InputEvent { keycode: Some(225) });
        settle();

        assert_eq!(*seen.lock().unwrap(), vec![225]);
    }

    #[test]
    fn cleared_handler_is_not_invoked() {
        let (monitor, source) = started_monitor();
        let hits = Arc::new(AtomicUsize::new(0));

        let counted = hits.clone();
        monitor.set_input_handler(Arc::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }));
        monitor.clear_input_handler();

        source.send(InputEvent { keycode: None });
        settle();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
