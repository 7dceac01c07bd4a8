//! User-input monitoring through evdev.

#[macro_use]
extern crate log;

use std::sync::mpsc::Sender;
use std::thread;

use evdev::{Device, EventType, InputEventKind};

use duskd_core::activity::{ActivitySource, InputEvent};
use duskd_core::error::DuskError;
use duskd_core::version::VersionInfo;

/// Devices we never want to listen to: their events are driver chatter, not
/// user activity, and they can re-wake the screen at the wrong moment.
const IGNORED_DEVICES: &[&str] = &["Video Bus", "Power Button", "Lid Switch", "Sleep Button"];

/// Watches every keyboard/pointer evdev device with one reader thread each.
pub struct EvdevInput {
    devices: Vec<Device>,
}

impl EvdevInput {
    pub fn new() -> Result<Self, DuskError> {
        let mut devices = Vec::new();

        for device in evdev::enumerate() {
            if !monitorable(&device) {
                continue;
            }

            info!("found input device: {:?}", device.name());
            devices.push(device);
        }

        if devices.is_empty() {
            return Err(DuskError::DeviceUnavailable(
                "no usable input devices found".into(),
            ));
        }

        Ok(EvdevInput { devices })
    }
}

/// Keyboards, mice, touchpads and touchscreens count as user activity.
fn monitorable(device: &Device) -> bool {
    let name = device.name().unwrap_or("");
    if IGNORED_DEVICES.iter().any(|skip| name.contains(skip)) {
        trace!("ignoring input device {:?}", name);
        return false;
    }

    let events = device.supported_events();
    events.contains(EventType::KEY)
        || events.contains(EventType::RELATIVE)
        || events.contains(EventType::ABSOLUTE)
}

impl ActivitySource for EvdevInput {
    fn start(&mut self, events: Sender<InputEvent>) -> Result<(), DuskError> {
        for mut device in self.devices.drain(..) {
            let sender = events.clone();

            let spawned = thread::Builder::new()
                .name("duskd-evdev".into())
                .spawn(move || loop {
                    let device_name = device.name().map(|n| n.to_string());
                    let fetched = match device.fetch_events() {
                        Ok(fetched) => fetched,
                        Err(e) => {
                            warn!("device {:?} failed to send events: {}", device_name, e);
                            break;
                        }
                    };

                    for event in fetched {
                        let keycode = match event.kind() {
                            // value 1 is a key-down; repeats and releases
                            // still count as activity but carry no code.
                            InputEventKind::Key(key) if event.value() == 1 => Some(key.code()),
                            InputEventKind::Key(_) => None,
                            InputEventKind::RelAxis(_) | InputEventKind::AbsAxis(_) => None,
                            _ => continue,
                        };

                        if sender.send(InputEvent { keycode }).is_err() {
                            return;
                        }
                    }
                });

            if let Err(e) = spawned {
                return Err(DuskError::query("input thread", e));
            }
        }

        Ok(())
    }
}

impl VersionInfo for EvdevInput {
    fn version() -> String {
        format!("evdev ({})", env!("CARGO_PKG_VERSION"))
    }
}
