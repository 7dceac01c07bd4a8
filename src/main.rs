#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod activity;
mod config;
mod control;
mod keys;
mod platform;
mod power;
mod profiles;
mod state;
mod supervisor;
#[cfg(test)]
mod testutil;

use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use clap::{Arg, Command};
use log::LevelFilter;

use duskd_core::brightness::BrightnessControl;
use duskd_core::error::DuskError;
use duskd_core::version::VersionInfo;

use crate::activity::ActivityMonitor;
use crate::config::DuskdConfig;
use crate::control::ControlSurface;
use crate::keys::KeyHandler;
use crate::platform::*;
use crate::power::PowerModeClassifier;
use crate::state::BlockDim;
use crate::supervisor::Supervisor;

const DEFAULT_CONFIG: &str = "/etc/duskd/config.toml";

fn main() {
    let matches = Command::new("duskd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Adaptive display-power daemon")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .takes_value(true)
                .value_name("LEVEL")
                .help("Verbosity level 0-255, overrides the config file"),
        )
        .get_matches();

    // The logger lets everything through; the effective verbosity is the
    // global max level, adjustable at runtime via the control surface.
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .init();

    let config_path = matches.value_of("config").unwrap_or(DEFAULT_CONFIG);
    let config = if Path::new(config_path).exists() || matches.is_present("config") {
        match config::load_config(Path::new(config_path)) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
    } else {
        info!("no configuration at {}, using defaults", config_path);
        DuskdConfig::default()
    };

    let debug = matches
        .value_of("debug")
        .and_then(|value| value.parse::<u8>().ok())
        .or(config.debug)
        .unwrap_or(0);

    if let Err(e) = run(config, debug) {
        error!("failed to start: {}", e);
        process::exit(1);
    }
}

fn run(config: DuskdConfig, debug: u8) -> Result<(), DuskError> {
    info!("backlight backend: {}", BacklightImpl::version());
    info!("input backend: {}", ActivityImpl::version());
    info!("power backend: {}", PowerImpl::version());

    // Construction failures abort startup; the daemon refuses to run
    // without its devices.
    let block_dim = Arc::new(BlockDim::new());
    let store = Arc::new(config::build_profiles(&config));
    let classifier = Arc::new(PowerModeClassifier::new(Box::new(PowerImpl::new()?)));

    let backlight = open_backlight(config.backlight_device.as_deref())?;
    let brightness = Arc::new(BrightnessControl::new(Box::new(backlight)));

    let control = ControlSurface::new(
        store.clone(),
        classifier.clone(),
        brightness.clone(),
        block_dim.clone(),
    );
    control.set_debug_level(debug);

    let monitor = Arc::new(ActivityMonitor::new());
    monitor.start(Box::new(ActivityImpl::new()?))?;

    let supervisor = Supervisor::start(
        store.clone(),
        classifier.clone(),
        brightness,
        monitor.clone(),
        block_dim,
    )?;

    // Brightness keys adjust the active profile and force a re-check so the
    // new level applies within the current cycle.
    let key_handler = Arc::new(KeyHandler::new(store, classifier));
    let wake = supervisor.wake_handle();
    monitor.set_key_handler(Arc::new(move |code| {
        if key_handler.handle_key(code) {
            (*wake)();
        }
    }));

    match control.current_brightness() {
        Ok(percent) => info!("current brightness {}%", percent),
        Err(e) => warn!("cannot probe current brightness: {}", e),
    }
    info!("initialised successfully on {} power", control.power_source());

    wait_for_shutdown();

    info!("shutting down");
    supervisor.shutdown();

    Ok(())
}

/// Blocks until the first termination signal; a second one forces exit.
fn wait_for_shutdown() {
    let (tx, rx) = mpsc::channel();
    let has_called = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler(move || {
        info!("termination signal received");
        if has_called.load(Ordering::SeqCst) {
            warn!("forcing shutdown");
            process::exit(1);
        } else {
            has_called.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }
    })
    .expect("Error setting Ctrl-C handler");

    let _ = rx.recv();
}
