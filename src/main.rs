//! Nunchuk Reader - Main Application
//!
//! Opens the Nunchuk on the configured I2C bus, polls it and prints every
//! event as a JSON line on stdout.
//!
//! Usage: nunchuk-rs [config.toml]   (defaults to configs/default.toml)

use anyhow::{Context, Result};
use log::info;
use nunchuk_rs::bus::get_bus;
use nunchuk_rs::{Config, NunchukEvent, NunchukManager, NunchukReader, StdDelay};
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => Config::load_default().context("loading configs/default.toml")?,
    };
    let settings = config.settings;

    let bus = get_bus(settings.bus).context("opening I2C bus")?;
    let reader = NunchukReader::new(bus, StdDelay, settings.session_config())
        .context("initializing Nunchuk")?;

    let mut manager = NunchukManager::new(settings);
    manager.start(reader)?;
    info!("Manager started! Waiting for Nunchuk events...");

    let receiver = manager.event_receiver().clone();
    loop {
        match receiver.recv_timeout(Duration::from_secs(1)) {
            Ok(NunchukEvent::Stopped) => break,
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                if !manager.is_running() {
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    manager.stop();
    info!("Manager stopped");
    Ok(())
}
