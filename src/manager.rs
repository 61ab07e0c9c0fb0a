//! High-level Nunchuk Manager
//!
//! This module moves a ready reader onto its own thread, polls it at a
//! fixed interval and forwards changes as events over a channel.

use crate::bus::{Delay, I2cBus};
use crate::config::Settings;
use crate::nunchuk::{ButtonType, NunchukData, NunchukReader};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// How often a blocked send re-checks the running flag
const SEND_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Nunchuk event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NunchukEvent {
    Connected { obfuscated: bool },
    Sample(NunchukData),
    ButtonPressed(ButtonType),
    ButtonReleased(ButtonType),
    JoystickMoved { x: u16, y: u16 },
    AccelerometerUpdate { x: u16, y: u16, z: u16 },
    ReadFailed(String),
    Stopped,
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Manager is already running")]
    AlreadyRunning,

    #[error("Failed to spawn reader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Turns consecutive samples into change events
#[derive(Debug, Clone)]
pub struct EventTracker {
    joystick_threshold: u16,
    accelerometer_threshold: u16,
    previous: Option<NunchukData>,
}

impl EventTracker {
    pub fn new(joystick_threshold: u16, accelerometer_threshold: u16) -> Self {
        Self {
            joystick_threshold,
            accelerometer_threshold,
            previous: None,
        }
    }

    /// Events for `data` relative to the last sample seen.
    ///
    /// The first sample reports everything: position, acceleration and any
    /// button already held.
    pub fn process(&mut self, data: &NunchukData) -> Vec<NunchukEvent> {
        let mut events = vec![NunchukEvent::Sample(*data)];

        for button in [ButtonType::C, ButtonType::Z] {
            let pressed = data.button(button).is_pressed();
            let was_pressed = self
                .previous
                .map(|prev| prev.button(button).is_pressed())
                .unwrap_or(false);

            if pressed && !was_pressed {
                events.push(NunchukEvent::ButtonPressed(button));
            } else if !pressed && was_pressed {
                events.push(NunchukEvent::ButtonReleased(button));
            }
        }

        let joystick = data.joystick;
        let moved = match self.previous {
            Some(prev) => {
                joystick.x.abs_diff(prev.joystick.x) >= self.joystick_threshold
                    || joystick.y.abs_diff(prev.joystick.y) >= self.joystick_threshold
            }
            None => true,
        };
        if moved {
            events.push(NunchukEvent::JoystickMoved {
                x: joystick.x,
                y: joystick.y,
            });
        }

        let accel = data.accelerometer;
        let tilted = match self.previous {
            Some(prev) => {
                accel.x.abs_diff(prev.accelerometer.x) >= self.accelerometer_threshold
                    || accel.y.abs_diff(prev.accelerometer.y) >= self.accelerometer_threshold
                    || accel.z.abs_diff(prev.accelerometer.z) >= self.accelerometer_threshold
            }
            None => true,
        };
        if tilted {
            events.push(NunchukEvent::AccelerometerUpdate {
                x: accel.x,
                y: accel.y,
                z: accel.z,
            });
        }

        // Only moves that crossed a threshold become the new reference
        let mut reference = *data;
        if let Some(prev) = self.previous {
            if !moved {
                reference.joystick = prev.joystick;
            }
            if !tilted {
                reference.accelerometer = prev.accelerometer;
            }
        }
        self.previous = Some(reference);

        events
    }
}

/// Manager for a single Nunchuk
pub struct NunchukManager {
    settings: Settings,
    event_sender: Sender<NunchukEvent>,
    event_receiver: Receiver<NunchukEvent>,
    /// Running flag
    running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl NunchukManager {
    /// Create a new Nunchuk manager
    pub fn new(settings: Settings) -> Self {
        let (event_sender, event_receiver) = bounded(EVENT_CHANNEL_CAPACITY);

        Self {
            settings,
            event_sender,
            event_receiver,
            running: Arc::new(AtomicBool::new(false)),
            reader_thread: None,
        }
    }

    /// Start polling `reader` on a dedicated thread.
    ///
    /// The reader is moved onto that thread and dropped there when polling
    /// ends, which releases the bus.
    pub fn start<B, D>(&mut self, reader: NunchukReader<B, D>) -> Result<(), ManagerError>
    where
        B: I2cBus + Send + 'static,
        D: Delay + Send + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            return Err(ManagerError::AlreadyRunning);
        }
        // Reap a previous reader thread that stopped on its own
        if let Some(handle) = self.reader_thread.take() {
            if handle.join().is_err() {
                warn!("Previous reader thread panicked");
            }
        }

        self.running.store(true, Ordering::SeqCst);
        info!("Starting Nunchuk Manager...");

        let settings = self.settings.clone();
        let sender = self.event_sender.clone();
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("nunchuk-reader".to_string())
            .spawn(move || Self::reader_loop(reader, settings, sender, running));

        match spawned {
            Ok(handle) => {
                self.reader_thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(ManagerError::Spawn(e))
            }
        }
    }

    /// Stop the manager and wait for the reader thread to exit
    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Stopping Nunchuk Manager...");
        }
        if let Some(handle) = self.reader_thread.take() {
            if handle.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
    }

    /// Check if the manager is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the event receiver
    pub fn event_receiver(&self) -> &Receiver<NunchukEvent> {
        &self.event_receiver
    }

    fn reader_loop<B, D>(
        mut reader: NunchukReader<B, D>,
        settings: Settings,
        sender: Sender<NunchukEvent>,
        running: Arc<AtomicBool>,
    ) where
        B: I2cBus,
        D: Delay,
    {
        info!("Reader thread started");
        publish(&sender, &running, NunchukEvent::Connected {
            obfuscated: reader.is_obfuscated(),
        });

        let mut tracker = EventTracker::new(settings.joystick_threshold, settings.accelerometer_threshold);
        let mut consecutive_errors: u32 = 0;

        while running.load(Ordering::SeqCst) {
            match reader.read_device_values() {
                Ok(data) => {
                    consecutive_errors = 0;
                    for event in tracker.process(&data) {
                        publish(&sender, &running, event);
                    }
                }
                Err(e) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    warn!("Read failed ({} in a row): {}", consecutive_errors, e);
                    publish(&sender, &running, NunchukEvent::ReadFailed(e.to_string()));

                    if settings.max_consecutive_errors > 0
                        && consecutive_errors >= settings.max_consecutive_errors
                    {
                        warn!("Giving up after {} failed reads", consecutive_errors);
                        break;
                    }
                }
            }

            thread::sleep(settings.poll_interval());
        }

        drop(reader);
        // Delivered before clearing the flag so a lagging consumer still gets it
        publish(&sender, &running, NunchukEvent::Stopped);
        running.store(false, Ordering::SeqCst);
        info!("Reader thread stopped");
    }
}

impl Drop for NunchukManager {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send `event`, waiting for room in the channel.
///
/// Events are never dropped while the manager runs; once `stop()` clears
/// the running flag a blocked send gives up.
fn publish(sender: &Sender<NunchukEvent>, running: &AtomicBool, event: NunchukEvent) {
    let mut event = event;
    loop {
        match sender.send_timeout(event, SEND_RETRY_INTERVAL) {
            Ok(()) => return,
            Err(SendTimeoutError::Timeout(pending)) => {
                if !running.load(Ordering::SeqCst) {
                    debug!("Manager stopping, discarding {:?}", pending);
                    return;
                }
                event = pending;
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                debug!("Event channel disconnected");
                return;
            }
        }
    }
}
