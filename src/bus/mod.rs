//! Bus abstraction for talking to the Nunchuk
//!
//! This module provides a unified interface over the two-wire (I2C) bus
//! the Nunchuk hangs off, plus the blocking delay used between a write
//! and the following read.

pub mod mock_bus;
#[cfg(target_os = "linux")]
pub mod rppal_bus;

pub use mock_bus::{BusOp, MockBus, MockDelay};
#[cfg(target_os = "linux")]
pub use rppal_bus::RppalBus;

use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Failed to open bus: {0}")]
    Open(String),

    #[error("Bus write failed: {0}")]
    Write(String),

    #[error("Bus read failed: {0}")]
    Read(String),

    #[error("Platform not supported")]
    PlatformNotSupported,
}

/// Unified interface for a two-wire bus connection to a single device
pub trait I2cBus {
    /// Open the connection and address the device at the 7-bit `address`
    fn open(&mut self, address: u8) -> Result<(), BusError>;

    /// Write a single byte to the device
    fn write_byte(&mut self, value: u8) -> Result<(), BusError>;

    /// Write `value` into the device register `register`
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError>;

    /// Read a single byte from the device
    fn read_byte(&mut self) -> Result<u8, BusError>;

    /// Release the connection
    fn close(&mut self) {}
}

/// Blocking microsecond delay
pub trait Delay {
    fn delay_us(&mut self, us: u32);
}

/// Delay backed by `std::thread::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// Get the default bus for the current platform
#[cfg(target_os = "linux")]
pub fn get_bus(bus: u8) -> Result<RppalBus, BusError> {
    Ok(RppalBus::new(bus))
}

#[cfg(not(target_os = "linux"))]
pub fn get_bus(_bus: u8) -> Result<MockBus, BusError> {
    Err(BusError::PlatformNotSupported)
}
