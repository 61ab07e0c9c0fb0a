//! Nunchuk device session
//!
//! This module owns the bus connection to the Nunchuk, performs the
//! initialization handshake for the selected mode, and runs read cycles:
//! request -> wait -> fetch 6 bytes -> decode -> unpack.

use crate::bus::{BusError, Delay, I2cBus};
use crate::nunchuk::constants::*;
use crate::nunchuk::frame::{decode_frame, parse_frame, RawFrame};
use crate::nunchuk::types::{NunchukData, RawNunchukData};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NunchukError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Nunchuk unavailable at address 0x{address:02X}: {source}")]
    DeviceUnavailable { address: u8, source: BusError },

    #[error("Failed to write to Nunchuk: {source}")]
    DeviceWrite { register: Option<u8>, source: BusError },

    #[error("Failed to read byte {index} of the frame: {source}")]
    DeviceRead { index: usize, source: BusError },
}

/// Initialization mode of the Nunchuk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Device returns "encrypted" bytes that are decoded on read
    #[serde(alias = "encrypted")]
    Obfuscated,
    /// Device returns bytes as-is
    #[serde(alias = "not_encrypted")]
    Plain,
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::Plain
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Obfuscated => write!(f, "obfuscated"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = NunchukError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obfuscated" | "encrypted" => Ok(Self::Obfuscated),
            "plain" | "not_encrypted" => Ok(Self::Plain),
            other => Err(NunchukError::Configuration(format!(
                "Invalid initialization mode '{}'",
                other
            ))),
        }
    }
}

/// Session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wait after every bus write before reading (microseconds, >= 300)
    pub adaptation_delay_us: u32,
    pub mode: SessionMode,
}

impl SessionConfig {
    /// Config with the default 500us adaptation delay
    pub fn new(mode: SessionMode) -> Self {
        Self::with_delay(DEFAULT_ADAPTATION_DELAY_US, mode)
    }

    pub fn with_delay(adaptation_delay_us: u32, mode: SessionMode) -> Self {
        Self {
            adaptation_delay_us,
            mode,
        }
    }

    pub fn validate(&self) -> Result<(), NunchukError> {
        if self.adaptation_delay_us < MINIMUM_ADAPTATION_DELAY_US {
            return Err(NunchukError::Configuration(format!(
                "The minimum circuit adaptation delay is {}us, got {}us",
                MINIMUM_ADAPTATION_DELAY_US, self.adaptation_delay_us
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(SessionMode::default())
    }
}

/// An initialized connection to a Nunchuk.
///
/// A value of this type only exists once the bus is open and the handshake
/// has been sent. The bus is closed when the reader is dropped.
pub struct NunchukReader<B: I2cBus, D: Delay> {
    bus: B,
    delay: D,
    config: SessionConfig,
}

impl<B: I2cBus, D: Delay> NunchukReader<B, D> {
    /// Open the bus and run the handshake for `config.mode`.
    ///
    /// Fails with [`NunchukError::Configuration`] before touching the bus if
    /// the adaptation delay is below the 300us floor.
    pub fn new(mut bus: B, mut delay: D, config: SessionConfig) -> Result<Self, NunchukError> {
        config.validate()?;

        bus.open(NUNCHUK_I2C_ADDRESS)
            .map_err(|source| NunchukError::DeviceUnavailable {
                address: NUNCHUK_I2C_ADDRESS,
                source,
            })?;

        if let Err(e) = send_handshake(&mut bus, config.mode) {
            bus.close();
            return Err(e);
        }
        delay.delay_us(config.adaptation_delay_us);

        info!(
            "Nunchuk ready at 0x{:02X} ({} mode, {}us adaptation delay)",
            NUNCHUK_I2C_ADDRESS, config.mode, config.adaptation_delay_us
        );

        Ok(Self { bus, delay, config })
    }

    /// Whether the device was initialized in obfuscated mode
    pub fn is_obfuscated(&self) -> bool {
        self.config.mode == SessionMode::Obfuscated
    }

    pub fn mode(&self) -> SessionMode {
        self.config.mode
    }

    pub fn adaptation_delay_us(&self) -> u32 {
        self.config.adaptation_delay_us
    }

    /// Run one read cycle and return the unpacked integer values.
    ///
    /// Takes at least the adaptation delay. On a failed byte read the cycle
    /// stops there and no sample is returned.
    pub fn read_raw_data(&mut self) -> Result<RawNunchukData, NunchukError> {
        let frame = self.fetch_frame()?;
        let decoded = decode_frame(&frame, self.is_obfuscated());
        Ok(parse_frame(&decoded))
    }

    /// Run one read cycle and return grouped values.
    pub fn read_device_values(&mut self) -> Result<NunchukData, NunchukError> {
        self.read_raw_data().map(NunchukData::from)
    }

    fn fetch_frame(&mut self) -> Result<RawFrame, NunchukError> {
        self.bus
            .write_byte(REQUEST_SAMPLE_BYTE)
            .map_err(|source| NunchukError::DeviceWrite {
                register: None,
                source,
            })?;
        self.delay.delay_us(self.config.adaptation_delay_us);

        let mut frame: RawFrame = [0; FRAME_LENGTH];
        for (index, byte) in frame.iter_mut().enumerate() {
            *byte = self
                .bus
                .read_byte()
                .map_err(|source| NunchukError::DeviceRead { index, source })?;
        }

        trace!("Frame: {:02X?}", frame);
        Ok(frame)
    }
}

impl<B: I2cBus, D: Delay> Drop for NunchukReader<B, D> {
    fn drop(&mut self) {
        debug!("Releasing Nunchuk bus connection");
        self.bus.close();
    }
}

/// Register writes selecting the mode; the caller waits once afterwards
fn send_handshake<B: I2cBus>(bus: &mut B, mode: SessionMode) -> Result<(), NunchukError> {
    match mode {
        SessionMode::Obfuscated => {
            write_register(bus, OBFUSCATED_INIT_REGISTER, OBFUSCATED_INIT_VALUE)
        }
        SessionMode::Plain => {
            write_register(bus, PLAIN_INIT_REGISTER_1, PLAIN_INIT_VALUE_1)?;
            write_register(bus, PLAIN_INIT_REGISTER_2, PLAIN_INIT_VALUE_2)
        }
    }
}

fn write_register<B: I2cBus>(bus: &mut B, register: u8, value: u8) -> Result<(), NunchukError> {
    debug!("Write register 0x{:02X} = 0x{:02X}", register, value);
    bus.write_register(register, value)
        .map_err(|source| NunchukError::DeviceWrite {
            register: Some(register),
            source,
        })
}
