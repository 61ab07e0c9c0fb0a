//! Raspberry Pi I2C bus backend
//!
//! Talks to `/dev/i2c-N` through `rppal` using SMBus primitives:
//! send byte, receive byte and write byte data.

use crate::bus::{BusError, I2cBus};
use log::{debug, info};
use rppal::i2c::I2c;

/// I2C bus on a Raspberry Pi
pub struct RppalBus {
    bus: u8,
    i2c: Option<I2c>,
}

impl RppalBus {
    /// Create a backend for `/dev/i2c-{bus}`; nothing is opened until `open`.
    pub fn new(bus: u8) -> Self {
        Self { bus, i2c: None }
    }

    fn device(&self) -> Result<&I2c, BusError> {
        self.i2c
            .as_ref()
            .ok_or_else(|| BusError::Open(format!("/dev/i2c-{} is not open", self.bus)))
    }
}

impl I2cBus for RppalBus {
    fn open(&mut self, address: u8) -> Result<(), BusError> {
        let mut i2c = I2c::with_bus(self.bus)
            .map_err(|e| BusError::Open(format!("/dev/i2c-{}: {}", self.bus, e)))?;
        i2c.set_slave_address(u16::from(address))
            .map_err(|e| BusError::Open(format!("address 0x{:02X}: {}", address, e)))?;

        info!("Opened /dev/i2c-{} at address 0x{:02X}", self.bus, address);
        self.i2c = Some(i2c);
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        self.device()?
            .smbus_send_byte(value)
            .map_err(|e| BusError::Write(e.to_string()))
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.device()?
            .smbus_write_byte(register, value)
            .map_err(|e| BusError::Write(format!("register 0x{:02X}: {}", register, e)))
    }

    fn read_byte(&mut self) -> Result<u8, BusError> {
        self.device()?
            .smbus_receive_byte()
            .map_err(|e| BusError::Read(e.to_string()))
    }

    fn close(&mut self) {
        if self.i2c.take().is_some() {
            debug!("Closed /dev/i2c-{}", self.bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_before_open_is_rejected() {
        let mut bus = RppalBus::new(1);
        assert!(matches!(bus.write_byte(0x00), Err(BusError::Open(_))));
        assert!(matches!(bus.read_byte(), Err(BusError::Open(_))));
    }
}
