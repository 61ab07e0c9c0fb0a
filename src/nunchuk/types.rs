//! Nunchuk type definitions
//!
//! This module defines the data types handed out by the reader: the flat
//! raw sample unpacked from one frame, and the grouped values built from it.

use crate::nunchuk::constants::BUTTON_PRESSED_STATE;
use serde::{Deserialize, Serialize};

/// Integer values unpacked from one frame.
///
/// Decoded bytes may exceed 8 bits in obfuscated mode, so every field is
/// kept as `u16`. Button fields are the raw bit: 0 = pressed, 1 = released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNunchukData {
    pub joystick_x: u16,
    pub joystick_y: u16,
    /// 10-bit
    pub accel_x: u16,
    /// 10-bit
    pub accel_y: u16,
    /// 10-bit
    pub accel_z: u16,
    pub button_c: u8,
    pub button_z: u8,
}

/// Joystick position (raw, 0-255 in plain mode)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joystick {
    pub x: u16,
    pub y: u16,
}

/// Accelerometer reading (raw 10-bit values, not converted to g)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerometer {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

/// Button state as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Raw bit: 0 = pressed, 1 = released
    pub state: u8,
}

impl Button {
    pub fn new(state: u8) -> Self {
        Self { state }
    }

    pub fn is_pressed(&self) -> bool {
        self.state == BUTTON_PRESSED_STATE
    }
}

impl Default for Button {
    fn default() -> Self {
        // Released
        Self { state: 1 }
    }
}

/// Button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonType {
    C,
    Z,
}

/// Grouped Nunchuk values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NunchukData {
    pub joystick: Joystick,
    pub accelerometer: Accelerometer,
    pub button_c: Button,
    pub button_z: Button,
}

impl NunchukData {
    pub fn button(&self, button: ButtonType) -> Button {
        match button {
            ButtonType::C => self.button_c,
            ButtonType::Z => self.button_z,
        }
    }
}

impl From<RawNunchukData> for NunchukData {
    fn from(raw: RawNunchukData) -> Self {
        Self {
            joystick: Joystick {
                x: raw.joystick_x,
                y: raw.joystick_y,
            },
            accelerometer: Accelerometer {
                x: raw.accel_x,
                y: raw.accel_y,
                z: raw.accel_z,
            },
            button_c: Button::new(raw.button_c),
            button_z: Button::new(raw.button_z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_only_groups_values() {
        let raw = RawNunchukData {
            joystick_x: 0x10,
            joystick_y: 0x20,
            accel_x: 195,
            accel_y: 256,
            accel_z: 320,
            button_c: 0,
            button_z: 1,
        };

        let data = NunchukData::from(raw);
        assert_eq!(data.joystick, Joystick { x: 0x10, y: 0x20 });
        assert_eq!(data.accelerometer, Accelerometer { x: 195, y: 256, z: 320 });
        assert_eq!(data.button_c.state, 0);
        assert_eq!(data.button_z.state, 1);
    }

    #[test]
    fn button_bit_is_active_low() {
        assert!(Button::new(0).is_pressed());
        assert!(!Button::new(1).is_pressed());
        assert!(!Button::default().is_pressed());
    }

    #[test]
    fn button_lookup_by_type() {
        let data = NunchukData {
            button_c: Button::new(0),
            ..Default::default()
        };
        assert!(data.button(ButtonType::C).is_pressed());
        assert!(!data.button(ButtonType::Z).is_pressed());
    }
}
