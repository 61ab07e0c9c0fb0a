//! nunchuk-rs: Wii Nunchuk reader over I2C
//!
//! This library initializes a Nunchuk on a two-wire bus, in plain or
//! obfuscated mode, and decodes its 6-byte frames into joystick,
//! accelerometer and button values.

pub mod bus;
pub mod config;
pub mod manager;
pub mod nunchuk;

// Re-export commonly used items
pub use bus::{BusError, Delay, I2cBus, MockBus, MockDelay, StdDelay};
pub use config::Config;
pub use manager::{NunchukEvent, NunchukManager};
pub use nunchuk::{
    Accelerometer, Button, ButtonType, Joystick, NunchukData, NunchukError, NunchukReader,
    RawNunchukData, SessionConfig, SessionMode,
};
