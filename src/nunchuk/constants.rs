//! Nunchuk protocol constants
//!
//! This module contains the constants needed for Nunchuk communication:
//! - Bus address
//! - Handshake registers for each initialization mode
//! - Frame layout
//! - Timing

// ============================================================================
// Bus
// ============================================================================

/// Fixed 7-bit bus address of the Nunchuk
pub const NUNCHUK_I2C_ADDRESS: u8 = 0x52;

// ============================================================================
// Handshake
// ============================================================================

/// Obfuscated ("encrypted") mode: single register write
pub const OBFUSCATED_INIT_REGISTER: u8 = 0x40;
pub const OBFUSCATED_INIT_VALUE: u8 = 0x00;

/// Plain mode step 1
pub const PLAIN_INIT_REGISTER_1: u8 = 0xF0;
pub const PLAIN_INIT_VALUE_1: u8 = 0x55;

/// Plain mode step 2
pub const PLAIN_INIT_REGISTER_2: u8 = 0xFB;
pub const PLAIN_INIT_VALUE_2: u8 = 0x00;

/// Byte written to latch a new sample before each read
pub const REQUEST_SAMPLE_BYTE: u8 = 0x00;

// ============================================================================
// Frame
// ============================================================================

/// Number of bytes in one frame
pub const FRAME_LENGTH: usize = 6;

/// Key of the de-obfuscation transform
pub const OBFUSCATION_KEY: u16 = 0x17;

// Byte 5 packs the low accelerometer bits and both buttons
pub const ACCEL_X_LOW_MASK: u16 = 0xC0;
pub const ACCEL_Y_LOW_MASK: u16 = 0x30;
pub const ACCEL_Z_LOW_MASK: u16 = 0x0C;
pub const BUTTON_C_MASK: u16 = 0x02;
pub const BUTTON_Z_MASK: u16 = 0x01;

/// Raw button state meaning "pressed" (the bit is active-low)
pub const BUTTON_PRESSED_STATE: u8 = 0;

// ============================================================================
// Timing Constants
// ============================================================================

/// Minimum wait between a write and the following read (microseconds)
pub const MINIMUM_ADAPTATION_DELAY_US: u32 = 300;

/// Default wait between a write and the following read (microseconds)
pub const DEFAULT_ADAPTATION_DELAY_US: u32 = 500;
