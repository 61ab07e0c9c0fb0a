//! Frame decoding
//!
//! A frame is the 6-byte payload returned by one read cycle:
//!
//! | Byte | Content                                            |
//! |------|----------------------------------------------------|
//! | 0    | Joystick X                                         |
//! | 1    | Joystick Y                                         |
//! | 2    | Accelerometer X, bits 9..2                         |
//! | 3    | Accelerometer Y, bits 9..2                         |
//! | 4    | Accelerometer Z, bits 9..2                         |
//! | 5    | AX1 AX0 AY1 AY0 AZ1 AZ0 C Z (MSB to LSB)           |
//!
//! In obfuscated mode every byte goes through [`deobfuscate`] first.

use crate::nunchuk::constants::*;
use crate::nunchuk::types::RawNunchukData;

/// Raw frame as fetched from the bus
pub type RawFrame = [u8; FRAME_LENGTH];

/// Frame after the optional de-obfuscation step
pub type DecodedFrame = [u16; FRAME_LENGTH];

/// Undo the device's "encryption" on a single byte.
///
/// The result is not masked back to 8 bits: bytes from 0xE9 to 0xFE decode
/// to values above 0xFF.
pub fn deobfuscate(byte: u8) -> u16 {
    (u16::from(byte) ^ OBFUSCATION_KEY) + OBFUSCATION_KEY
}

/// Apply the mode's byte transform to a whole frame.
pub fn decode_frame(frame: &RawFrame, obfuscated: bool) -> DecodedFrame {
    frame.map(|byte| {
        if obfuscated {
            deobfuscate(byte)
        } else {
            u16::from(byte)
        }
    })
}

/// Unpack a decoded frame into its seven fields.
pub fn parse_frame(frame: &DecodedFrame) -> RawNunchukData {
    let [b0, b1, b2, b3, b4, b5] = *frame;

    RawNunchukData {
        joystick_x: b0,
        joystick_y: b1,
        accel_x: (b2 << 2) | ((b5 & ACCEL_X_LOW_MASK) >> 6),
        accel_y: (b3 << 2) | ((b5 & ACCEL_Y_LOW_MASK) >> 4),
        accel_z: (b4 << 2) | ((b5 & ACCEL_Z_LOW_MASK) >> 2),
        // Single bits, always fit
        button_c: ((b5 & BUTTON_C_MASK) >> 1) as u8,
        button_z: (b5 & BUTTON_Z_MASK) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deobfuscate_known_vectors() {
        assert_eq!(deobfuscate(0x00), 0x2E);
        assert_eq!(deobfuscate(0xFF), 0xFF);
        assert_eq!(deobfuscate(0x17), 0x17);
    }

    #[test]
    fn deobfuscate_is_not_masked() {
        // 0xE8 ^ 0x17 = 0xFF, + 0x17 = 0x116
        assert_eq!(deobfuscate(0xE8), 0x116);
        assert_eq!(deobfuscate(0xE9), 0x115);
        assert!((0u8..=255).any(|b| deobfuscate(b) > 0xFF));
    }

    #[test]
    fn parse_reference_frame() {
        let frame = decode_frame(&[0x10, 0x20, 0x30, 0x40, 0x50, 0xC3], false);
        let raw = parse_frame(&frame);

        assert_eq!(raw.joystick_x, 0x10);
        assert_eq!(raw.joystick_y, 0x20);
        assert_eq!(raw.accel_x, 195);
        assert_eq!(raw.accel_y, 256);
        assert_eq!(raw.accel_z, 320);
        // 0xC3 = 0b1100_0011: bit 1 and bit 0 are both set
        assert_eq!(raw.button_c, 1);
        assert_eq!(raw.button_z, 1);
    }

    #[test]
    fn low_bits_route_to_their_axis() {
        let raw = parse_frame(&[0, 0, 0, 0, 0, 0b0100_0000]);
        assert_eq!((raw.accel_x, raw.accel_y, raw.accel_z), (1, 0, 0));

        let raw = parse_frame(&[0, 0, 0, 0, 0, 0b0010_0000]);
        assert_eq!((raw.accel_x, raw.accel_y, raw.accel_z), (0, 2, 0));

        let raw = parse_frame(&[0, 0, 0, 0, 0, 0b0000_1100]);
        assert_eq!((raw.accel_x, raw.accel_y, raw.accel_z), (0, 0, 3));
    }

    #[test]
    fn buttons_pressed_when_bits_clear() {
        let raw = parse_frame(&[0, 0, 0, 0, 0, 0b1111_1100]);
        assert_eq!(raw.button_c, 0);
        assert_eq!(raw.button_z, 0);

        let raw = parse_frame(&[0, 0, 0, 0, 0, 0b0000_0010]);
        assert_eq!(raw.button_c, 1);
        assert_eq!(raw.button_z, 0);
    }

    #[test]
    fn accelerometer_full_scale_is_ten_bits() {
        let raw = parse_frame(&[0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(raw.accel_x, 1023);
        assert_eq!(raw.accel_y, 1023);
        assert_eq!(raw.accel_z, 1023);
    }

    #[test]
    fn obfuscated_frame_decodes_each_byte() {
        let frame = decode_frame(&[0x00, 0xFF, 0x17, 0xE8, 0x00, 0x00], true);
        assert_eq!(frame, [0x2E, 0xFF, 0x17, 0x116, 0x2E, 0x2E]);

        let plain = decode_frame(&[0x00, 0xFF, 0x17, 0xE8, 0x00, 0x00], false);
        assert_eq!(plain, [0x00, 0xFF, 0x17, 0xE8, 0x00, 0x00]);
    }

    #[test]
    fn obfuscated_values_are_not_truncated() {
        // b2 = 0xE8 decodes to 0x116; shifting keeps the ninth bit
        let frame = decode_frame(&[0, 0, 0xE8, 0, 0, 0], true);
        let raw = parse_frame(&frame);
        assert_eq!(raw.accel_x, (0x116 << 2) | ((0x2E & 0xC0) >> 6));
    }
}
