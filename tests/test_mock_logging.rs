//! Test to verify the mock bus logs output correctly

use nunchuk_rs::bus::{I2cBus, MockBus};
use nunchuk_rs::{NunchukReader, SessionConfig, SessionMode};

#[test]
fn test_mock_bus_logs() {
    // Initialize a simple logger for testing
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut bus = MockBus::new();
    bus.queue_bytes(&[0x42]);

    // These should log at info level (visible with RUST_LOG=info)
    assert!(bus.open(0x52).is_ok());
    assert!(bus.write_register(0xF0, 0x55).is_ok());
    assert!(bus.write_byte(0x00).is_ok());
    assert_eq!(bus.read_byte(), Ok(0x42));
    bus.close();
}

#[test]
fn test_reader_logs_with_mock_bus() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();

    let bus = MockBus::new();
    let mut reader = NunchukReader::new(bus.clone(), bus.delay(), SessionConfig::new(SessionMode::Obfuscated))
        .expect("handshake");
    bus.queue_frame([0x17; 6]);

    assert!(reader.read_raw_data().is_ok());
}
