//! Wii Nunchuk support
//!
//! This module provides the Nunchuk integration:
//! - Initialization handshake (plain or obfuscated mode)
//! - Read cycle with the fixed timing contract
//! - Frame de-obfuscation and unpacking
//! - Grouped value types

pub mod constants;
pub mod types;
pub mod frame;
pub mod reader;

// Re-export commonly used items
pub use constants::*;
pub use types::*;
pub use frame::*;
pub use reader::*;
