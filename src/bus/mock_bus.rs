//! Mock bus for testing.
//!
//! This backend logs bus operations instead of touching hardware and
//! records them so tests can assert on the exact sequence the reader
//! issued. Reads are served from a scripted queue.

use crate::bus::{BusError, Delay, I2cBus};
use log::info;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A single recorded bus operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Open(u8),
    WriteByte(u8),
    WriteRegister { register: u8, value: u8 },
    ReadByte,
    Delay(u32),
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    ops: Vec<BusOp>,
    reads: VecDeque<Result<u8, BusError>>,
    open_error: Option<BusError>,
    write_error: Option<BusError>,
}

/// Mock bus that records operations instead of sending them.
///
/// Clones share the same state, so a test can keep one handle while the
/// reader owns the other.
#[derive(Clone, Debug, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockState>>,
}

impl MockBus {
    /// Create a new mock bus with an empty read script.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a full 6-byte frame to be returned by the next six reads.
    pub fn queue_frame(&self, frame: [u8; 6]) {
        let mut state = self.state();
        state.reads.extend(frame.iter().copied().map(Ok));
    }

    /// Queue individual bytes to be returned by subsequent reads.
    pub fn queue_bytes(&self, bytes: &[u8]) {
        let mut state = self.state();
        state.reads.extend(bytes.iter().copied().map(Ok));
    }

    /// Queue a failing read.
    pub fn queue_read_error(&self, message: &str) {
        self.state().reads.push_back(Err(BusError::Read(message.to_string())));
    }

    /// Make the next `open` fail.
    pub fn fail_open(&self, message: &str) {
        self.state().open_error = Some(BusError::Open(message.to_string()));
    }

    /// Make every write fail.
    pub fn fail_writes(&self, message: &str) {
        self.state().write_error = Some(BusError::Write(message.to_string()));
    }

    /// Snapshot of all recorded operations, in order.
    pub fn operations(&self) -> Vec<BusOp> {
        self.state().ops.clone()
    }

    /// Recorded register writes as `(register, value)` pairs.
    pub fn register_writes(&self) -> Vec<(u8, u8)> {
        self.state()
            .ops
            .iter()
            .filter_map(|op| match *op {
                BusOp::WriteRegister { register, value } => Some((register, value)),
                _ => None,
            })
            .collect()
    }

    /// Number of reads issued so far.
    pub fn read_count(&self) -> usize {
        self.state().ops.iter().filter(|op| **op == BusOp::ReadByte).count()
    }

    /// Number of scripted reads not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.state().reads.len()
    }

    /// Forget all recorded operations (the read script is kept).
    pub fn clear_operations(&self) {
        self.state().ops.clear();
    }

    /// A delay that records into this bus's operation log.
    pub fn delay(&self) -> MockDelay {
        MockDelay { state: Arc::clone(&self.state) }
    }
}

impl I2cBus for MockBus {
    fn open(&mut self, address: u8) -> Result<(), BusError> {
        info!("[MOCK BUS] Open address 0x{:02X}", address);
        let mut state = self.state();
        state.ops.push(BusOp::Open(address));
        match state.open_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        info!("[MOCK BUS] Write byte 0x{:02X}", value);
        let mut state = self.state();
        state.ops.push(BusOp::WriteByte(value));
        match &state.write_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        info!("[MOCK BUS] Write register 0x{:02X} = 0x{:02X}", register, value);
        let mut state = self.state();
        state.ops.push(BusOp::WriteRegister { register, value });
        match &state.write_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn read_byte(&mut self) -> Result<u8, BusError> {
        let mut state = self.state();
        state.ops.push(BusOp::ReadByte);
        let result = state
            .reads
            .pop_front()
            .unwrap_or_else(|| Err(BusError::Read("no scripted data".to_string())));
        info!("[MOCK BUS] Read byte -> {:?}", result);
        result
    }

    fn close(&mut self) {
        info!("[MOCK BUS] Close");
        self.state().ops.push(BusOp::Close);
    }
}

/// Mock delay that records the requested durations instead of sleeping.
#[derive(Clone, Debug, Default)]
pub struct MockDelay {
    state: Arc<Mutex<MockState>>,
}

impl MockDelay {
    /// Create a standalone mock delay with its own log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in microseconds.
    pub fn delays(&self) -> Vec<u32> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .ops
            .iter()
            .filter_map(|op| match *op {
                BusOp::Delay(us) => Some(us),
                _ => None,
            })
            .collect()
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        info!("[MOCK BUS] Delay {}us", us);
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .ops
            .push(BusOp::Delay(us));
    }
}
