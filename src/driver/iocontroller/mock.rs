//! recording transport for tests
//! every call lands in a shared wire log, status bytes and replies are scripted

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::prelude::{STATUS_PROBE, STATUS_READY};
use super::traits::SerialTransport;
use crate::common::error::DriverError;

#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    Byte(u8),
    Text(String),
    Read(usize),
    Pause(Duration),
    Close,
}

#[derive(Default)]
pub struct MockTransport {
    log: Arc<Mutex<Vec<WireEvent>>>,
    status: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    fail_write_at: Option<usize>,
    writes: usize,
    probe_pending: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// status bytes handed out to the ready polls, ready once exhausted
    pub fn with_status(mut self, status: &[u8]) -> Self {
        self.status.extend(status.iter().copied());
        self
    }

    pub fn with_reply(mut self, reply: &[u8]) -> Self {
        self.replies.push_back(reply.to_vec());
        self
    }

    /// the write with this zero based index fails, the ones after it succeed
    pub fn failing_at(mut self, write: usize) -> Self {
        self.fail_write_at = Some(write);
        self
    }

    pub fn log(&self) -> Arc<Mutex<Vec<WireEvent>>> {
        self.log.clone()
    }

    fn record(&self, event: WireEvent) {
        self.log.lock().unwrap().push(event);
    }

    fn write(&mut self, event: WireEvent) -> Result<(), DriverError> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(index) {
            return Err(DriverError::transport("mock write failed"));
        }
        self.record(event);
        Ok(())
    }
}

impl SerialTransport for MockTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), DriverError> {
        self.write(WireEvent::Byte(byte))?;
        self.probe_pending = byte == STATUS_PROBE;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DriverError> {
        self.write(WireEvent::Text(text.to_string()))
    }

    fn read_bytes(&mut self, len: usize, _timeout: Duration) -> Result<Vec<u8>, DriverError> {
        self.record(WireEvent::Read(len));
        if self.probe_pending {
            self.probe_pending = false;
            return Ok(vec![self.status.pop_front().unwrap_or(STATUS_READY)]);
        }
        self.replies
            .pop_front()
            .ok_or_else(|| DriverError::timeout("mock has no reply"))
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.record(WireEvent::Close);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.record(WireEvent::Pause(duration));
    }
}
