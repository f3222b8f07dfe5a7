use std::{thread, time::Duration};

use crate::common::error::DriverError;

/// byte level access to the half duplex line the controller hangs on
pub trait SerialTransport {
    /// write one raw byte (address, probe, terminator)
    fn write_byte(&mut self, byte: u8) -> Result<(), DriverError>;

    /// write ascii command text
    fn write_str(&mut self, text: &str) -> Result<(), DriverError>;

    /// read exactly `len` bytes, Timeout error when not satisfied in time
    fn read_bytes(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;

    /// settle delay between protocol steps
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
