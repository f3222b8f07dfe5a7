//! Serial port transport
//! blocking port opened through tokio_serial at the controller's fixed line
//! settings: 9600 baud, 8 data bits, 2 stop bits, no parity

use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::prelude::BAUDRATE;
use super::traits::SerialTransport;
use crate::common::error::DriverError;
use crate::{debug, info, trace};

const LOG_TAG: &str = "transport.rs | serial port";

pub struct PortTransport {
    serial_port: String,
    port: Option<Box<dyn SerialPort>>,
}

impl PortTransport {
    pub fn open(serial_port: &str) -> Result<Self, DriverError> {
        let port = tokio_serial::new(serial_port, BAUDRATE)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::Two)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|e| {
                DriverError::transport(format!(
                    "cannot open serial port: {}, err: {}",
                    serial_port, e
                ))
            })?;
        info!(LOG_TAG, "serial port opened on {}", serial_port);
        Ok(PortTransport {
            serial_port: serial_port.to_string(),
            port: Some(port),
        })
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, DriverError> {
        let serial_port = &self.serial_port;
        self.port
            .as_mut()
            .ok_or_else(|| DriverError::transport(format!("serial port {} is closed", serial_port)))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), DriverError> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }
}

impl SerialTransport for PortTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), DriverError> {
        trace!(LOG_TAG, "write byte: {:#04x}", byte);
        self.write_all(&[byte])
    }

    fn write_str(&mut self, text: &str) -> Result<(), DriverError> {
        trace!(LOG_TAG, "write text: {:?}", text);
        self.write_all(text.as_bytes())
    }

    fn read_bytes(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, DriverError> {
        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        let port = self.port()?;

        while filled < len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DriverError::timeout(format!(
                    "read {} of {} bytes within {:?}",
                    filled, len, timeout
                )));
            }
            port.set_timeout(remaining)?;
            match port.read(&mut buf[filled..]) {
                Ok(0) => {}
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        trace!(LOG_TAG, "read bytes: {:?}", &buf);
        Ok(buf)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        let mut port = self.port.take().ok_or_else(|| {
            DriverError::transport(format!("serial port {} already closed", self.serial_port))
        })?;
        port.flush()?;
        drop(port);
        debug!(LOG_TAG, "serial port {} closed", self.serial_port);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorCode;
    use crate::common::logger::init_logger;

    #[test]
    fn test_open_missing_port() {
        let _ = init_logger();
        let result = PortTransport::open("/dev/this-port-does-not-exist");
        assert_eq!(result.err().map(|e| e.code), Some(ErrorCode::TransportError));
    }
}
