use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fmt;
use std::io;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    // unknown error
    UnknownError = 1000,
    // io address not in the allowed set
    ConfigurationError = 2001,
    // parameter out of range, nothing was sent
    ValidationError = 2002,
    // serial port io failure
    TransportError = 2003,
    // bounded read ran past its deadline
    TimeoutError = 2004,
    // ready handshake never saw the ready status
    UnresponsiveError = 2005,
    // reply could not be parsed
    ParseError = 2006,
    // operation issued before the port was opened
    NotOpenError = 2007,
}

/// driver error, carries a code so callers can tell a rejected parameter
/// from a dead bus
#[derive(Debug)]
pub struct DriverError {
    pub code: ErrorCode,
    pub msg: String,
}

impl DriverError {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        DriverError { code, msg: msg.into() }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, msg)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, msg)
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TimeoutError, msg)
    }

    pub fn unresponsive(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnresponsiveError, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn not_open(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotOpenError, msg)
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::TimeoutError
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "io controller driver error code: {}, msg: {}", self.code as u16, self.msg)
    }
}

impl Error for DriverError {}

impl From<io::Error> for DriverError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => DriverError::timeout(format!("serial read timed out: {}", e)),
            _ => DriverError::transport(format!("serial io failed: {}", e)),
        }
    }
}

impl From<tokio_serial::Error> for DriverError {
    fn from(e: tokio_serial::Error) -> Self {
        match e.kind() {
            tokio_serial::ErrorKind::Io(io::ErrorKind::TimedOut) => {
                DriverError::timeout(format!("serial port timed out: {}", e))
            }
            _ => DriverError::transport(format!("serial port error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let err: DriverError = io::Error::new(io::ErrorKind::TimedOut, "late").into();
        assert_eq!(err.code, ErrorCode::TimeoutError);
        assert!(err.is_timeout());
    }

    #[test]
    fn test_io_failure_maps_to_transport() {
        let err: DriverError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert_eq!(err.code, ErrorCode::TransportError);
    }

    #[test]
    fn test_display_carries_code() {
        let err = DriverError::validation("block 7");
        assert_eq!(err.to_string(), "io controller driver error code: 2002, msg: block 7");
    }
}
