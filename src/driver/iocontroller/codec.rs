//! reply parsing and formatting
//! replies are fixed width ascii numbers, right aligned and space padded,
//! e.g. " 1", "  123", "  7.50"

use super::entity::ReplyFormat;
use crate::common::error::DriverError;

fn reply_text(raw: &[u8]) -> Result<&str, DriverError> {
    std::str::from_utf8(raw)
        .map(|s| s.trim())
        .map_err(|e| DriverError::parse(format!("reply is not ascii: {:?}, err: {}", raw, e)))
}

pub fn parse_integer(raw: &[u8]) -> Result<i64, DriverError> {
    let text = reply_text(raw)?;
    text.parse::<i64>()
        .map_err(|e| DriverError::parse(format!("reply {:?} is not an integer: {}", text, e)))
}

/// 0 or 1
pub fn parse_flag(raw: &[u8]) -> Result<bool, DriverError> {
    match parse_integer(raw)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DriverError::parse(format!("flag reply out of range: {}", other))),
    }
}

/// 0-255
pub fn parse_byte(raw: &[u8]) -> Result<u8, DriverError> {
    let value = parse_integer(raw)?;
    u8::try_from(value).map_err(|_| DriverError::parse(format!("byte reply out of range: {}", value)))
}

/// volts
pub fn parse_voltage(raw: &[u8]) -> Result<f64, DriverError> {
    let text = reply_text(raw)?;
    text.parse::<f64>()
        .map_err(|e| DriverError::parse(format!("reply {:?} is not a voltage: {}", text, e)))
}

pub fn format_flag(value: bool) -> String {
    format!("{:>width$}", value as u8, width = ReplyFormat::Flag.width())
}

pub fn format_byte(value: u8) -> String {
    format!("{:>width$}", value, width = ReplyFormat::Byte.width())
}

pub fn format_voltage(raw: u16) -> String {
    format!("{:>width$.2}", raw as f64 / 100.0, width = ReplyFormat::Voltage.width())
}
