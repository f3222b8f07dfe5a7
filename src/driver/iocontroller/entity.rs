//! commands understood by the io controller
use super::prelude::*;

/// one controller command, `payload()` renders the ascii sent between
/// the handshake and the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoCommandEnum {
    // L / N
    LocalMode(bool),
    // X / Y
    EchoMode(bool),
    // D / C
    AllDigitalOutputs(bool),
    // G / H
    SetBlockConnection { block: BlockIndex, connected: bool },
    GetBlockConnection { block: BlockIndex },
    SetDigitalOutput { output: ChannelIndex, level: bool },
    GetDigitalOutput { output: ChannelIndex },
    SetDigitalOutputByte { block: BlockIndex, value: u8 },
    GetDigitalOutputByte { block: BlockIndex },
    GetDigitalInputByte { block: BlockIndex },
    GetDigitalInput { input: ChannelIndex },
    SetAnalogOutput { channel: AnalogIndex, raw: RawAnalog },
    GetAnalogOutput { channel: AnalogIndex },
    GetAnalogInput { channel: AnalogIndex },
}

/// fixed width of a query reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    // single bit or connection flag
    Flag,
    // one byte of a digital block
    Byte,
    // analog voltage, volts with two decimals
    Voltage,
}

impl ReplyFormat {
    pub fn width(&self) -> usize {
        match self {
            ReplyFormat::Flag => 2,
            ReplyFormat::Byte => 5,
            ReplyFormat::Voltage => 6,
        }
    }
}

impl IoCommandEnum {
    pub fn payload(&self) -> String {
        match *self {
            IoCommandEnum::LocalMode(on) => switch_letter(on, 'L', 'N').to_string(),
            IoCommandEnum::EchoMode(on) => switch_letter(on, 'X', 'Y').to_string(),
            IoCommandEnum::AllDigitalOutputs(on) => switch_letter(on, 'D', 'C').to_string(),
            IoCommandEnum::SetBlockConnection { block, connected } => {
                format!("{}{}", switch_letter(connected, 'G', 'H'), block)
            }
            IoCommandEnum::GetBlockConnection { block } => format!("g{}", block),
            IoCommandEnum::SetDigitalOutput { output, level } => format!("A{},{}", output, level as u8),
            IoCommandEnum::GetDigitalOutput { output } => format!("a{}", output),
            IoCommandEnum::SetDigitalOutputByte { block, value } => format!("B{},{}", block, value),
            IoCommandEnum::GetDigitalOutputByte { block } => format!("b{}", block),
            IoCommandEnum::GetDigitalInputByte { block } => format!("f{}", block),
            IoCommandEnum::GetDigitalInput { input } => format!("e{}", input),
            IoCommandEnum::SetAnalogOutput { channel, raw } => format!("U{},{}", channel, raw),
            IoCommandEnum::GetAnalogOutput { channel } => format!("u{}", channel),
            IoCommandEnum::GetAnalogInput { channel } => format!("v{}", channel),
        }
    }

    /// reply the controller sends back, None for set commands
    pub fn reply(&self) -> Option<ReplyFormat> {
        match self {
            IoCommandEnum::GetBlockConnection { .. }
            | IoCommandEnum::GetDigitalOutput { .. }
            | IoCommandEnum::GetDigitalInput { .. } => Some(ReplyFormat::Flag),
            IoCommandEnum::GetDigitalOutputByte { .. }
            | IoCommandEnum::GetDigitalInputByte { .. } => Some(ReplyFormat::Byte),
            IoCommandEnum::GetAnalogOutput { .. }
            | IoCommandEnum::GetAnalogInput { .. } => Some(ReplyFormat::Voltage),
            _ => None,
        }
    }

    /// range check of every parameter, done before any byte hits the bus
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            IoCommandEnum::LocalMode(_)
            | IoCommandEnum::EchoMode(_)
            | IoCommandEnum::AllDigitalOutputs(_) => Ok(()),
            IoCommandEnum::SetBlockConnection { block, .. }
            | IoCommandEnum::GetBlockConnection { block }
            | IoCommandEnum::SetDigitalOutputByte { block, .. }
            | IoCommandEnum::GetDigitalOutputByte { block }
            | IoCommandEnum::GetDigitalInputByte { block } => check_range("block", block as u16, MAX_BLOCK as u16),
            IoCommandEnum::SetDigitalOutput { output, .. }
            | IoCommandEnum::GetDigitalOutput { output } => check_range("digital output", output as u16, MAX_CHANNEL as u16),
            IoCommandEnum::GetDigitalInput { input } => check_range("digital input", input as u16, MAX_CHANNEL as u16),
            IoCommandEnum::SetAnalogOutput { channel, raw } => {
                check_range("analog output", channel as u16, MAX_ANALOG as u16)?;
                check_range("analog value", raw, MAX_RAW_ANALOG)
            }
            IoCommandEnum::GetAnalogOutput { channel } => check_range("analog output", channel as u16, MAX_ANALOG as u16),
            IoCommandEnum::GetAnalogInput { channel } => check_range("analog input", channel as u16, MAX_ANALOG as u16),
        }
    }
}

fn switch_letter(on: bool, enable: char, disable: char) -> char {
    if on { enable } else { disable }
}

fn check_range(name: &str, value: u16, max: u16) -> Result<(), String> {
    if value <= max {
        Ok(())
    } else {
        Err(format!("parameter out of range: {} {} (0-{})", name, value, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_payloads() {
        assert_eq!(IoCommandEnum::LocalMode(true).payload(), "L");
        assert_eq!(IoCommandEnum::LocalMode(false).payload(), "N");
        assert_eq!(IoCommandEnum::EchoMode(true).payload(), "X");
        assert_eq!(IoCommandEnum::EchoMode(false).payload(), "Y");
        assert_eq!(IoCommandEnum::AllDigitalOutputs(true).payload(), "D");
        assert_eq!(IoCommandEnum::AllDigitalOutputs(false).payload(), "C");
    }

    #[test]
    fn test_parameter_payloads() {
        assert_eq!(IoCommandEnum::SetBlockConnection { block: 2, connected: true }.payload(), "G2");
        assert_eq!(IoCommandEnum::SetBlockConnection { block: 2, connected: false }.payload(), "H2");
        assert_eq!(IoCommandEnum::SetDigitalOutput { output: 16, level: true }.payload(), "A16,1");
        assert_eq!(IoCommandEnum::SetDigitalOutputByte { block: 2, value: 123 }.payload(), "B2,123");
        assert_eq!(IoCommandEnum::SetAnalogOutput { channel: 1, raw: 1000 }.payload(), "U1,1000");
        assert_eq!(IoCommandEnum::GetDigitalInputByte { block: 1 }.payload(), "f1");
        assert_eq!(IoCommandEnum::GetDigitalInput { input: 14 }.payload(), "e14");
        assert_eq!(IoCommandEnum::GetAnalogInput { channel: 1 }.payload(), "v1");
    }

    #[test]
    fn test_reply_widths() {
        assert_eq!(IoCommandEnum::GetBlockConnection { block: 0 }.reply().map(|r| r.width()), Some(2));
        assert_eq!(IoCommandEnum::GetDigitalOutputByte { block: 0 }.reply().map(|r| r.width()), Some(5));
        assert_eq!(IoCommandEnum::GetAnalogOutput { channel: 0 }.reply().map(|r| r.width()), Some(6));
        assert_eq!(IoCommandEnum::SetDigitalOutput { output: 0, level: true }.reply(), None);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(IoCommandEnum::SetDigitalOutput { output: 31, level: true }.validate().is_ok());
        assert!(IoCommandEnum::SetDigitalOutput { output: 32, level: true }.validate().is_err());
        assert!(IoCommandEnum::GetBlockConnection { block: 4 }.validate().is_err());
        assert!(IoCommandEnum::SetAnalogOutput { channel: 3, raw: 1023 }.validate().is_ok());
        assert!(IoCommandEnum::SetAnalogOutput { channel: 3, raw: 1024 }.validate().is_err());
    }

    #[test]
    fn test_analog_channel_99_rejected() {
        assert!(IoCommandEnum::GetAnalogInput { channel: 99 }.validate().is_err());
        assert!(IoCommandEnum::GetAnalogOutput { channel: 99 }.validate().is_err());
        assert!(IoCommandEnum::SetAnalogOutput { channel: 99, raw: 0 }.validate().is_err());
    }
}
