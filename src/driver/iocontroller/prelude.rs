//! wire constants and index types of the io controller command set

/// address selecting the controller; address + 1 deselects it
pub type IoAddress = u8;
/// digital input or output channel, 0-31
pub type ChannelIndex = u8;
/// group of 8 digital channels, or a connection block, 0-3
pub type BlockIndex = u8;
/// analog input or output channel, 0-3
pub type AnalogIndex = u8;
/// analog value in 0.01 V units, 0-1023
pub type RawAnalog = u16;

pub const IO_ADDRESSES: [IoAddress; 4] = [144, 146, 148, 150];
pub const DEFAULT_IO_ADDRESS: IoAddress = 144;
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/ttyS0";

pub const BAUDRATE: u32 = 9600;

pub const MAX_CHANNEL: ChannelIndex = 31;
pub const MAX_BLOCK: BlockIndex = 3;
pub const MAX_ANALOG: AnalogIndex = 3;
pub const MAX_RAW_ANALOG: RawAnalog = 1023;

pub const STATUS_PROBE: u8 = 0x00;
pub const STATUS_READY: u8 = 0x16;
pub const RESET_PREFIX: u8 = 0x18;
pub const TERMINATOR: u8 = 0x0D;

pub fn is_valid_address(address: IoAddress) -> bool {
    IO_ADDRESSES.contains(&address)
}

pub fn deselect_address(address: IoAddress) -> u8 {
    address + 1
}
