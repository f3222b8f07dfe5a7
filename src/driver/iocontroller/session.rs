//! IO controller session
//! Owns the transport and runs every command through the same envelope:
//! select -> ready handshake -> payload -> terminator -> (reply) -> settle -> deselect
//!
//! - parameters are range checked before anything is written
//! - deselect runs on every path once the select byte went out
//! - the ready handshake gives up after `max_ready_polls` polls

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use super::codec::{parse_byte, parse_flag, parse_voltage};
use super::dummy::DummyController;
use super::entity::IoCommandEnum;
use super::prelude::*;
use super::traits::SerialTransport;
use super::transport::PortTransport;
use crate::common::error::DriverError;
use crate::common::setting::{self, Settings};
use crate::{debug, error, info, trace, warn};

const LOG_TAG: &str = "session.rs | io controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle: Duration,
    pub status_timeout: Duration,
    pub read_timeout: Duration,
    pub max_ready_polls: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing::from(&setting::Timing::default())
    }
}

impl From<&setting::Timing> for Timing {
    fn from(timing: &setting::Timing) -> Self {
        Timing {
            settle: Duration::from_millis(timing.settle_ms),
            status_timeout: Duration::from_millis(timing.status_timeout_ms),
            read_timeout: Duration::from_millis(timing.read_timeout_ms),
            max_ready_polls: timing.max_ready_polls.max(1),
        }
    }
}

type BoxedTransport = Box<dyn SerialTransport + Send>;
type TransportRef<'a> = &'a mut (dyn SerialTransport + Send + 'static);

pub struct IoController {
    serial_device: String,
    io_address: IoAddress,
    timing: Timing,
    transport: Option<BoxedTransport>,
}

impl Default for IoController {
    fn default() -> Self {
        IoController {
            serial_device: DEFAULT_SERIAL_DEVICE.to_string(),
            io_address: DEFAULT_IO_ADDRESS,
            timing: Timing::default(),
            transport: None,
        }
    }
}

impl Display for IoController {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "IOController{{serialDevice='{}', ioAddress={}}}", self.serial_device, self.io_address)
    }
}

/// selected device window, writes the deselect address when released or dropped
struct Selection<'a> {
    transport: TransportRef<'a>,
    deselect: u8,
    released: bool,
}

impl<'a> Selection<'a> {
    fn select(transport: TransportRef<'a>, address: IoAddress) -> Result<Self, DriverError> {
        trace!(LOG_TAG, "select controller {}", address);
        transport.write_byte(address)?;
        Ok(Selection {
            transport,
            deselect: deselect_address(address),
            released: false,
        })
    }

    fn transport(&mut self) -> TransportRef<'_> {
        &mut *self.transport
    }

    fn release(mut self) -> Result<(), DriverError> {
        self.released = true;
        trace!(LOG_TAG, "deselect controller with {}", self.deselect);
        self.transport.write_byte(self.deselect)
    }
}

impl<'a> Drop for Selection<'a> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!(LOG_TAG, "exchange aborted, deselecting controller with {}", self.deselect);
        if let Err(e) = self.transport.write_byte(self.deselect) {
            error!(LOG_TAG, "cannot deselect controller: {}", e);
        }
    }
}

/// poll with a null probe until the controller answers the ready status
fn wait_until_ready<T: SerialTransport + ?Sized>(transport: &mut T, timing: &Timing) -> Result<(), DriverError> {
    for poll in 1..=timing.max_ready_polls {
        transport.pause(timing.settle);
        transport.write_byte(STATUS_PROBE)?;
        match transport.read_bytes(1, timing.status_timeout) {
            Ok(status) => {
                let code = status.first().copied().unwrap_or(STATUS_PROBE);
                trace!(LOG_TAG, "status received from controller: {:x}H", code);
                if code == STATUS_READY {
                    debug!(LOG_TAG, "controller ready after {} poll(s)", poll);
                    return Ok(());
                }
            }
            // a busy controller may stay silent, count it as not ready
            Err(e) if e.is_timeout() => {
                trace!(LOG_TAG, "no status on poll {}: {}", poll, e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(DriverError::unresponsive(format!(
        "controller not ready after {} polls",
        timing.max_ready_polls
    )))
}

impl IoController {
    pub fn new(serial_device: &str, io_address: IoAddress) -> Result<Self, DriverError> {
        if !is_valid_address(io_address) {
            return Err(DriverError::configuration(format!(
                "io address {} not one of {:?}",
                io_address, IO_ADDRESSES
            )));
        }
        Ok(IoController {
            serial_device: serial_device.to_string(),
            io_address,
            ..Default::default()
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, DriverError> {
        Ok(IoController::new(settings.serial.device.as_str(), settings.serial.io_address)?
            .with_timing(Timing::from(&settings.timing)))
    }

    /// session on an already open transport
    pub fn with_transport(serial_device: &str, io_address: IoAddress, transport: BoxedTransport) -> Result<Self, DriverError> {
        let mut controller = IoController::new(serial_device, io_address)?;
        controller.transport = Some(transport);
        Ok(controller)
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn serial_device(&self) -> &str {
        &self.serial_device
    }

    /// takes effect at the next open
    pub fn set_serial_device(&mut self, serial_device: &str) {
        self.serial_device = serial_device.to_string();
    }

    pub fn io_address(&self) -> IoAddress {
        self.io_address
    }

    /// 144, 146, 148 or 150; anything else leaves the address unchanged
    pub fn set_io_address(&mut self, io_address: IoAddress) -> Result<(), DriverError> {
        if !is_valid_address(io_address) {
            warn!(LOG_TAG, "parameter out of range: io address {}, keeping {}", io_address, self.io_address);
            return Err(DriverError::configuration(format!(
                "io address {} not one of {:?}",
                io_address, IO_ADDRESSES
            )));
        }
        self.io_address = io_address;
        info!(LOG_TAG, "device address set to {}", io_address);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// open the configured serial device, `mode=dummy` attaches a simulated controller
    pub fn open_transport(&mut self) -> Result<(), DriverError> {
        if self.transport.is_some() {
            self.close_transport()?;
        }

        let env_mode = std::env::var("mode").unwrap_or("real".to_string());
        let transport: BoxedTransport = if env_mode == "dummy" {
            Box::new(DummyController::new(self.io_address))
        } else {
            Box::new(PortTransport::open(self.serial_device.as_str()).map_err(|e| {
                error!(LOG_TAG, "open serial port {} failed: {}", self.serial_device, e);
                e
            })?)
        };
        self.transport = Some(transport);
        info!(LOG_TAG, "session opened on {}", self.serial_device);
        Ok(())
    }

    pub fn close_transport(&mut self) -> Result<(), DriverError> {
        let mut transport = self.transport.take().ok_or_else(|| {
            DriverError::not_open(format!("serial port {} is not open", self.serial_device))
        })?;
        transport.close()?;
        info!(LOG_TAG, "serial port closed");
        Ok(())
    }

    /// reset has no handshake and no deselect, the controller reinitialises
    pub fn reset_controller(&mut self) -> Result<(), DriverError> {
        let address = self.io_address;
        let settle = self.timing.settle;
        let transport = self.transport_mut()?;
        transport.write_byte(address)?;
        transport.write_byte(RESET_PREFIX)?;
        transport.write_str("R")?;
        transport.write_byte(TERMINATOR)?;
        transport.pause(settle);
        info!(LOG_TAG, "controller reset");
        Ok(())
    }

    pub fn set_local_mode(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(IoCommandEnum::LocalMode(on))?;
        info!(LOG_TAG, "local mode set to {}", on as u8);
        Ok(())
    }

    pub fn set_echo_mode(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(IoCommandEnum::EchoMode(on))?;
        info!(LOG_TAG, "echo mode set to {}", on as u8);
        Ok(())
    }

    pub fn set_all_digital_outputs(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(IoCommandEnum::AllDigitalOutputs(on))?;
        info!(LOG_TAG, "all digital outputs set to {}", on as u8);
        Ok(())
    }

    pub fn set_block_connection(&mut self, block: BlockIndex, connected: bool) -> Result<(), DriverError> {
        self.send(IoCommandEnum::SetBlockConnection { block, connected })?;
        info!(LOG_TAG, "block connection on block {} set to {}", block, connected as u8);
        Ok(())
    }

    pub fn get_block_connection(&mut self, block: BlockIndex) -> Result<bool, DriverError> {
        let connected = parse_flag(&self.query(IoCommandEnum::GetBlockConnection { block })?)?;
        info!(LOG_TAG, "block connection on block {} is {}", block, connected as u8);
        Ok(connected)
    }

    pub fn set_logical_level_digital_output(&mut self, output: ChannelIndex, level: bool) -> Result<(), DriverError> {
        self.send(IoCommandEnum::SetDigitalOutput { output, level })?;
        info!(LOG_TAG, "logical level {} set on digital output {}", level as u8, output);
        Ok(())
    }

    pub fn get_logical_level_digital_output(&mut self, output: ChannelIndex) -> Result<bool, DriverError> {
        let level = parse_flag(&self.query(IoCommandEnum::GetDigitalOutput { output })?)?;
        info!(LOG_TAG, "logical level on digital output {} is {}", output, level as u8);
        Ok(level)
    }

    pub fn set_byte_digital_output_block(&mut self, block: BlockIndex, value: u8) -> Result<(), DriverError> {
        self.send(IoCommandEnum::SetDigitalOutputByte { block, value })?;
        info!(LOG_TAG, "byte value {} set on digital output block {}", value, block);
        Ok(())
    }

    pub fn get_byte_digital_output_block(&mut self, block: BlockIndex) -> Result<u8, DriverError> {
        let value = parse_byte(&self.query(IoCommandEnum::GetDigitalOutputByte { block })?)?;
        info!(LOG_TAG, "byte on digital output block {} is {}", block, value);
        Ok(value)
    }

    pub fn get_byte_digital_input_block(&mut self, block: BlockIndex) -> Result<u8, DriverError> {
        let value = parse_byte(&self.query(IoCommandEnum::GetDigitalInputByte { block })?)?;
        info!(LOG_TAG, "byte on digital input block {} is {}", block, value);
        Ok(value)
    }

    pub fn get_logical_level_digital_input(&mut self, input: ChannelIndex) -> Result<bool, DriverError> {
        let level = parse_flag(&self.query(IoCommandEnum::GetDigitalInput { input })?)?;
        info!(LOG_TAG, "logical level on digital input {} is {}", input, level as u8);
        Ok(level)
    }

    /// `raw` in 0.01 V, 0-1023
    pub fn set_voltage_analog_output(&mut self, channel: AnalogIndex, raw: RawAnalog) -> Result<(), DriverError> {
        self.send(IoCommandEnum::SetAnalogOutput { channel, raw })?;
        info!(LOG_TAG, "voltage {:.2} V set on analog output {}", raw as f64 / 100.0, channel);
        Ok(())
    }

    pub fn get_voltage_analog_output(&mut self, channel: AnalogIndex) -> Result<f64, DriverError> {
        let voltage = parse_voltage(&self.query(IoCommandEnum::GetAnalogOutput { channel })?)?;
        info!(LOG_TAG, "voltage on analog output {} is {} V", channel, voltage);
        Ok(voltage)
    }

    pub fn get_voltage_analog_input(&mut self, channel: AnalogIndex) -> Result<f64, DriverError> {
        let voltage = parse_voltage(&self.query(IoCommandEnum::GetAnalogInput { channel })?)?;
        info!(LOG_TAG, "voltage on analog input {} is {} V", channel, voltage);
        Ok(voltage)
    }

    fn transport_mut(&mut self) -> Result<TransportRef<'_>, DriverError> {
        let serial_device = &self.serial_device;
        self.transport
            .as_deref_mut()
            .ok_or_else(|| DriverError::not_open(format!("serial port {} is not open", serial_device)))
    }

    fn send(&mut self, command: IoCommandEnum) -> Result<(), DriverError> {
        self.exchange(command).map(|_| ())
    }

    fn query(&mut self, command: IoCommandEnum) -> Result<Vec<u8>, DriverError> {
        self.exchange(command)?
            .ok_or_else(|| DriverError::parse(format!("command {:?} has no reply", command)))
    }

    /// one full envelope, returns the raw reply for queries
    fn exchange(&mut self, command: IoCommandEnum) -> Result<Option<Vec<u8>>, DriverError> {
        if let Err(msg) = command.validate() {
            warn!(LOG_TAG, "{}", msg);
            return Err(DriverError::validation(msg));
        }

        let address = self.io_address;
        let timing = self.timing;
        let mut selection = Selection::select(self.transport_mut()?, address)?;

        wait_until_ready(selection.transport(), &timing)?;

        let payload = command.payload();
        debug!(LOG_TAG, "send command: {:?}", payload);
        selection.transport().write_str(payload.as_str())?;
        selection.transport().write_byte(TERMINATOR)?;

        let reply = match command.reply() {
            Some(format) => {
                let raw = selection.transport().read_bytes(format.width(), timing.read_timeout)?;
                trace!(LOG_TAG, "reply: {:?}", String::from_utf8_lossy(&raw));
                Some(raw)
            }
            None => None,
        };

        selection.transport().pause(timing.settle);
        selection.release()?;
        Ok(reply)
    }
}
