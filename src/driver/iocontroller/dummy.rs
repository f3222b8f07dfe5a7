//! simulated io controller, used when `mode=dummy` and by the session tests
//! - answers status probes with the ready code
//! - collects command text until the terminator, only while selected
//! - keeps outputs, connections and analog values so queries echo earlier sets

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::codec::{format_byte, format_flag, format_voltage};
use super::prelude::*;
use super::traits::SerialTransport;
use crate::common::error::DriverError;
use crate::{debug, info, warn};

const LOG_TAG: &str = "dummy.rs | simulated io controller";

#[derive(Debug, Default, Clone)]
pub struct DummyControllerState {
    pub local_mode: bool,
    pub echo_mode: bool,
    pub outputs: [u8; 4],
    pub inputs: [u8; 4],
    pub connections: [bool; 4],
    pub analog_outputs: [RawAnalog; 4],
    pub analog_inputs: [RawAnalog; 4],
    pub resets: u32,
}

pub struct DummyController {
    address: IoAddress,
    selected: bool,
    status_pending: bool,
    command: String,
    replies: VecDeque<u8>,
    state: Arc<Mutex<DummyControllerState>>,
}

impl DummyController {
    pub fn new(address: IoAddress) -> Self {
        info!(LOG_TAG, "dummy mode, serial port will not be open, address: {}", address);
        DummyController {
            address,
            selected: false,
            status_pending: false,
            command: String::new(),
            replies: VecDeque::new(),
            state: Arc::new(Mutex::new(DummyControllerState::default())),
        }
    }

    /// shared handle on the simulated state, for presetting inputs and inspecting outputs
    pub fn state(&self) -> Arc<Mutex<DummyControllerState>> {
        self.state.clone()
    }

    fn execute(&mut self) {
        let command = std::mem::take(&mut self.command);
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut chars = command.chars();
        let opcode = match chars.next() {
            Some(c) => c,
            None => return,
        };
        let args: Vec<u16> = chars
            .as_str()
            .split(',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        let arg = |i: usize| args.get(i).copied().unwrap_or(0) as usize;

        debug!(LOG_TAG, "execute command: {:?}", command);
        let reply = match opcode {
            'R' => {
                let fresh = DummyControllerState {
                    inputs: state.inputs,
                    analog_inputs: state.analog_inputs,
                    resets: state.resets + 1,
                    ..Default::default()
                };
                *state = fresh;
                None
            }
            'L' | 'N' => { state.local_mode = opcode == 'L'; None }
            'X' | 'Y' => { state.echo_mode = opcode == 'X'; None }
            'D' => { state.outputs = [0xff; 4]; None }
            'C' => { state.outputs = [0; 4]; None }
            'G' | 'H' => {
                if let Some(c) = state.connections.get_mut(arg(0)) {
                    *c = opcode == 'G';
                }
                None
            }
            'g' => state.connections.get(arg(0)).map(|c| format_flag(*c)),
            'A' => {
                let (block, bit) = (arg(0) / 8, arg(0) % 8);
                if let Some(byte) = state.outputs.get_mut(block) {
                    if arg(1) == 1 { *byte |= 1 << bit } else { *byte &= !(1 << bit) }
                }
                None
            }
            'a' => state.outputs.get(arg(0) / 8).map(|b| format_flag((b >> (arg(0) % 8)) & 1 == 1)),
            'B' => {
                if let Some(byte) = state.outputs.get_mut(arg(0)) {
                    *byte = arg(1) as u8;
                }
                None
            }
            'b' => state.outputs.get(arg(0)).map(|b| format_byte(*b)),
            'f' => state.inputs.get(arg(0)).map(|b| format_byte(*b)),
            'e' => state.inputs.get(arg(0) / 8).map(|b| format_flag((b >> (arg(0) % 8)) & 1 == 1)),
            'U' => {
                if let Some(raw) = state.analog_outputs.get_mut(arg(0)) {
                    *raw = arg(1) as RawAnalog;
                }
                None
            }
            'u' => state.analog_outputs.get(arg(0)).map(|raw| format_voltage(*raw)),
            'v' => state.analog_inputs.get(arg(0)).map(|raw| format_voltage(*raw)),
            _ => {
                warn!(LOG_TAG, "unknown command: {:?}", command);
                None
            }
        };
        if let Some(reply) = reply {
            self.replies.extend(reply.bytes());
        }
    }
}

impl SerialTransport for DummyController {
    fn write_byte(&mut self, byte: u8) -> Result<(), DriverError> {
        if byte == self.address {
            self.selected = true;
            self.command.clear();
            return Ok(());
        }
        if byte == deselect_address(self.address) {
            self.selected = false;
            return Ok(());
        }
        if !self.selected {
            return Ok(());
        }

        if byte == STATUS_PROBE {
            self.status_pending = true;
        } else if byte == TERMINATOR {
            self.execute();
        } else if byte == RESET_PREFIX {
            self.command.clear();
        }
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DriverError> {
        if self.selected {
            self.command.push_str(text);
        }
        Ok(())
    }

    fn read_bytes(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, DriverError> {
        if self.status_pending && len == 1 {
            self.status_pending = false;
            return Ok(vec![STATUS_READY]);
        }
        if self.replies.len() < len {
            return Err(DriverError::timeout(format!(
                "dummy controller has {} of {} bytes after {:?}",
                self.replies.len(), len, timeout
            )));
        }
        Ok(self.replies.drain(..len).collect())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        info!(LOG_TAG, "dummy serial port closed");
        Ok(())
    }

    fn pause(&mut self, _duration: Duration) {}
}
