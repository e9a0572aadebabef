#![allow(dead_code)]

use ds18b20::{
    Address, DS18B20_CONVERT_T, DS18B20_COPY_SCRATCH, DS18B20_FAMILY, DS18B20_READ_POWERMODE,
    DS18B20_READ_SCRATCH, DS18B20_RECALL_EEPROM, DS18B20_WRITE_SCRATCH, OneWire, OneWireError,
    OneWireResult, crc8,
};
use embedded_onewire::{
    OneWireStatus,
    consts::{
        ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SEARCH_CMD,
        ONEWIRE_SKIP_ROM_CMD,
    },
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, PartialEq)]
pub struct SimError;

pub struct SimStatus {
    presence: bool,
}

impl OneWireStatus for SimStatus {
    fn presence(&self) -> bool {
        self.presence
    }

    fn shortcircuit(&self) -> bool {
        false
    }
}

/// One simulated DS18B20.
#[derive(Debug, Clone)]
pub struct SimDevice {
    pub rom: [u8; 8],
    /// Bytes 0-7; the CRC is appended when the scratchpad is clocked out.
    pub scratchpad: [u8; 8],
    pub eeprom: [u8; 3],
    pub parasite: bool,
    /// Value latched by the next Convert T, before resolution masking.
    pub temperature: i16,
    /// XOR mask applied to one byte of every scratchpad read.
    pub flip: Option<(usize, u8)>,
    /// Ignore Write Scratchpad data.
    pub write_protect: bool,
}

impl SimDevice {
    pub fn new(serial: u8) -> Self {
        let mut rom = [DS18B20_FAMILY, serial, 0x64, 0x1e, 0x0f, 0x00, 0x00, 0x00];
        rom[7] = crc8(&rom[..7]);
        Self {
            rom,
            scratchpad: [0x50, 0x05, 0x4b, 0x46, 0x7f, 0xff, 0x0c, 0x10],
            eeprom: [0x4b, 0x46, 0x7f],
            parasite: false,
            temperature: 0x0191,
            flip: None,
            write_protect: false,
        }
    }

    pub fn with_bad_crc(mut self) -> Self {
        self.rom[7] ^= 0xff;
        self
    }

    pub fn parasite(mut self) -> Self {
        self.parasite = true;
        self
    }

    pub fn with_temperature(mut self, raw: i16) -> Self {
        self.temperature = raw;
        self
    }

    pub fn with_alarms(mut self, high: i8, low: i8) -> Self {
        self.scratchpad[2] = high as u8;
        self.scratchpad[3] = low as u8;
        self
    }

    pub fn with_flip(mut self, byte: usize, mask: u8) -> Self {
        self.flip = Some((byte, mask));
        self
    }

    pub fn write_protected(mut self) -> Self {
        self.write_protect = true;
        self
    }

    pub fn address(&self) -> Address {
        Address::from_bytes(self.rom)
    }

    fn rom_bit(&self, bit: u8) -> bool {
        self.rom[bit as usize / 8] & (1 << (bit % 8)) != 0
    }

    fn alarmed(&self) -> bool {
        let t = i16::from_le_bytes([self.scratchpad[0], self.scratchpad[1]]) >> 4;
        t >= self.scratchpad[2] as i8 as i16 || t <= self.scratchpad[3] as i8 as i16
    }

    fn convert(&mut self) {
        let mask: i16 = match (self.scratchpad[4] >> 5) & 0b11 {
            0b00 => !0b111,
            0b01 => !0b11,
            0b10 => !0b1,
            _ => !0,
        };
        let [lsb, msb] = (self.temperature & mask).to_le_bytes();
        self.scratchpad[0] = lsb;
        self.scratchpad[1] = msb;
    }

    fn write(&mut self, index: usize, byte: u8) {
        if self.write_protect {
            return;
        }
        self.scratchpad[2 + index] = if index == 2 {
            (byte & 0x60) | 0x1f
        } else {
            byte
        };
    }

    fn read_out(&self) -> [u8; 9] {
        let mut out = [0; 9];
        out[..8].copy_from_slice(&self.scratchpad);
        out[8] = crc8(&self.scratchpad);
        if let Some((index, mask)) = self.flip {
            out[index] ^= mask;
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Reset,
    Select(u64),
    Skip,
    Search(u8),
    Function(u8),
    Data(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Id,
    Complement,
    Direction,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Rom,
    Match(Vec<u8>),
    Function,
    Search { bit: u8, step: Step },
    Write(usize),
    Read { data: [u8; 9], pos: usize },
    Power,
}

/// Bit-level 1-Wire bus with wired-AND semantics over its devices.
pub struct SimBus {
    pub devices: Vec<SimDevice>,
    pub events: Vec<Event>,
    /// Function command whose write fails with a transport error.
    pub fail_function: Option<u8>,
    pub conditional_search: bool,
    active: Vec<bool>,
    state: State,
}

impl SimBus {
    pub fn new(devices: Vec<SimDevice>) -> Self {
        let active = vec![false; devices.len()];
        Self {
            devices,
            events: Vec::new(),
            fail_function: None,
            conditional_search: true,
            active,
            state: State::Idle,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn device(&self, index: usize) -> &SimDevice {
        &self.devices[index]
    }

    pub fn device_mut(&mut self, index: usize) -> &mut SimDevice {
        &mut self.devices[index]
    }

    /// Function commands issued since the last [`clear_events`](SimBus::clear_events).
    pub fn functions(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Function(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn selected(&mut self) -> impl Iterator<Item = &mut SimDevice> {
        self.devices
            .iter_mut()
            .zip(self.active.iter())
            .filter_map(|(d, &active)| active.then_some(d))
    }

    fn function(&mut self, cmd: u8) -> State {
        match cmd {
            DS18B20_READ_SCRATCH => {
                let data = self.selected().fold([0xff; 9], |mut acc, d| {
                    for (a, b) in acc.iter_mut().zip(d.read_out()) {
                        *a &= b;
                    }
                    acc
                });
                State::Read { data, pos: 0 }
            }
            DS18B20_WRITE_SCRATCH => State::Write(0),
            DS18B20_CONVERT_T => {
                self.selected().for_each(SimDevice::convert);
                State::Idle
            }
            DS18B20_COPY_SCRATCH => {
                self.selected()
                    .for_each(|d| d.eeprom.copy_from_slice(&d.scratchpad[2..5]));
                State::Idle
            }
            DS18B20_RECALL_EEPROM => {
                self.selected()
                    .for_each(|d| d.scratchpad[2..5].copy_from_slice(&d.eeprom));
                State::Idle
            }
            DS18B20_READ_POWERMODE => State::Power,
            _ => State::Idle,
        }
    }
}

impl OneWire for SimBus {
    type Status = SimStatus;
    type BusError = SimError;

    fn reset(&mut self) -> OneWireResult<SimStatus, SimError> {
        self.events.push(Event::Reset);
        self.active.iter_mut().for_each(|a| *a = true);
        let presence = !self.devices.is_empty();
        self.state = if presence { State::Rom } else { State::Idle };
        Ok(SimStatus { presence })
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), SimError> {
        self.state = match core::mem::replace(&mut self.state, State::Idle) {
            State::Rom => match byte {
                ONEWIRE_MATCH_ROM_CMD => State::Match(Vec::new()),
                ONEWIRE_SKIP_ROM_CMD => {
                    self.events.push(Event::Skip);
                    State::Function
                }
                ONEWIRE_SEARCH_CMD | ONEWIRE_CONDITIONAL_SEARCH_CMD => {
                    self.events.push(Event::Search(byte));
                    if byte == ONEWIRE_CONDITIONAL_SEARCH_CMD {
                        for (active, d) in self.active.iter_mut().zip(self.devices.iter()) {
                            *active = d.alarmed();
                        }
                    }
                    State::Search {
                        bit: 0,
                        step: Step::Id,
                    }
                }
                _ => State::Idle,
            },
            State::Match(mut rom) => {
                rom.push(byte);
                if rom.len() < 8 {
                    State::Match(rom)
                } else {
                    for (active, d) in self.active.iter_mut().zip(self.devices.iter()) {
                        *active = d.rom[..] == rom[..];
                    }
                    let mut bytes = [0; 8];
                    bytes.copy_from_slice(&rom);
                    self.events.push(Event::Select(u64::from_le_bytes(bytes)));
                    State::Function
                }
            }
            State::Function => {
                self.events.push(Event::Function(byte));
                if self.fail_function == Some(byte) {
                    return Err(OneWireError::Other(SimError));
                }
                self.function(byte)
            }
            State::Write(index) => {
                self.events.push(Event::Data(byte));
                self.selected().for_each(|d| d.write(index, byte));
                if index < 2 {
                    State::Write(index + 1)
                } else {
                    State::Idle
                }
            }
            other => {
                self.events.push(Event::Data(byte));
                other
            }
        };
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, SimError> {
        match &mut self.state {
            State::Read { data, pos } => {
                let byte = data.get(*pos).copied().unwrap_or(0xff);
                *pos += 1;
                Ok(byte)
            }
            _ => Ok(0xff),
        }
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), SimError> {
        if let State::Search {
            bit: index,
            step: Step::Direction,
        } = self.state
        {
            for (active, d) in self.active.iter_mut().zip(self.devices.iter()) {
                if *active && d.rom_bit(index) != bit {
                    *active = false;
                }
            }
            self.state = if index < 63 {
                State::Search {
                    bit: index + 1,
                    step: Step::Id,
                }
            } else {
                State::Idle
            };
        }
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, SimError> {
        match self.state {
            State::Power => Ok(!self.selected().any(|d| d.parasite)),
            State::Search { bit, step } => {
                let complement = match step {
                    Step::Id => false,
                    Step::Complement => true,
                    Step::Direction => return Ok(true),
                };
                let level = self
                    .devices
                    .iter()
                    .zip(self.active.iter())
                    .filter(|(_, active)| **active)
                    .all(|(d, _)| d.rom_bit(bit) != complement);
                self.state = State::Search {
                    bit,
                    step: if complement {
                        Step::Direction
                    } else {
                        Step::Complement
                    },
                };
                Ok(level)
            }
            _ => Ok(true),
        }
    }

    fn supports_conditional_search(&self) -> bool {
        self.conditional_search
    }
}
