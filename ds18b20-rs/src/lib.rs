#![no_std]
#![deny(missing_docs)]
//! # DS18B20
//!
//! A no-std driver for DS18B20 digital thermometers on a 1-Wire bus.
//!
//! The driver consumes any bus master implementing [`OneWire`] and provides
//! device discovery (including the alarm search), temperature conversion with
//! resolution-dependent waits, scratchpad and EEPROM access, alarm thresholds and
//! parasite-power handling through an optional strong pull-up line.
//!
//! ```ignore
//! let mut sensors = Ds18b20::new().with_strong_pullup(pullup_pin);
//! let count = sensors.begin(&mut bus)?;
//! for index in 0..count {
//!     let address = sensors.devices()[index];
//!     let celsius = sensors.read_temperature(&mut bus, &mut delay, &address)?;
//!     log::info!("{address}: {celsius} C");
//! }
//! ```

mod address;
mod discovery;
mod driver;
mod error;
mod power;
mod protocol;
mod pullup;
mod registry;
mod scratchpad;

pub use address::{Address, AddressError};
pub use driver::Ds18b20;
pub use embedded_onewire::{OneWire, OneWireCrc, OneWireError, OneWireResult};
pub use error::Ds18b20Error;
pub use pullup::NoPullup;
pub use registry::DeviceRegistry;
pub use scratchpad::{
    Alarms, Configuration, ReadoutResolution, Scratchpad, Temperature, celsius_from_raw,
};

/// Results of DS18B20-specific function calls.
pub type Ds18b20Result<T, E> = Result<T, Ds18b20Error<E>>;

/// Maximum number of devices kept by a driver created with [`Ds18b20::new`].
pub const MAX_DEVICES: usize = 16;

/// Family code of the DS18B20.
pub const DS18B20_FAMILY: u8 = 0x28;

/// Initiates a single temperature conversion.
pub const DS18B20_CONVERT_T: u8 = 0x44;
/// Reads the contents of the scratchpad.
pub const DS18B20_READ_SCRATCH: u8 = 0xbe;
/// Writes T_H, T_L and the configuration register to the scratchpad.
pub const DS18B20_WRITE_SCRATCH: u8 = 0x4e;
/// Copies T_H, T_L and the configuration register from the scratchpad to EEPROM.
pub const DS18B20_COPY_SCRATCH: u8 = 0x48;
/// Recalls T_H, T_L and the configuration register from EEPROM into the scratchpad.
pub const DS18B20_RECALL_EEPROM: u8 = 0xb8;
/// Asks the addressed device whether it runs on parasite power.
pub const DS18B20_READ_POWERMODE: u8 = 0xb4;

/// Time the bus must be held high while a parasite-powered device writes its EEPROM.
pub const EEPROM_WRITE_MS: u32 = 11;

/// Computes the 1-Wire CRC-8 of `data`.
///
/// An address is valid when `crc8(&rom[..7]) == rom[7]`; a scratchpad when
/// `crc8(&scratchpad[..8]) == scratchpad[8]`.
pub fn crc8(data: &[u8]) -> u8 {
    OneWireCrc::compute(data)
}
