use crate::{
    OneWireError, OneWireResult,
    consts::{ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SKIP_ROM_CMD},
};

/// Status reported by a 1-Wire bus reset.
pub trait OneWireStatus {
    /// Returns `true` if at least one device answered the reset with a presence pulse.
    fn presence(&self) -> bool;

    /// Returns `true` if a short circuit was detected on the bus during the reset.
    fn shortcircuit(&self) -> bool;

    /// Logic level of the bus line sampled after the reset, if the master reports it.
    fn logic_level(&self) -> Option<bool> {
        None
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes, and writing and reading bits.
///
/// Implementations own the electrical timing of the bus. Device drivers are expected to
/// sequence transactions exclusively through these methods.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Reads a byte from the 1-Wire bus, least significant bit first.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Writes a single bit time slot to the 1-Wire bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit time slot from the 1-Wire bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Generates the three time slots of one search step: the id bit, its complement,
    /// and the direction bit chosen by the master. The direction written is `direction`
    /// when both read slots are 0, otherwise the value of the id bit.
    ///
    /// # Returns
    /// `(id_bit, complement_bit, direction_taken)`.
    ///
    /// # Errors
    /// [OneWireError::Unimplemented] if the master has no triplet primitive; the search
    /// then falls back to [read_bit](OneWire::read_bit) and [write_bit](OneWire::write_bit).
    #[cfg(feature = "triplet-read")]
    fn read_triplet(&mut self, _direction: bool) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Whether the master can run the conditional (alarm) search.
    ///
    /// Bit-banged masters always can. Bridges that only expose a fixed search
    /// primitive should return `false` so drivers can report the missing capability.
    fn supports_conditional_search(&self) -> bool {
        true
    }

    /// Addresses devices on the 1-Wire bus.
    /// The first [`OneWire::read_byte`], [`OneWire::read_bit`], [`OneWire::write_byte`], [`OneWire::write_bit`] operation should be preceded by this method to address devices on the bus.
    /// Note: A [`OneWire::read_byte`] or [`OneWire::read_bit`] call will return garbage data if this method is called without specifying a ROM address on a bus with multiple devices.
    /// # Arguments
    /// * `rom` - The ROM address of the device to address. Pass [`None`] to skip ROM addressing and address all devices on the bus.
    ///
    /// # Errors
    /// [OneWireError::NoDevicePresent] if nothing answers the reset,
    /// [OneWireError::ShortCircuit] if the line is shorted.
    fn address(&mut self, rom: Option<u64>) -> OneWireResult<(), Self::BusError> {
        let status = self.reset()?; // Reset the bus before addressing
        if status.shortcircuit() {
            return Err(OneWireError::ShortCircuit);
        }
        if !status.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        match rom {
            Some(rom) => {
                self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
                for &b in rom.to_le_bytes().iter() {
                    self.write_byte(b)?; // Write each byte of the ROM address
                }
            }
            None => self.write_byte(ONEWIRE_SKIP_ROM_CMD)?,
        }
        Ok(())
    }
}
