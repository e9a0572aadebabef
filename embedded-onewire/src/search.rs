use crate::{
    OneWire, OneWireResult, OneWireStatus,
    consts::{ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD},
    error::OneWireError,
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`] or [`OneWireSearchCursor`].
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

/// Search state of the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
///
/// The cursor does not borrow the bus, so a driver can keep it across calls
/// (e.g. to walk alarmed devices one per call) and hand it the bus each time.
/// [`reset`](OneWireSearchCursor::reset) rewinds it to the start of a new pass.
#[derive(Debug, Clone)]
pub struct OneWireSearchCursor {
    kind: OneWireSearchKind,
    last_device: bool,
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    rom: [u8; 8],
}

impl OneWireSearchCursor {
    /// Creates a new cursor positioned at the start of a search pass.
    pub fn new(kind: OneWireSearchKind) -> Self {
        Self {
            kind,
            last_device: false,
            last_discrepancy: 0,
            last_family_discrepancy: 0,
            rom: [0; 8],
        }
    }

    /// Kind of search this cursor performs.
    pub fn kind(&self) -> OneWireSearchKind {
        self.kind
    }

    /// Rewinds the cursor so that the next call to [next](OneWireSearchCursor::next)
    /// starts a new pass over the bus.
    pub fn reset(&mut self) {
        self.last_device = false; // Reset the last device flag
        self.last_discrepancy = 0; // Reset the last discrepancy
        self.last_family_discrepancy = 0; // Reset the last family discrepancy
        self.rom = [0; 8]; // Reset the ROM array
    }

    /// Returns `true` once the last device of the current pass has been reported.
    pub fn is_exhausted(&self) -> bool {
        self.last_device
    }

    /// Bit position (1-based) of the last discrepancy seen within the family code.
    pub fn last_family_discrepancy(&self) -> u8 {
        self.last_family_discrepancy
    }

    /// Finds the next device on the bus.
    ///
    /// The ROM code is returned exactly as it was read, packed as a little-endian `u64`
    /// (family code in the least significant byte, CRC in the most significant byte).
    /// Integrity checks are left to the caller.
    ///
    /// | Bit | Description |
    /// |-----|-------------|
    /// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
    /// | 8-55 | Serial number |
    /// | 56-63 | CRC-8 (`0b1_0001_1001` poly) |
    ///
    /// # Returns
    /// `Ok(None)` when the pass is complete or no device took part in the search.
    ///
    /// # Errors
    /// [OneWireError::NoDevicePresent] if the reset sees no presence pulse,
    /// [OneWireError::ShortCircuit] if the bus is shorted, or any transport error.
    pub fn next<T: OneWire>(&mut self, onewire: &mut T) -> OneWireResult<Option<u64>, T::BusError> {
        if self.last_device {
            return Ok(None); // If the last device was found, return None
        }
        let status = onewire.reset()?;
        if status.shortcircuit() {
            return Err(OneWireError::ShortCircuit);
        }
        if !status.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        let mut id_bit_num: u8 = 1;
        let mut last_zero: u8 = 0;
        let mut idx: usize = 0; // Index in the ROM array
        let mut rom_mask: u8 = 1; // Mask for the current bit in the ROM byte
        onewire.write_byte(self.kind as u8)?; // Search ROM command
        let res = loop {
            // Direction to take if this bit turns out to be a discrepancy
            let dir = if id_bit_num < self.last_discrepancy {
                self.rom[idx] & rom_mask > 0
            } else {
                id_bit_num == self.last_discrepancy
            };
            let (id_bit, complement_bit, write) = Self::read_id_bits(onewire, dir)?;
            if id_bit && complement_bit {
                // Both bits are 1, no device is taking part in the search
                break false;
            }
            let set = if id_bit != complement_bit {
                // All remaining devices agree on this bit
                id_bit
            } else {
                // Both bits are 0, a discrepancy
                if !dir {
                    last_zero = id_bit_num;
                    if last_zero < 9 {
                        self.last_family_discrepancy = last_zero;
                    }
                }
                dir
            };
            if set {
                self.rom[idx] |= rom_mask; // Set the bit in the ROM
            } else {
                self.rom[idx] &= !rom_mask; // Clear the bit in the ROM
            }

            if write {
                onewire.write_bit(set)?; // Write the direction bit if triplet is not implemented
            }

            id_bit_num += 1;
            rom_mask <<= 1; // Move to the next bit in the ROM byte

            if rom_mask == 0 {
                idx += 1; // Move to the next byte in the ROM
                rom_mask = 1; // Reset the mask for the next byte
            }
            if id_bit_num > 64 {
                self.last_discrepancy = last_zero;
                self.last_device = self.last_discrepancy == 0;
                break true;
            }
        };

        if !res || self.rom[0] == 0 {
            // If no device was found or the first byte is zero, reset the search state
            self.reset();
            return Ok(None);
        }
        Ok(Some(u64::from_le_bytes(self.rom)))
    }

    /// Read the id bit and the complement bit using triplet if available.
    /// If triplet is not implemented, fallback to reading bits, and let
    /// the write flag indicate if we need to write the direction bit later.
    #[cfg(feature = "triplet-read")]
    fn read_id_bits<T: OneWire>(
        onewire: &mut T,
        dir: bool,
    ) -> OneWireResult<(bool, bool, bool), T::BusError> {
        match onewire.read_triplet(dir) {
            Ok((id_bit, complement_bit, _)) => Ok((id_bit, complement_bit, false)),
            Err(OneWireError::Unimplemented) => {
                let id_bit = onewire.read_bit()?;
                let complement_bit = onewire.read_bit()?;
                Ok((id_bit, complement_bit, true))
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(not(feature = "triplet-read"))]
    fn read_id_bits<T: OneWire>(
        onewire: &mut T,
        _dir: bool,
    ) -> OneWireResult<(bool, bool, bool), T::BusError> {
        let id_bit = onewire.read_bit()?;
        let complement_bit = onewire.read_bit()?;
        Ok((id_bit, complement_bit, true))
    }
}

/// A structure for searching devices on a 1-Wire bus.
/// This structure implements the search algorithm for discovering devices on the 1-Wire bus.
/// It maintains the state of the search for the lifetime of the borrow.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cursor: OneWireSearchCursor,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `cmd` - The kind of search to perform (normal search or search in alarm state).
    pub fn new(onewire: &'a mut T, cmd: OneWireSearchKind) -> Self {
        Self {
            onewire,
            cursor: OneWireSearchCursor::new(cmd),
        }
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Searches for the next device on the 1-Wire bus.
    ///
    /// See [`OneWireSearchCursor::next`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> OneWireResult<Option<u64>, T::BusError> {
        self.cursor.next(&mut *self.onewire)
    }
}
