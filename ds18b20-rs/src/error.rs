use embedded_hal::digital::ErrorKind;
use embedded_onewire::OneWireError;

#[derive(Debug, PartialEq)]
/// DS18B20 driver errors.
///
/// None of these are fatal: a failed call leaves the device registry and the
/// devices untouched, and retrying is up to the caller.
pub enum Ds18b20Error<E> {
    /// Errors of the underlying 1-Wire transport.
    OneWire(OneWireError<E>),
    /// Discovery found no device with a valid address.
    NoDevices,
    /// A scratchpad read failed its CRC check.
    CrcMismatch {
        /// CRC computed over the first eight bytes.
        computed: u8,
        /// CRC byte sent by the device.
        expected: u8,
    },
    /// Bytes 2-4 read back after a scratchpad write differ from what was written.
    WriteVerification {
        /// T_H, T_L and configuration as written.
        written: [u8; 3],
        /// T_H, T_L and configuration as read back.
        read: [u8; 3],
    },
    /// Resolution outside of 9..=12 bits.
    InvalidResolution(u8),
    /// Device index outside of the registry.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of devices in the registry.
        len: usize,
    },
    /// The strong pull-up line could not be driven.
    Pullup(ErrorKind),
}

impl<E> From<OneWireError<E>> for Ds18b20Error<E> {
    fn from(value: OneWireError<E>) -> Self {
        Self::OneWire(value)
    }
}
