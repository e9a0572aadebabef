use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
    str::FromStr,
};
use embedded_onewire::OneWireCrc;

/// 64-bit ROM code of a 1-Wire device.
///
/// Byte 0 is the family code, bytes 1-6 the serial number and byte 7 the
/// CRC-8 of bytes 0-6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Address([u8; Address::BYTES]);

impl Address {
    /// The length of a device address in bytes.
    pub const BYTES: usize = 8;

    /// Wraps raw ROM bytes without checking the CRC.
    pub const fn from_bytes(bytes: [u8; Self::BYTES]) -> Self {
        Self(bytes)
    }

    /// Builds an address from family code and serial number, computing the CRC byte.
    pub fn new(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0; Self::BYTES];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = OneWireCrc::compute(&bytes[..7]);
        Self(bytes)
    }

    /// Family code (0x28 for the DS18B20).
    pub fn family_code(&self) -> u8 {
        self.0[0]
    }

    /// The 48-bit serial number.
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }

    /// The CRC byte as stored in the ROM.
    pub fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Returns `true` if the CRC byte matches bytes 0-6.
    pub fn is_valid(&self) -> bool {
        OneWireCrc::compute(&self.0[..7]) == self.0[7]
    }

    /// Packs the address into a `u64`, byte 7 in the most significant position.
    pub fn to_u64(&self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    /// Raw ROM bytes.
    pub fn to_bytes(self) -> [u8; Self::BYTES] {
        self.0
    }
}

impl From<u64> for Address {
    fn from(rom: u64) -> Self {
        Self(rom.to_le_bytes())
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.to_u64()
    }
}

impl From<[u8; Address::BYTES]> for Address {
    fn from(bytes: [u8; Address::BYTES]) -> Self {
        Self(bytes)
    }
}

impl Deref for Address {
    type Target = [u8; Address::BYTES];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Error parsing an [`Address`] from text.
#[derive(Debug, PartialEq, Eq)]
pub enum AddressError {
    /// Fewer than 16 hex digits.
    NotEnough,
    /// A character that is not a hex digit, or more than 16 digits.
    Invalid,
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts 16 hex digits, optionally separated by spaces or colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; Self::BYTES];
        let mut digits = s.chars().filter(|c| !c.is_whitespace() && *c != ':');

        for byte in bytes.iter_mut() {
            match (digits.next(), digits.next()) {
                (Some(h), Some(l)) => match (h.to_digit(16), l.to_digit(16)) {
                    (Some(h), Some(l)) => *byte = ((h << 4) | l) as u8,
                    _ => return Err(AddressError::Invalid),
                },
                _ => return Err(AddressError::NotEnough),
            }
        }
        if digits.next().is_some() {
            return Err(AddressError::Invalid);
        }
        Ok(Self(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        )
    }
}
