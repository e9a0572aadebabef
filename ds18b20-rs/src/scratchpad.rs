use bitfield_struct::bitfield;
use fixed::types::I12F4;

use crate::crc8;

/// Temperature register value, 1/16 °C per LSB.
pub type Temperature = I12F4;

/// Converts the raw temperature register to degrees Celsius.
///
/// The scale is 1/16 °C at every resolution; the device zeroes the unused low
/// bits when converting at 9, 10 or 11 bits.
pub fn celsius_from_raw(raw: i16) -> f32 {
    Temperature::from_bits(raw).to_num::<f32>()
}

/// Conversion resolution, stored in bits 5-6 of the configuration register.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadoutResolution {
    /// 0.5 °C steps, 93.75 ms conversion.
    Resolution9bit = 0b00,
    /// 0.25 °C steps, 187.5 ms conversion.
    Resolution10bit = 0b01,
    /// 0.125 °C steps, 375 ms conversion.
    Resolution11bit = 0b10,
    /// 0.0625 °C steps, 750 ms conversion. Power-on default.
    #[default]
    Resolution12bit = 0b11,
}

impl ReadoutResolution {
    /// Number of bits of the conversion result.
    pub const fn bits(&self) -> u8 {
        use ReadoutResolution::*;
        match self {
            Resolution9bit => 9,
            Resolution10bit => 10,
            Resolution11bit => 11,
            Resolution12bit => 12,
        }
    }

    /// Time to wait between issuing Convert T and reading the result, rounded up.
    pub const fn conversion_time_ms(&self) -> u32 {
        use ReadoutResolution::*;
        match self {
            Resolution9bit => 94,
            Resolution10bit => 188,
            Resolution11bit => 375,
            Resolution12bit => 750,
        }
    }

    const fn into_bits(self) -> u8 {
        self as u8
    }

    const fn from_bits(value: u8) -> Self {
        use ReadoutResolution::*;
        match value & 0b11 {
            0b00 => Resolution9bit,
            0b01 => Resolution10bit,
            0b10 => Resolution11bit,
            _ => Resolution12bit,
        }
    }
}

impl TryFrom<u8> for ReadoutResolution {
    type Error = u8;

    /// Maps 9..=12 bits to a resolution; anything else is handed back.
    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        use ReadoutResolution::*;
        match bits {
            9 => Ok(Resolution9bit),
            10 => Ok(Resolution10bit),
            11 => Ok(Resolution11bit),
            12 => Ok(Resolution12bit),
            other => Err(other),
        }
    }
}

/// Configuration register (scratchpad byte 4).
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Configuration {
    /// Reserved, reads back as all ones.
    #[bits(5, default = 0x1f)]
    pub reserved_ones: u8,
    /// R0 (bit 5) and R1 (bit 6).
    #[bits(2, default = ReadoutResolution::Resolution12bit)]
    pub resolution: ReadoutResolution,
    /// Reserved, reads back as zero.
    pub reserved_zero: bool,
}

impl Configuration {
    /// Register value selecting `resolution`, with the reserved bits as the device reports them.
    pub const fn for_resolution(resolution: ReadoutResolution) -> Self {
        Self::new().with_resolution(resolution)
    }
}

/// Alarm thresholds T_H and T_L in whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarms {
    /// Upper threshold (scratchpad byte 2).
    pub high: i8,
    /// Lower threshold (scratchpad byte 3).
    pub low: i8,
}

/// Nine byte scratchpad image.
///
/// | Byte | Content |
/// |------|---------|
/// | 0-1 | Temperature, little endian, signed |
/// | 2 | T_H |
/// | 3 | T_L |
/// | 4 | Configuration |
/// | 5-7 | Reserved |
/// | 8 | CRC-8 of bytes 0-7 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad([u8; Scratchpad::BYTES]);

impl Scratchpad {
    /// Size of the scratchpad in bytes.
    pub const BYTES: usize = 9;

    /// Wraps the bytes as clocked off the bus.
    pub const fn from_bytes(bytes: [u8; Self::BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; Self::BYTES] {
        &self.0
    }

    /// Compares the CRC byte with the CRC of bytes 0-7.
    ///
    /// # Returns
    /// `Err((computed, expected))` on mismatch.
    pub fn check_crc(&self) -> Result<(), (u8, u8)> {
        let computed = crc8(&self.0[..8]);
        if computed == self.0[8] {
            Ok(())
        } else {
            Err((computed, self.0[8]))
        }
    }

    /// Temperature register as a signed 16-bit value.
    pub fn raw_temperature(&self) -> i16 {
        i16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// Temperature register as a fixed point value.
    pub fn temperature(&self) -> Temperature {
        Temperature::from_bits(self.raw_temperature())
    }

    /// T_H.
    pub fn high_alarm(&self) -> i8 {
        self.0[2] as i8
    }

    /// T_L.
    pub fn low_alarm(&self) -> i8 {
        self.0[3] as i8
    }

    /// Both alarm thresholds.
    pub fn alarms(&self) -> Alarms {
        Alarms {
            high: self.high_alarm(),
            low: self.low_alarm(),
        }
    }

    /// Configuration register.
    pub fn configuration(&self) -> Configuration {
        Configuration::from_bits(self.0[4])
    }

    /// Conversion resolution selected by the configuration register.
    pub fn resolution(&self) -> ReadoutResolution {
        self.configuration().resolution()
    }

    /// CRC byte as sent by the device.
    pub fn crc(&self) -> u8 {
        self.0[8]
    }

    /// Bytes 2-4, the part of the scratchpad that can be written.
    pub(crate) fn writable(&self) -> [u8; 3] {
        [self.0[2], self.0[3], self.0[4]]
    }
}
