#[derive(Debug, Default, Clone, Copy)]
/// Calculate CRC-8 used in 1-Wire communications.
///
/// Polynomial `x^8 + x^5 + x^4 + 1`, processed least significant bit first.
pub struct OneWireCrc(u8);

#[cfg(feature = "crc-table")]
const CRC_TABLE: [u8; 256] = build_table();

#[cfg(feature = "crc-table")]
const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = update_bitwise(0, i as u8);
        i += 1;
    }
    table
}

const fn update_bitwise(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte; // XOR the byte with the current CRC value
    let mut bit = 0;
    while bit < 8 {
        if crc & 0x1 == 0x1 {
            crc = (crc >> 1) ^ 0x8c; // Polynomial for CRC-8
        } else {
            crc >>= 1;
        }
        bit += 1;
    }
    crc
}

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        #[cfg(feature = "crc-table")]
        {
            self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
        }
        #[cfg(not(feature = "crc-table"))]
        {
            self.0 = update_bitwise(self.0, byte);
        }
    }

    /// Compute the CRC of a complete sequence of bytes.
    pub fn compute(data: &[u8]) -> u8 {
        let mut crc = OneWireCrc(0);
        for &byte in data.iter() {
            crc.update(byte);
        }
        crc.0
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // If the last byte is the CRC of the rest, running it through leaves zero
        !sequence.is_empty() && Self::compute(sequence) == 0x0
    }
}
