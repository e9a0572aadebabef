use embedded_hal::{delay::DelayNs, digital::OutputPin};
use embedded_onewire::{OneWire, OneWireResult};

use crate::{
    Address, Alarms, Configuration, DS18B20_CONVERT_T, DS18B20_COPY_SCRATCH,
    DS18B20_READ_SCRATCH, DS18B20_RECALL_EEPROM, DS18B20_WRITE_SCRATCH, Ds18b20, Ds18b20Error,
    Ds18b20Result, EEPROM_WRITE_MS, ReadoutResolution, Scratchpad, Temperature, celsius_from_raw,
};

/// Resets the bus, selects `address` and sends a function command.
pub(crate) fn select<O: OneWire>(
    bus: &mut O,
    address: &Address,
    cmd: u8,
) -> OneWireResult<(), O::BusError> {
    bus.address(Some(address.to_u64()))?;
    bus.write_byte(cmd)
}

impl<P: OutputPin, const N: usize> Ds18b20<P, N> {
    /// Reads the nine scratchpad bytes of `address` and checks their CRC.
    ///
    /// Every read in this driver goes through here, so no unchecked scratchpad
    /// content is ever interpreted.
    ///
    /// # Errors
    /// [`Ds18b20Error::CrcMismatch`] if byte 8 is not the CRC of bytes 0-7.
    pub fn read_scratchpad<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<Scratchpad, O::BusError> {
        select(bus, address, DS18B20_READ_SCRATCH)?;
        let mut bytes = [0; Scratchpad::BYTES];
        for b in bytes.iter_mut() {
            *b = bus.read_byte()?;
        }
        let scratchpad = Scratchpad::from_bytes(bytes);
        scratchpad.check_crc().map_err(|(computed, expected)| {
            log::warn!(
                "{}: scratchpad CRC mismatch (computed {:02x}, received {:02x})",
                address,
                computed,
                expected
            );
            Ds18b20Error::CrcMismatch { computed, expected }
        })?;
        Ok(scratchpad)
    }

    /// Writes T_H, T_L and the configuration register, then reads the
    /// scratchpad back and compares bytes 2-4.
    ///
    /// # Errors
    /// [`Ds18b20Error::WriteVerification`] if the device does not hold what was written.
    pub fn write_scratchpad<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
        high: i8,
        low: i8,
        config: u8,
    ) -> Ds18b20Result<(), O::BusError> {
        let written = [high as u8, low as u8, config];
        select(bus, address, DS18B20_WRITE_SCRATCH)?;
        for &b in written.iter() {
            bus.write_byte(b)?;
        }
        let read = self.read_scratchpad(bus, address)?.writable();
        if read != written {
            log::warn!(
                "{}: scratchpad write not verified (wrote {:02x?}, read {:02x?})",
                address,
                written,
                read
            );
            return Err(Ds18b20Error::WriteVerification { written, read });
        }
        Ok(())
    }

    /// Resolution currently selected in the scratchpad.
    pub fn get_resolution<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<ReadoutResolution, O::BusError> {
        Ok(self.read_scratchpad(bus, address)?.resolution())
    }

    /// Selects a conversion resolution of `bits` (9 to 12), keeping the alarm
    /// thresholds. With `persist` the scratchpad is also copied to EEPROM.
    ///
    /// # Errors
    /// [`Ds18b20Error::InvalidResolution`] without touching the bus if `bits`
    /// is out of range.
    pub fn set_resolution<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
        bits: u8,
        persist: bool,
    ) -> Ds18b20Result<(), O::BusError> {
        let resolution =
            ReadoutResolution::try_from(bits).map_err(Ds18b20Error::InvalidResolution)?;
        let current = self.read_scratchpad(bus, address)?;
        let config = Configuration::for_resolution(resolution).into_bits();
        self.write_scratchpad(
            bus,
            address,
            current.high_alarm(),
            current.low_alarm(),
            config,
        )?;
        log::debug!("{}: resolution set to {} bits", address, bits);
        if persist {
            self.copy_scratchpad(bus, delay, address)?;
        }
        Ok(())
    }

    /// Alarm thresholds currently held in the scratchpad.
    pub fn get_alarms<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<Alarms, O::BusError> {
        Ok(self.read_scratchpad(bus, address)?.alarms())
    }

    /// Sets the alarm thresholds, keeping the configuration register. With
    /// `persist` the scratchpad is also copied to EEPROM.
    pub fn set_alarms<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
        alarms: Alarms,
        persist: bool,
    ) -> Ds18b20Result<(), O::BusError> {
        let current = self.read_scratchpad(bus, address)?;
        self.write_scratchpad(
            bus,
            address,
            alarms.high,
            alarms.low,
            current.configuration().into_bits(),
        )?;
        if persist {
            self.copy_scratchpad(bus, delay, address)?;
        }
        Ok(())
    }

    /// Starts a conversion on `address` and blocks until it has finished.
    ///
    /// The wait follows the resolution read from the scratchpad beforehand,
    /// 750 ms if the scratchpad could not be trusted. Parasite-powered devices
    /// get the strong pull-up for the whole wait.
    ///
    /// # Returns
    /// The resolution the wait was based on.
    pub fn start_conversion<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
    ) -> Ds18b20Result<ReadoutResolution, O::BusError> {
        let resolution = match self.get_resolution(bus, address) {
            Ok(resolution) => resolution,
            Err(Ds18b20Error::CrcMismatch { .. }) => ReadoutResolution::Resolution12bit,
            Err(e) => return Err(e),
        };
        let parasite = self.is_parasite_power(bus, address);
        select(bus, address, DS18B20_CONVERT_T)?;
        log::debug!(
            "{}: converting at {} bits{}",
            address,
            resolution.bits(),
            if parasite { ", parasite powered" } else { "" }
        );
        self.pullup
            .hold(parasite, delay, resolution.conversion_time_ms())
            .map_err(Ds18b20Error::Pullup)?;
        Ok(resolution)
    }

    /// Converts and reads the temperature of `address` in degrees Celsius.
    ///
    /// A failed conversion or read is an error, never a default value.
    pub fn read_temperature<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
    ) -> Ds18b20Result<f32, O::BusError> {
        self.start_conversion(bus, delay, address)?;
        Ok(celsius_from_raw(self.read_raw_temperature(bus, address)?))
    }

    /// Converts and reads the temperature of `address` as a fixed point value.
    pub fn read_temperature_fixed<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
    ) -> Ds18b20Result<Temperature, O::BusError> {
        self.start_conversion(bus, delay, address)?;
        Ok(self.read_scratchpad(bus, address)?.temperature())
    }

    /// Reads the temperature register left by the last conversion, without scaling.
    pub fn read_raw_temperature<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<i16, O::BusError> {
        Ok(self.read_scratchpad(bus, address)?.raw_temperature())
    }

    /// Copies T_H, T_L and the configuration register to EEPROM.
    ///
    /// The copy is not read back: success means the command was sent and the
    /// EEPROM write window has elapsed, with the strong pull-up held for
    /// parasite-powered devices.
    pub fn copy_scratchpad<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        address: &Address,
    ) -> Ds18b20Result<(), O::BusError> {
        let parasite = self.is_parasite_power(bus, address);
        select(bus, address, DS18B20_COPY_SCRATCH)?;
        self.pullup
            .hold(parasite, delay, EEPROM_WRITE_MS)
            .map_err(Ds18b20Error::Pullup)?;
        log::debug!("{}: scratchpad copied to EEPROM", address);
        Ok(())
    }

    /// Reloads T_H, T_L and the configuration register from EEPROM.
    ///
    /// Succeeds once a scratchpad read confirms the device is responding.
    pub fn recall_e2<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<(), O::BusError> {
        select(bus, address, DS18B20_RECALL_EEPROM)?;
        self.read_scratchpad(bus, address)?;
        Ok(())
    }
}
