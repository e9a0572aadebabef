use embedded_onewire::{OneWire, OneWireError, OneWireSearch, OneWireSearchKind};

use crate::{Address, DeviceRegistry, Ds18b20, Ds18b20Error, Ds18b20Result};

impl<P, const N: usize> Ds18b20<P, N> {
    /// Enumerates the bus and replaces the registry with every device whose
    /// address passes its CRC check, in the order the search returns them.
    ///
    /// Addresses failing the check are skipped. Enumeration stops early once
    /// `N` devices are stored. An empty bus yields zero devices. On a transport
    /// error the previous registry is kept.
    ///
    /// # Returns
    /// Number of devices stored.
    pub fn discover<O: OneWire>(&mut self, bus: &mut O) -> Ds18b20Result<usize, O::BusError> {
        let mut found = DeviceRegistry::<N>::new();
        let mut search = OneWireSearch::new(bus, OneWireSearchKind::Normal);
        while !found.is_full() {
            let rom = match search.next() {
                Ok(Some(rom)) => rom,
                Ok(None) => break,
                Err(OneWireError::NoDevicePresent) => {
                    log::debug!("no presence pulse, bus is empty");
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            let address = Address::from(rom);
            if !address.is_valid() {
                log::warn!("discarding {}: address CRC mismatch", address);
                continue;
            }
            log::debug!("found {}", address);
            if found.push(address).is_err() {
                break;
            }
        }
        if found.is_full() {
            log::info!("device registry full, discovery stopped at {} devices", N);
        }
        self.registry = found;
        log::info!("Found {} devices", self.registry.len());
        Ok(self.registry.len())
    }

    /// Discovers the bus and requires at least one device.
    ///
    /// # Errors
    /// [`Ds18b20Error::NoDevices`] if nothing valid answered.
    pub fn begin<O: OneWire>(&mut self, bus: &mut O) -> Ds18b20Result<usize, O::BusError> {
        self.alarm_search.reset();
        match self.discover(bus)? {
            0 => Err(Ds18b20Error::NoDevices),
            count => Ok(count),
        }
    }

    /// Returns `true` if the bus master can run the alarm search.
    pub fn supports_alarm_search<O: OneWire>(&self, bus: &O) -> bool {
        bus.supports_conditional_search()
    }

    /// Finds the next device whose last conversion is outside its [T_L, T_H] window.
    ///
    /// The search position is kept between calls; call repeatedly to walk all
    /// alarmed devices. `None` marks the end of a pass, and the following call
    /// starts a new one. Addresses failing their CRC check are skipped.
    ///
    /// # Errors
    /// [`OneWireError::Unimplemented`] if the bus master cannot run the
    /// conditional search.
    pub fn alarm_search<O: OneWire>(
        &mut self,
        bus: &mut O,
    ) -> Ds18b20Result<Option<Address>, O::BusError> {
        if !self.supports_alarm_search(bus) {
            return Err(Ds18b20Error::OneWire(OneWireError::Unimplemented));
        }
        loop {
            match self.alarm_search.next(bus) {
                Ok(Some(rom)) => {
                    let address = Address::from(rom);
                    if address.is_valid() {
                        log::debug!("{} is alarmed", address);
                        return Ok(Some(address));
                    }
                    log::warn!("discarding {}: address CRC mismatch", address);
                }
                Ok(None) | Err(OneWireError::NoDevicePresent) => {
                    self.alarm_search.reset();
                    return Ok(None);
                }
                Err(e) => {
                    self.alarm_search.reset();
                    return Err(e.into());
                }
            }
        }
    }

    /// Restarts the alarm search from the beginning of the bus.
    pub fn reset_alarm_search(&mut self) {
        self.alarm_search.reset();
    }
}
