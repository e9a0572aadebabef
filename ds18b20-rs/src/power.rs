use embedded_hal::digital::OutputPin;
use embedded_onewire::OneWire;

use crate::{Address, DS18B20_READ_POWERMODE, Ds18b20, Ds18b20Result, protocol::select};

impl<P: OutputPin, const N: usize> Ds18b20<P, N> {
    /// Issues Read Power Supply and samples the single response slot.
    ///
    /// # Returns
    /// `true` for an externally powered device, `false` for parasite power.
    /// The response carries no CRC.
    pub fn read_power_supply<O: OneWire>(
        &self,
        bus: &mut O,
        address: &Address,
    ) -> Ds18b20Result<bool, O::BusError> {
        select(bus, address, DS18B20_READ_POWERMODE)?;
        Ok(bus.read_bit()?)
    }

    /// Returns `true` only if `address` positively reports parasite power.
    ///
    /// A query that cannot be completed counts as external power, so the
    /// strong pull-up is never asserted on an unknown power state.
    pub fn is_parasite_power<O: OneWire>(&self, bus: &mut O, address: &Address) -> bool {
        match self.read_power_supply(bus, address) {
            Ok(external) => !external,
            Err(_) => {
                log::warn!("{}: power supply query failed, assuming external power", address);
                false
            }
        }
    }
}
