use embedded_onewire::{OneWireSearchCursor, OneWireSearchKind};

use crate::{
    Address, DeviceRegistry, Ds18b20Error, Ds18b20Result, MAX_DEVICES, NoPullup,
    pullup::StrongPullup,
};

/// DS18B20 thermometers sharing one 1-Wire bus.
///
/// Holds the addresses found by [`discover`](Ds18b20::discover), the optional
/// strong pull-up line and the alarm search cursor. The bus and the delay are
/// passed to every call, so each call runs a complete reset, select, command
/// and response sequence on its own.
#[derive(Debug)]
pub struct Ds18b20<P = NoPullup, const N: usize = MAX_DEVICES> {
    pub(crate) registry: DeviceRegistry<N>,
    pub(crate) pullup: StrongPullup<P>,
    pub(crate) alarm_search: OneWireSearchCursor,
}

impl Default for Ds18b20 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ds18b20 {
    /// Driver without a strong pull-up line, holding up to [`MAX_DEVICES`] addresses.
    pub fn new() -> Self {
        Self::with_capacity()
    }
}

impl<const N: usize> Ds18b20<NoPullup, N> {
    /// Driver without a strong pull-up line, holding up to `N` addresses.
    pub fn with_capacity() -> Self {
        Self {
            registry: DeviceRegistry::new(),
            pullup: StrongPullup::none(),
            alarm_search: OneWireSearchCursor::new(OneWireSearchKind::Alarmed),
        }
    }
}

impl<P, const N: usize> Ds18b20<P, N> {
    /// Uses `pin` as an active-high strong pull-up during conversions and
    /// EEPROM writes of parasite-powered devices.
    pub fn with_strong_pullup<Q>(self, pin: Q) -> Ds18b20<Q, N> {
        Ds18b20 {
            registry: self.registry,
            pullup: StrongPullup::new(pin),
            alarm_search: self.alarm_search,
        }
    }

    /// Returns `true` if a strong pull-up line is configured.
    pub fn has_strong_pullup(&self) -> bool {
        self.pullup.is_configured()
    }

    /// Gives back the strong pull-up line.
    pub fn release(self) -> Option<P> {
        self.pullup.release()
    }

    /// Number of devices found by the last discovery.
    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    /// Address of device `index` in discovery order.
    ///
    /// # Errors
    /// [`Ds18b20Error::IndexOutOfRange`] past the last discovered device.
    pub fn address<E>(&self, index: usize) -> Ds18b20Result<Address, E> {
        self.registry
            .get(index)
            .copied()
            .ok_or(Ds18b20Error::IndexOutOfRange {
                index,
                len: self.registry.len(),
            })
    }

    /// Addresses found by the last discovery.
    pub fn devices(&self) -> &[Address] {
        self.registry.as_slice()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &DeviceRegistry<N> {
        &self.registry
    }
}
