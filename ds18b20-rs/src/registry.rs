use crate::Address;

/// Ordered, fixed-capacity list of discovered device addresses.
///
/// Entries keep discovery order. Once `N` addresses are stored further
/// pushes are refused and the caller stops enumerating.
#[derive(Debug, Clone)]
pub struct DeviceRegistry<const N: usize> {
    devices: usize,
    roms: [Address; N],
}

impl<const N: usize> Default for DeviceRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeviceRegistry<N> {
    /// Maximum number of addresses the registry holds.
    pub const CAPACITY: usize = N;

    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            devices: 0,
            roms: [Address::from_bytes([0; Address::BYTES]); N],
        }
    }

    /// Number of stored addresses.
    pub fn len(&self) -> usize {
        self.devices
    }

    /// Returns `true` if no address is stored.
    pub fn is_empty(&self) -> bool {
        self.devices == 0
    }

    /// Returns `true` once `N` addresses are stored.
    pub fn is_full(&self) -> bool {
        self.devices == N
    }

    /// Appends an address.
    ///
    /// # Errors
    /// Hands the address back if the registry is full.
    pub fn push(&mut self, address: Address) -> Result<(), Address> {
        if self.is_full() {
            return Err(address);
        }
        self.roms[self.devices] = address;
        self.devices += 1;
        Ok(())
    }

    /// Address at `index`, in discovery order.
    pub fn get(&self, index: usize) -> Option<&Address> {
        self.as_slice().get(index)
    }

    /// Removes every address.
    pub fn clear(&mut self) {
        self.devices = 0;
    }

    /// Stored addresses, in discovery order.
    pub fn as_slice(&self) -> &[Address] {
        &self.roms[..self.devices]
    }

    /// Iterates over the stored addresses.
    pub fn iter(&self) -> core::slice::Iter<'_, Address> {
        self.as_slice().iter()
    }
}

impl<'a, const N: usize> IntoIterator for &'a DeviceRegistry<N> {
    type Item = &'a Address;
    type IntoIter = core::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
