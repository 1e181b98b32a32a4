//! Fixed-size registries of application ports.

/// The most slots any port registry can carry.
pub(crate) const MAX_PORTS: usize = 5;

/// A first-free-slot table of open local ports.
///
/// Mirrors the flat firmware-style arrays the rest of the engine uses: a registration
/// takes the first empty slot, removal frees it, and lookups are linear. The capacity
/// may be configured below [`MAX_PORTS`] so the TCP and UDP registries can be sized
/// independently.
///
/// [`MAX_PORTS`]: constant.MAX_PORTS.html
#[derive(Debug, Clone, Copy)]
pub(crate) struct PortTable {
    slots: [Option<u16>; MAX_PORTS],
    cap: usize,
}

impl PortTable {
    /// A table with `cap` usable slots.
    ///
    /// # Panics
    /// Panics if `cap` exceeds [`MAX_PORTS`].
    ///
    /// [`MAX_PORTS`]: constant.MAX_PORTS.html
    pub(crate) fn new(cap: usize) -> Self {
        assert!(cap <= MAX_PORTS);
        PortTable { slots: [None; MAX_PORTS], cap }
    }

    /// Register a port in the first free slot.
    ///
    /// Re-registering an open port is a no-op. Returns false when the table is full.
    pub(crate) fn open(&mut self, port: u16) -> bool {
        if self.contains(port) {
            return true;
        }
        match self.slots[..self.cap].iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(port);
                true
            }
            None => false,
        }
    }

    /// Remove a port, freeing its slot.
    pub(crate) fn close(&mut self, port: u16) {
        for slot in self.slots[..self.cap].iter_mut() {
            if *slot == Some(port) {
                *slot = None;
            }
        }
    }

    /// Query whether a port is registered.
    pub(crate) fn contains(&self, port: u16) -> bool {
        self.slots[..self.cap].iter().any(|slot| *slot == Some(port))
    }
}
