//! The neighbor mapping cache.
//!
//! Mappings are only ever learned opportunistically, from inbound ARP packets and from
//! inbound IP traffic addressed to us. The engine never sends requests of its own; a
//! transmission to an unresolved neighbor simply goes out to the broadcast address and
//! the reply traffic fills the cache.
use crate::wire::{EthernetAddress, Ipv4Address};

/// The number of cached mappings.
pub const CACHE_SIZE: usize = 6;

/// Seconds a mapping stays valid without being refreshed.
pub const ENTRY_LIFETIME: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    ip: Ipv4Address,
    mac: EthernetAddress,
    ttl: u16,
}

/// A fixed-size cache of IP-to-hardware address mappings.
#[derive(Debug, Clone, Copy)]
pub struct Cache {
    entries: [Option<Entry>; CACHE_SIZE],
}

impl Cache {
    /// An empty cache.
    pub fn new() -> Self {
        Cache { entries: [None; CACHE_SIZE] }
    }

    /// Learn or refresh a mapping.
    ///
    /// A mapping for a known IP is overwritten in place with a fresh lifetime.
    /// Otherwise the first free slot is taken; with no free slot the mapping is
    /// dropped on the floor, the next refresh of an old entry will free space
    /// eventually.
    pub fn learn(&mut self, mac: EthernetAddress, ip: Ipv4Address) {
        if ip.is_unspecified() || !mac.is_unicast() {
            return;
        }
        let fresh = Entry { ip, mac, ttl: ENTRY_LIFETIME };
        for slot in self.entries.iter_mut() {
            if let Some(entry) = slot {
                if entry.ip == ip {
                    *entry = fresh;
                    return;
                }
            }
        }
        match self.entries.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some(fresh),
            None => net_debug!("arp: cache full, not learning {}", ip),
        }
    }

    /// Look up the hardware address for an IP address.
    pub fn resolve(&self, ip: Ipv4Address) -> Option<EthernetAddress> {
        self.entries.iter()
            .filter_map(|slot| slot.as_ref())
            .find(|entry| entry.ip == ip)
            .map(|entry| entry.mac)
    }

    /// Advance the cache clock by one second, evicting expired mappings.
    pub fn age(&mut self) {
        for slot in self.entries.iter_mut() {
            if let Some(entry) = slot {
                entry.ttl -= 1;
                if entry.ttl == 0 {
                    net_trace!("arp: mapping for {} expired", entry.ip);
                    *slot = None;
                }
            }
        }
    }

    /// The number of live mappings.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// Query whether no mapping is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
