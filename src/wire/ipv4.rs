use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        Icmp = 0x01,
        Tcp  = 0x06,
        Udp  = 0x11,
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Icmp => write!(f, "ICMP"),
            Protocol::Tcp  => write!(f, "TCP"),
            Protocol::Udp  => write!(f, "UDP"),
            Protocol::Unknown(id) => write!(f, "0x{:02x}", id),
        }
    }
}

/// A four-octet IPv4 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// An unspecified address.
    pub const UNSPECIFIED: Address = Address([0x00; 4]);

    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 4]);

    /// Construct an IPv4 address from parts.
    pub const fn new(a0: u8, a1: u8, a2: u8, a3: u8) -> Address {
        Address([a0, a1, a2, a3])
    }

    /// Construct an IPv4 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not four octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return an IPv4 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() || self.is_multicast() || self.is_unspecified())
    }

    /// Query whether the address is the global broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the address is a multicast address.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0xf0 == 0xe0
    }

    /// Query whether the address falls into the "unspecified" range.
    pub fn is_unspecified(&self) -> bool {
        self.0[0] == 0
    }

    /// Return the directed broadcast address for this address under `netmask`.
    pub fn subnet_broadcast(&self, netmask: Address) -> Address {
        let mut bytes = [0; 4];
        for (b, (&addr, &mask)) in bytes.iter_mut().zip(self.0.iter().zip(netmask.0.iter())) {
            *b = addr | !mask;
        }
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

byte_wrapper! {
    /// A byte sequence representing an IPv4 packet.
    #[derive(Debug, PartialEq, Eq)]
    pub struct ipv4([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const VER_IHL:  usize = 0;
    pub(crate) const DSCP_ECN: usize = 1;
    pub(crate) const LENGTH:   Field = 2..4;
    pub(crate) const IDENT:    Field = 4..6;
    pub(crate) const FLG_OFF:  Field = 6..8;
    pub(crate) const TTL:      usize = 8;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const CHECKSUM: Field = 10..12;
    pub(crate) const SRC_ADDR: Field = 12..16;
    pub(crate) const DST_ADDR: Field = 16..20;
}

/// The length of an IPv4 header without options.
pub const HEADER_LEN: usize = field::DST_ADDR.end;

impl ipv4 {
    /// Imbue a raw octet buffer with IPv4 packet structure.
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with IPv4 packet structure.
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short, or if the header
    /// length or total length fields point past the end of the buffer.
    /// Returns `Err(Error::Malformed)` if the header length is shorter than the fixed
    /// header or the total length shorter than the header.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < HEADER_LEN {
            return Err(Error::Truncated);
        }
        let header_len = self.header_len() as usize;
        let total_len = self.total_len() as usize;
        if header_len < HEADER_LEN || total_len < header_len {
            Err(Error::Malformed)
        } else if len < total_len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the version field.
    pub fn version(&self) -> u8 {
        self.0[field::VER_IHL] >> 4
    }

    /// Return the header length, in octets.
    pub fn header_len(&self) -> u8 {
        (self.0[field::VER_IHL] & 0x0f) * 4
    }

    /// Return the total length field.
    pub fn total_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the fragment identification field.
    pub fn ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::IDENT])
    }

    /// Return the "don't fragment" flag.
    pub fn dont_frag(&self) -> bool {
        NetworkEndian::read_u16(&self.0[field::FLG_OFF]) & 0x4000 != 0
    }

    /// Return the time to live field.
    pub fn hop_limit(&self) -> u8 {
        self.0[field::TTL]
    }

    /// Return the protocol field.
    pub fn protocol(&self) -> Protocol {
        self.0[field::PROTOCOL].into()
    }

    /// Return the header checksum field.
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the source address field.
    pub fn src_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::SRC_ADDR])
    }

    /// Return the destination address field.
    pub fn dst_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::DST_ADDR])
    }

    /// Set the version and header length fields for an option-less header.
    pub fn set_version_header_len(&mut self) {
        self.0[field::VER_IHL] = 0x45;
    }

    /// Set the DSCP and ECN fields.
    pub fn set_dscp_ecn(&mut self, value: u8) {
        self.0[field::DSCP_ECN] = value;
    }

    /// Set the total length field.
    pub fn set_total_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], value)
    }

    /// Set the fragment identification field.
    pub fn set_ident(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::IDENT], value)
    }

    /// Set the "don't fragment" flag and clear the fragment offset.
    pub fn set_dont_frag(&mut self) {
        NetworkEndian::write_u16(&mut self.0[field::FLG_OFF], 0x4000)
    }

    /// Set the time to live field.
    pub fn set_hop_limit(&mut self, value: u8) {
        self.0[field::TTL] = value
    }

    /// Set the protocol field.
    pub fn set_protocol(&mut self, value: Protocol) {
        self.0[field::PROTOCOL] = value.into()
    }

    /// Set the source address field.
    pub fn set_src_addr(&mut self, value: Address) {
        self.0[field::SRC_ADDR].copy_from_slice(value.as_bytes())
    }

    /// Set the destination address field.
    pub fn set_dst_addr(&mut self, value: Address) {
        self.0[field::DST_ADDR].copy_from_slice(value.as_bytes())
    }

    /// Compute and fill in the header checksum.
    pub fn fill_checksum(&mut self) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], 0);
        let sum = {
            let len = self.header_len() as usize;
            !checksum::data(&self.0[..len])
        };
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], sum)
    }

    /// Validate the header checksum.
    pub fn verify_checksum(&self) -> bool {
        let len = self.header_len() as usize;
        checksum::data(&self.0[..len]) == !0
    }

    /// Return the payload after the header.
    pub fn payload_slice(&self) -> &[u8] {
        let begin = self.header_len() as usize;
        let end = self.total_len() as usize;
        &self.0[begin..end]
    }

    /// Return the mutable payload after the header.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let begin = self.header_len() as usize;
        let end = self.total_len() as usize;
        &mut self.0[begin..end]
    }
}

/// Internet checksum routines shared by all protocols carrying one.
pub mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};
    use super::{Address, Protocol};

    fn propagate_carries(word: u32) -> u16 {
        let sum = (word >> 16) + (word & 0xffff);
        ((sum >> 16) as u16) + (sum as u16)
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    pub fn data(data: &[u8]) -> u16 {
        let mut accum: u32 = 0;
        let mut chunks = data.chunks_exact(2);
        for chunk in &mut chunks {
            accum += u32::from(NetworkEndian::read_u16(chunk));
        }
        // Add the last remaining odd octet, padded with zeroes on the right.
        if let &[last] = chunks.remainder() {
            accum += u32::from(last) << 8;
        }
        propagate_carries(accum)
    }

    /// Combine several RFC 1071 compliant checksums.
    pub fn combine(checksums: &[u16]) -> u16 {
        let mut accum: u32 = 0;
        for &word in checksums {
            accum += u32::from(word);
        }
        propagate_carries(accum)
    }

    /// Compute the checksum of the IPv4 pseudo-header used by TCP and UDP.
    pub fn pseudo_header(src_addr: Address, dst_addr: Address,
                         protocol: Protocol, length: u16) -> u16 {
        let mut proto_len = [0u8; 4];
        proto_len[1] = protocol.into();
        NetworkEndian::write_u16(&mut proto_len[2..4], length);

        combine(&[
            data(src_addr.as_bytes()),
            data(dst_addr.as_bytes()),
            data(&proto_len[..]),
        ])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // A classic header: 192.168.0.1 -> 192.168.0.199, UDP, 115 octets total.
    static HEADER_BYTES: [u8; 20] = [
        0x45, 0x00, 0x00, 0x73,
        0x00, 0x00, 0x40, 0x00,
        0x40, 0x11, 0xb8, 0x61,
        0xc0, 0xa8, 0x00, 0x01,
        0xc0, 0xa8, 0x00, 0xc7,
    ];

    #[test]
    fn test_deconstruct() {
        let mut bytes = [0u8; 0x73];
        bytes[..20].copy_from_slice(&HEADER_BYTES[..]);
        let packet = ipv4::new_checked(&bytes[..]).unwrap();
        assert_eq!(packet.version(), 4);
        assert_eq!(packet.header_len(), 20);
        assert_eq!(packet.total_len(), 0x73);
        assert!(packet.dont_frag());
        assert_eq!(packet.hop_limit(), 64);
        assert_eq!(packet.protocol(), Protocol::Udp);
        assert_eq!(packet.checksum(), 0xb861);
        assert_eq!(packet.src_addr(), Address::new(192, 168, 0, 1));
        assert_eq!(packet.dst_addr(), Address::new(192, 168, 0, 199));
        assert!(packet.verify_checksum());
        assert_eq!(packet.payload_slice().len(), 0x73 - 20);
    }

    #[test]
    fn test_fill_checksum() {
        let mut bytes = HEADER_BYTES;
        bytes[10] = 0;
        bytes[11] = 0;
        ipv4::new_unchecked_mut(&mut bytes).fill_checksum();
        assert_eq!(&bytes[..], &HEADER_BYTES[..]);
    }

    #[test]
    fn test_checksum_vector() {
        // Checksum over the header with the checksum field zeroed must give back the
        // transmitted value.
        let mut bytes = HEADER_BYTES;
        bytes[10] = 0;
        bytes[11] = 0;
        assert_eq!(!checksum::data(&bytes[..]), 0xb861);
    }

    #[test]
    fn test_odd_length_data() {
        assert_eq!(checksum::data(&[0x12, 0x34, 0x56]), 0x6834);
    }

    #[test]
    fn test_pseudo_header() {
        let sum = checksum::pseudo_header(
            Address::new(192, 168, 0, 1),
            Address::new(192, 168, 0, 199),
            Protocol::Udp,
            0x73 - 20);
        let by_hand = checksum::combine(&[
            0xc0a8, 0x0001, 0xc0a8, 0x00c7, 0x0011, 0x005f,
        ]);
        assert_eq!(sum, by_hand);
    }

    #[test]
    fn test_subnet_broadcast() {
        let addr = Address::new(192, 168, 0, 222);
        let mask = Address::new(255, 255, 255, 0);
        assert_eq!(addr.subnet_broadcast(mask), Address::new(192, 168, 0, 255));
    }

    #[test]
    fn test_malformed_lengths() {
        let mut bytes = [0u8; 0x73];
        bytes[..20].copy_from_slice(&HEADER_BYTES[..]);
        bytes[0] = 0x42;
        assert_eq!(ipv4::new_checked(&bytes[..]).unwrap_err(), Error::Malformed);
    }
}
