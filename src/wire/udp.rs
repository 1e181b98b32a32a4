use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::ipv4::{checksum, Address as Ipv4Address, Protocol};

byte_wrapper! {
    /// A byte sequence representing an UDP packet.
    #[derive(Debug, PartialEq, Eq)]
    pub struct udp([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const LENGTH:   Field = 4..6;
    pub(crate) const CHECKSUM: Field = 6..8;
    pub(crate) const PAYLOAD:  Rest  = 8..;
}

/// The length of an UDP header.
pub const HEADER_LEN: usize = field::PAYLOAD.start;

impl udp {
    /// Imbue a raw octet buffer with UDP packet structure.
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with UDP packet structure.
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
    /// Returns `Err(Error::Truncated)` if the buffer is too short, and
    /// `Err(Error::Malformed)` if the length field disagrees with the buffer.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < HEADER_LEN {
            return Err(Error::Truncated);
        }
        let field_len = self.len() as usize;
        if field_len < HEADER_LEN {
            Err(Error::Malformed)
        } else if len < field_len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the source port field.
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::SRC_PORT])
    }

    /// Return the destination port field.
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::DST_PORT])
    }

    /// Return the length field.
    pub fn len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the checksum field.
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Set the source port field.
    pub fn set_src_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::SRC_PORT], value)
    }

    /// Set the destination port field.
    pub fn set_dst_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::DST_PORT], value)
    }

    /// Set the length field.
    pub fn set_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], value)
    }

    /// Return the payload according to the length field.
    pub fn payload_slice(&self) -> &[u8] {
        let end = self.len() as usize;
        &self.0[field::PAYLOAD.start..end]
    }

    /// Return the mutable payload according to the length field.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let end = self.len() as usize;
        &mut self.0[field::PAYLOAD.start..end]
    }

    /// Compute and fill in the checksum, including the IPv4 pseudo-header.
    pub fn fill_checksum(&mut self, src_addr: Ipv4Address, dst_addr: Ipv4Address) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], 0);
        let sum = {
            let length = self.len();
            !checksum::combine(&[
                checksum::pseudo_header(src_addr, dst_addr, Protocol::Udp, length),
                checksum::data(&self.0[..length as usize]),
            ])
        };
        // UDP transmits a zero checksum as all ones.
        let sum = if sum == 0 { 0xffff } else { sum };
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], sum)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static PACKET_BYTES: [u8; 12] = [
        0xbf, 0x00, 0x00, 0x35,
        0x00, 0x0c, 0x12, 0x4d,
        0xaa, 0x00, 0x00, 0xff,
    ];

    const SRC_ADDR: Ipv4Address = Ipv4Address::new(192, 168, 1, 1);
    const DST_ADDR: Ipv4Address = Ipv4Address::new(192, 168, 1, 2);

    #[test]
    fn test_deconstruct() {
        let packet = udp::new_checked(&PACKET_BYTES[..]).unwrap();
        assert_eq!(packet.src_port(), 48896);
        assert_eq!(packet.dst_port(), 53);
        assert_eq!(packet.len(), 12);
        assert_eq!(packet.checksum(), 0x124d);
        assert_eq!(packet.payload_slice(), &PACKET_BYTES[8..]);
    }

    #[test]
    fn test_construct() {
        let mut bytes = [0xa5; 12];
        let packet = udp::new_unchecked_mut(&mut bytes);
        packet.set_src_port(48896);
        packet.set_dst_port(53);
        packet.set_len(12);
        packet.payload_mut_slice().copy_from_slice(&PACKET_BYTES[8..]);
        packet.fill_checksum(SRC_ADDR, DST_ADDR);
        assert_eq!(&bytes[..], &PACKET_BYTES[..]);
    }

    #[test]
    fn test_length_disagreement() {
        let mut bytes = PACKET_BYTES;
        bytes[5] = 16;
        assert_eq!(udp::new_checked(&bytes[..]).unwrap_err(), Error::Truncated);
    }
}
