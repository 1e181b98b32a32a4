use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::ipv4::checksum;

enum_with_unknown! {
    /// Internet protocol control message type.
    pub doc enum Message(u8) {
        /// Echo reply
        EchoReply = 0,
        /// Echo request
        EchoRequest = 8,
    }
}

byte_wrapper! {
    /// A byte sequence representing an ICMPv4 packet.
    #[derive(Debug, PartialEq, Eq)]
    pub struct icmpv4([u8]);
}

// Offsets of the echo flavour, the only one this stack speaks.
mod field {
    use crate::wire::field::*;

    pub(crate) const TYPE:     usize = 0;
    pub(crate) const CODE:     usize = 1;
    pub(crate) const CHECKSUM: Field = 2..4;
    pub(crate) const IDENT:    Field = 4..6;
    pub(crate) const SEQ_NO:   Field = 6..8;
    pub(crate) const DATA:     Rest  = 8..;
}

/// The length of an ICMPv4 echo header.
pub const HEADER_LEN: usize = field::DATA.start;

impl icmpv4 {
    /// Imbue a raw octet buffer with ICMPv4 packet structure.
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with ICMPv4 packet structure.
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
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the message type field.
    pub fn msg_type(&self) -> Message {
        self.0[field::TYPE].into()
    }

    /// Return the message code field.
    pub fn msg_code(&self) -> u8 {
        self.0[field::CODE]
    }

    /// Return the checksum field.
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the echo identifier field.
    pub fn echo_ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::IDENT])
    }

    /// Return the echo sequence number field.
    pub fn echo_seq_no(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::SEQ_NO])
    }

    /// Return the echo data.
    pub fn data_slice(&self) -> &[u8] {
        &self.0[field::DATA]
    }

    /// Set the message type field.
    pub fn set_msg_type(&mut self, value: Message) {
        self.0[field::TYPE] = value.into()
    }

    /// Set the message code field.
    pub fn set_msg_code(&mut self, value: u8) {
        self.0[field::CODE] = value
    }

    /// Set the echo identifier field.
    pub fn set_echo_ident(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::IDENT], value)
    }

    /// Set the echo sequence number field.
    pub fn set_echo_seq_no(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::SEQ_NO], value)
    }

    /// Return the mutable echo data.
    pub fn data_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[field::DATA]
    }

    /// Compute and fill in the checksum over the whole message.
    pub fn fill_checksum(&mut self) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], 0);
        let sum = !checksum::data(&self.0);
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], sum)
    }

    /// Validate the message checksum.
    pub fn verify_checksum(&self) -> bool {
        checksum::data(&self.0) == !0
    }
}
