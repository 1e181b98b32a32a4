use core::{fmt, ops};
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::ipv4::{checksum, Address as Ipv4Address, Protocol};

/// A sequence number, defined modulo 2 to the 32.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct SeqNumber(pub u32);

impl SeqNumber {
    /// The raw sequence number.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ops::Add<usize> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: usize) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(rhs as u32))
    }
}

impl ops::AddAssign<usize> for SeqNumber {
    fn add_assign(&mut self, rhs: usize) {
        *self = *self + rhs;
    }
}

/// The flag byte of a TCP segment.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct Flags(pub u8);

impl Flags {
    /// No flag set.
    pub const NONE: Flags = Flags(0);
    /// The finish flag.
    pub const FIN: Flags = Flags(0x01);
    /// The synchronize flag.
    pub const SYN: Flags = Flags(0x02);
    /// The reset flag.
    pub const RST: Flags = Flags(0x04);
    /// The push flag.
    pub const PSH: Flags = Flags(0x08);
    /// The acknowledge flag.
    pub const ACK: Flags = Flags(0x10);

    /// Query whether all flags in `other` are set in `self`.
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Query whether any flag in `other` is set in `self`.
    pub fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Query whether no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (flag, name) in &[
            (Flags::FIN, "FIN"), (Flags::SYN, "SYN"), (Flags::RST, "RST"),
            (Flags::PSH, "PSH"), (Flags::ACK, "ACK"),
        ] {
            if self.contains(*flag) {
                if !first { write!(f, "|")?; }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first { write!(f, "none")?; }
        Ok(())
    }
}

byte_wrapper! {
    /// A byte sequence representing a TCP segment.
    #[derive(Debug, PartialEq, Eq)]
    pub struct tcp([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const SEQ_NUM:  Field = 4..8;
    pub(crate) const ACK_NUM:  Field = 8..12;
    pub(crate) const OFFSET:   usize = 12;
    pub(crate) const FLAGS:    usize = 13;
    pub(crate) const WIN_SIZE: Field = 14..16;
    pub(crate) const CHECKSUM: Field = 16..18;
    pub(crate) const URGENT:   Field = 18..20;
}

/// The length of a TCP header without options.
pub const HEADER_LEN: usize = field::URGENT.end;

/// The option kind and length of a maximum segment size option.
const OPT_MSS: u8 = 0x02;
const OPT_MSS_LEN: u8 = 0x04;

impl tcp {
    /// Imbue a raw octet buffer with TCP segment structure.
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with TCP segment structure.
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let segment = Self::new_unchecked(data);
        segment.check_len()?;
        Ok(segment)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short and
    /// `Err(Error::Malformed)` if the data offset points outside the segment.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < HEADER_LEN {
            return Err(Error::Truncated);
        }
        let header_len = self.header_len() as usize;
        if header_len < HEADER_LEN || header_len > len {
            Err(Error::Malformed)
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

    /// Return the sequence number field.
    pub fn seq_number(&self) -> SeqNumber {
        SeqNumber(NetworkEndian::read_u32(&self.0[field::SEQ_NUM]))
    }

    /// Return the acknowledgement number field.
    pub fn ack_number(&self) -> SeqNumber {
        SeqNumber(NetworkEndian::read_u32(&self.0[field::ACK_NUM]))
    }

    /// Return the header length, in octets.
    pub fn header_len(&self) -> u8 {
        (self.0[field::OFFSET] >> 4) * 4
    }

    /// Return the flag byte.
    pub fn flags(&self) -> Flags {
        Flags(self.0[field::FLAGS] & 0x3f)
    }

    /// Return the window size field.
    pub fn window_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::WIN_SIZE])
    }

    /// Return the checksum field.
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the urgent pointer field.
    pub fn urgent_at(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::URGENT])
    }

    /// Set the source port field.
    pub fn set_src_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::SRC_PORT], value)
    }

    /// Set the destination port field.
    pub fn set_dst_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::DST_PORT], value)
    }

    /// Set the sequence number field.
    pub fn set_seq_number(&mut self, value: SeqNumber) {
        NetworkEndian::write_u32(&mut self.0[field::SEQ_NUM], value.raw())
    }

    /// Set the acknowledgement number field.
    pub fn set_ack_number(&mut self, value: SeqNumber) {
        NetworkEndian::write_u32(&mut self.0[field::ACK_NUM], value.raw())
    }

    /// Set the header length, in octets.
    ///
    /// # Panics
    /// The function panics if the length is not a multiple of four.
    pub fn set_header_len(&mut self, value: u8) {
        assert_eq!(value % 4, 0);
        self.0[field::OFFSET] = (value / 4) << 4;
    }

    /// Set the flag byte.
    pub fn set_flags(&mut self, value: Flags) {
        self.0[field::FLAGS] = value.0;
    }

    /// Set the window size field.
    pub fn set_window_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::WIN_SIZE], value)
    }

    /// Set the urgent pointer field.
    pub fn set_urgent_at(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::URGENT], value)
    }

    /// Write a maximum segment size option directly after the header.
    ///
    /// The header length field must already account for the four option octets.
    pub fn set_mss_option(&mut self, mss: u16) {
        let option = &mut self.0[HEADER_LEN..HEADER_LEN + 4];
        option[0] = OPT_MSS;
        option[1] = OPT_MSS_LEN;
        NetworkEndian::write_u16(&mut option[2..4], mss);
    }

    /// Return the options, if any.
    pub fn options_slice(&self) -> &[u8] {
        let end = self.header_len() as usize;
        &self.0[HEADER_LEN..end]
    }

    /// Return the payload after the header and options.
    pub fn payload_slice(&self) -> &[u8] {
        let begin = self.header_len() as usize;
        &self.0[begin..]
    }

    /// Return the mutable payload after the header and options.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let begin = self.header_len() as usize;
        &mut self.0[begin..]
    }

    /// Compute and fill in the checksum, including the IPv4 pseudo-header.
    ///
    /// The checksum covers the entire wrapped buffer, which therefore must end with
    /// the segment.
    pub fn fill_checksum(&mut self, src_addr: Ipv4Address, dst_addr: Ipv4Address) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], 0);
        let sum = !checksum::combine(&[
            checksum::pseudo_header(src_addr, dst_addr, Protocol::Tcp, self.0.len() as u16),
            checksum::data(&self.0),
        ]);
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], sum)
    }

    /// Validate the segment checksum.
    pub fn verify_checksum(&self, src_addr: Ipv4Address, dst_addr: Ipv4Address) -> bool {
        checksum::combine(&[
            checksum::pseudo_header(src_addr, dst_addr, Protocol::Tcp, self.0.len() as u16),
            checksum::data(&self.0),
        ]) == !0
    }
}
