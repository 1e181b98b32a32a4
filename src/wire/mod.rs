/*! Low-level packet access and construction.

# An overview over packet representations

The `wire` module deals with the packet *representation*. It provides two levels of
functionality.

 * First, it provides functions to extract fields from sequences of octets, and to insert fields
   into sequences of octets. This happens in the lowercase structures, e.g. [`ethernet_frame`] or
   [`tcp_segment`]. These are unsized byte wrappers, so a frame sitting in a fixed buffer can be
   viewed and edited in place without copying it.
 * Second, it provides a compact, high-level representation of header data that can be created
   from parsing and emitted into a sequence of octets. This happens through the `Repr` family of
   structs, e.g. [`ArpRepr`]. Only the headers the engine copies out wholesale have one; the rest
   of the stack edits headers through the byte wrappers directly.

[`ethernet_frame`]: struct.ethernet_frame.html
[`tcp_segment`]: struct.tcp_segment.html
[`ArpRepr`]: struct.ArpRepr.html

The byte wrappers guarantee that, if the `check_len()` method returned `Ok(())`, then no field
accessor or setter method will panic while the buffer keeps its length. When parsing untrusted
input it is *necessary* to use `new_checked`; so long as the buffer is not shortened, no accessor
will fail afterwards. `Repr::parse()` never panics on a checked buffer and `Repr::emit()` never
panics as long as the underlying buffer is at least `buffer_len()` octets long.
*/
// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
//
// Applies to files in this folder unless otherwise noted. These are:
// * `arp.rs`
// * `error.rs`
// * `ethernet.rs`
// * `icmpv4.rs`
// * `ipv4.rs`
// * `mod.rs` (this file)
// * `tcp.rs`
// * `udp.rs`

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

mod arp;
mod error;
mod ethernet;
mod icmpv4;
mod ipv4;
mod tcp;
mod udp;

pub use self::error::{
    Error,
    Result};

pub use self::ethernet::{
    ethernet as ethernet_frame,
    EtherType as EthernetProtocol,
    Address as EthernetAddress,
    Repr as EthernetRepr,
    HEADER_LEN as ETHERNET_HEADER_LEN};

pub use self::arp::{
    arp as arp_packet,
    Hardware as ArpHardware,
    Operation as ArpOperation,
    Repr as ArpRepr,
    PACKET_LEN as ARP_PACKET_LEN};

pub use self::ipv4::{
    checksum,
    ipv4 as ipv4_packet,
    Address as Ipv4Address,
    Protocol as IpProtocol,
    HEADER_LEN as IPV4_HEADER_LEN};

pub use self::icmpv4::{
    icmpv4 as icmpv4_packet,
    Message as Icmpv4Message,
    HEADER_LEN as ICMPV4_HEADER_LEN};

pub use self::udp::{
    udp as udp_packet,
    HEADER_LEN as UDP_HEADER_LEN};

pub use self::tcp::{
    tcp as tcp_segment,
    SeqNumber as TcpSeqNumber,
    Flags as TcpFlags,
    HEADER_LEN as TCP_HEADER_LEN};
