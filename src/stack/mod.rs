//! The protocol engine.
//!
//! One [`Stack`] value owns every table and buffer of the engine: the ARP cache, the
//! TCP connection table, the port registries, a single outstanding ping probe, and
//! two MTU-sized frame buffers (one for the frame being dispatched, one for the reply
//! being built). Applications hand it a [`Device`](../nic/trait.Device.html) and an
//! [`Events`] implementation on every poll; the engine stores neither.
//!
//! The intended driving pattern, from interrupt context:
//!
//! * the controller's receive interrupt calls [`Stack::interrupt`],
//! * a one-second timer calls [`Stack::tick`],
//! * the main loop calls [`Stack::poll`] as often as it can afford.
//!
//! Ticks run the TCP retransmission sweep, the ARP aging pass and the liveness
//! watchdog; pending frames are then drained from the device and dispatched.
//!
//! [`Stack`]: struct.Stack.html
//! [`Events`]: trait.Events.html
//! [`Stack::interrupt`]: struct.Stack.html#method.interrupt
//! [`Stack::tick`]: struct.Stack.html#method.tick
//! [`Stack::poll`]: struct.Stack.html#method.poll
use core::fmt;

use crate::nic::Device;
use crate::wire::{
    arp_packet, ethernet_frame, icmpv4_packet, ipv4_packet, udp_packet,
    ArpOperation, ArpRepr, EthernetAddress, EthernetProtocol, Icmpv4Message, IpProtocol,
    Ipv4Address, ARP_PACKET_LEN, ETHERNET_HEADER_LEN, ICMPV4_HEADER_LEN, IPV4_HEADER_LEN,
    TCP_HEADER_LEN, UDP_HEADER_LEN,
};

pub mod arp;
mod ports;
pub mod tcp;

#[cfg(test)]
mod tests;

use self::ports::PortTable;

/// The size of the frame buffers, and so the largest frame the engine handles.
pub const MTU: usize = 1080;

/// The advertised receive window, doubling as the advertised maximum segment size.
pub const TCP_WINDOW: u16 = (MTU - 100) as u16;

const TTL: u8 = 128;

/// Seconds of silence after which the controller is restarted.
const WATCHDOG_WINDOW: u8 = 10;

/// ARP replies go out padded to the classic minimum frame length.
const ARP_FRAME_LEN: usize = 60;

const PING_IDENT: u16 = 0x4242;
const PING_PAYLOAD_LEN: usize = 32;

/// The number of UDP port slots.
pub const MAX_UDP_PORTS: usize = 3;

/// The number of TCP listener slots.
pub const MAX_TCP_PORTS: usize = ports::MAX_PORTS;

// Fixed offsets into a frame buffer. All headers the engine emits are option-less,
// only inbound packets may carry IP options (and are parsed by their actual header
// length).
pub(crate) const IP_OFF: usize = ETHERNET_HEADER_LEN;
pub(crate) const TCP_OFF: usize = IP_OFF + IPV4_HEADER_LEN;
pub(crate) const TCP_DATA_OFF: usize = TCP_OFF + TCP_HEADER_LEN;
pub(crate) const UDP_OFF: usize = IP_OFF + IPV4_HEADER_LEN;
pub(crate) const UDP_DATA_OFF: usize = UDP_OFF + UDP_HEADER_LEN;
pub(crate) const ICMP_OFF: usize = IP_OFF + IPV4_HEADER_LEN;

/// The error type of engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// All slots of the addressed table are taken.
    Exhausted,
    /// The operation addressed a connection slot that holds no connection.
    InvalidHandle,
    /// The payload does not fit into the transmit buffer.
    TooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Exhausted => write!(f, "no free slot"),
            Error::InvalidHandle => write!(f, "no such connection"),
            Error::TooLong => write!(f, "payload too long"),
        }
    }
}

/// How the stack gets its addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Fixed addressing, polling starts immediately on [`Stack::bring_up`].
    ///
    /// [`Stack::bring_up`]: struct.Stack.html#method.bring_up
    Static {
        /// Our address.
        ip: Ipv4Address,
        /// The subnet mask.
        netmask: Ipv4Address,
        /// The default gateway.
        gateway: Ipv4Address,
    },
    /// Addresses come from a DHCP collaborator, which calls
    /// [`Stack::update_addresses`] and [`Stack::start_polling`] when it is done
    /// (or gives up and proceeds with its fallback addresses).
    ///
    /// [`Stack::update_addresses`]: struct.Stack.html#method.update_addresses
    /// [`Stack::start_polling`]: struct.Stack.html#method.start_polling
    Dhcp,
}

/// The initial engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The local station address.
    pub mac: EthernetAddress,
    /// The addressing mode.
    pub addr: AddressMode,
}

/// The address negotiation collaborator started by [`Stack::bring_up`].
///
/// The protocol itself lives outside this crate; the engine only owes it the
/// trigger and the two completion entry points on `Stack`.
///
/// [`Stack::bring_up`]: struct.Stack.html#method.bring_up
pub trait Dhcp {
    /// Begin address negotiation.
    fn start(&mut self);
}

/// A TCP notification delivered to the application.
#[derive(Debug, Clone, Copy)]
pub enum TcpEvent<'a> {
    /// The peer completed the handshake with its first bare acknowledgement.
    Connected,
    /// The peer pushed application data.
    Data(&'a [u8]),
    /// The peer acknowledged; more data may be queued now.
    Acked,
    /// The connection aged out and wants its current response transmitted again.
    Retransmit,
    /// The peer started tearing the connection down.
    Closed,
}

/// The application's view of one TCP connection during an event.
///
/// Everything sent through it goes out immediately, built from the connection's
/// current counters; the engine keeps no copy beyond the transmit buffer.
pub struct TcpSocket<'a> {
    pub(crate) core: &'a mut Core,
    pub(crate) dev: &'a mut dyn Device,
    pub(crate) index: usize,
}

impl TcpSocket<'_> {
    /// The connection slot, stable for the lifetime of the connection.
    pub fn slot(&self) -> usize {
        self.index
    }

    /// The peer's address.
    pub fn peer_addr(&self) -> Ipv4Address {
        self.core.tcp.get(self.index).map_or(Ipv4Address::UNSPECIFIED, |conn| conn.peer_ip)
    }

    /// The peer's port.
    pub fn peer_port(&self) -> u16 {
        self.core.tcp.get(self.index).map_or(0, |conn| conn.peer_port)
    }

    /// Our port.
    pub fn local_port(&self) -> u16 {
        self.core.tcp.get(self.index).map_or(0, |conn| conn.local_port)
    }

    /// Transmit a data segment carrying `data`.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.core.tcp_send(&mut *self.dev, self.index, data)
    }

    /// Begin tearing the connection down with FIN+ACK.
    pub fn close(&mut self) -> Result<(), Error> {
        self.core.tcp_close(&mut *self.dev, self.index)
    }
}

/// The application's view of one inbound UDP datagram.
pub struct UdpSocket<'a> {
    pub(crate) core: &'a mut Core,
    pub(crate) dev: &'a mut dyn Device,
    pub(crate) peer: Ipv4Address,
    pub(crate) peer_port: u16,
    pub(crate) local_port: u16,
}

impl UdpSocket<'_> {
    /// The sender's address.
    pub fn peer_addr(&self) -> Ipv4Address {
        self.peer
    }

    /// The sender's port.
    pub fn peer_port(&self) -> u16 {
        self.peer_port
    }

    /// The port the datagram arrived on.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Answer the sender with a datagram from the arrival port.
    pub fn reply(&mut self, data: &[u8]) -> Result<(), Error> {
        let (peer, peer_port, local_port) = (self.peer, self.peer_port, self.local_port);
        self.core.send_udp(&mut *self.dev, peer, peer_port, local_port, data)
    }
}

/// The application callbacks driven by [`Stack::poll`].
///
/// TCP events are only delivered for local ports opened with
/// [`Stack::listen`]; a client that wants events for an active open therefore
/// listens on its local port as well.
///
/// [`Stack::poll`]: struct.Stack.html#method.poll
/// [`Stack::listen`]: struct.Stack.html#method.listen
pub trait Events {
    /// Handle a TCP notification.
    fn tcp(&mut self, socket: TcpSocket<'_>, event: TcpEvent<'_>);

    /// Handle an inbound UDP datagram on a bound port.
    fn udp(&mut self, socket: UdpSocket<'_>, payload: &[u8]) {
        let _ = (socket, payload);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Ping {
    target: Option<Ipv4Address>,
    replied: bool,
    seq: u16,
}

/// Everything of the engine except the receive buffer.
///
/// Split out so a dispatched frame (sitting in the receive buffer) can be borrowed
/// by the application while replies are built here.
pub(crate) struct Core {
    mac: EthernetAddress,
    ip: Ipv4Address,
    netmask: Ipv4Address,
    gateway: Ipv4Address,
    broadcast: Ipv4Address,
    ip_ident: u16,
    pub(crate) arp: arp::Cache,
    pub(crate) tcp: tcp::Engine,
    pub(crate) tcp_ports: PortTable,
    pub(crate) udp_ports: PortTable,
    ping: Ping,
    pub(crate) tx: [u8; MTU],
    running: bool,
    frame_pending: bool,
    tick_pending: bool,
    alive: bool,
    watchdog: u8,
}

impl Core {
    /// Write the Ethernet and IP headers of an outbound frame, returning its length.
    ///
    /// The destination hardware address comes from the neighbor cache, falling back
    /// to broadcast for unresolved (and all broadcast) destinations.
    pub(crate) fn emit_ip_frame(
        &mut self,
        dst: Ipv4Address,
        protocol: IpProtocol,
        payload_len: usize,
    ) -> usize {
        let dst_mac = if dst == self.broadcast || dst.is_broadcast() {
            EthernetAddress::BROADCAST
        } else {
            self.arp.resolve(dst).unwrap_or(EthernetAddress::BROADCAST)
        };
        let total_len = IPV4_HEADER_LEN + payload_len;
        let frame_len = ETHERNET_HEADER_LEN + total_len;
        self.ip_ident = self.ip_ident.wrapping_add(1);
        {
            let frame = ethernet_frame::new_unchecked_mut(&mut self.tx[..frame_len]);
            frame.set_dst_addr(dst_mac);
            frame.set_src_addr(self.mac);
            frame.set_ethertype(EthernetProtocol::Ipv4);
        }
        {
            let packet = ipv4_packet::new_unchecked_mut(&mut self.tx[IP_OFF..IP_OFF + total_len]);
            packet.set_version_header_len();
            packet.set_dscp_ecn(0);
            packet.set_total_len(total_len as u16);
            packet.set_ident(self.ip_ident);
            packet.set_dont_frag();
            packet.set_hop_limit(TTL);
            packet.set_protocol(protocol);
            packet.set_src_addr(self.ip);
            packet.set_dst_addr(dst);
            packet.fill_checksum();
        }
        frame_len
    }

    /// Hand the first `len` octets of the transmit buffer to the device.
    pub(crate) fn send_frame(&mut self, dev: &mut dyn Device, len: usize) {
        dev.transmit(&self.tx[..len]);
        self.alive = true;
    }

    /// Dispatch one inbound frame.
    pub(crate) fn dispatch(
        &mut self,
        dev: &mut dyn Device,
        frame: &[u8],
        events: &mut dyn Events,
    ) {
        let frame = match ethernet_frame::new_checked(frame) {
            Ok(frame) => frame,
            Err(_) => return,
        };
        match frame.ethertype() {
            EthernetProtocol::Arp => {
                self.process_arp(dev, frame.payload_slice());
            }
            EthernetProtocol::Ipv4 => {
                self.process_ipv4(dev, events, frame.src_addr(), frame.payload_slice());
            }
            other => {
                net_trace!("eth: ignoring ethertype {}", other);
            }
        }
    }

    fn process_arp(&mut self, dev: &mut dyn Device, packet: &[u8]) {
        let packet = match arp_packet::new_checked(packet) {
            Ok(packet) => packet,
            Err(_) => return,
        };
        let repr = match ArpRepr::parse(packet) {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("arp: dropping packet: {}", err);
                return;
            }
        };
        // Requests and replies alike feed the cache.
        self.arp.learn(repr.source_hardware_addr, repr.source_protocol_addr);

        if repr.operation == ArpOperation::Request && repr.target_protocol_addr == self.ip {
            let reply = ArpRepr {
                operation: ArpOperation::Reply,
                source_hardware_addr: self.mac,
                source_protocol_addr: self.ip,
                target_hardware_addr: repr.source_hardware_addr,
                target_protocol_addr: repr.source_protocol_addr,
            };
            {
                let frame = ethernet_frame::new_unchecked_mut(&mut self.tx[..ARP_FRAME_LEN]);
                frame.set_dst_addr(reply.target_hardware_addr);
                frame.set_src_addr(reply.source_hardware_addr);
                frame.set_ethertype(EthernetProtocol::Arp);
            }
            reply.emit(arp_packet::new_unchecked_mut(
                &mut self.tx[IP_OFF..IP_OFF + ARP_PACKET_LEN]));
            for byte in self.tx[IP_OFF + ARP_PACKET_LEN..ARP_FRAME_LEN].iter_mut() {
                *byte = 0;
            }
            self.send_frame(dev, ARP_FRAME_LEN);
        }
    }

    fn process_ipv4(
        &mut self,
        dev: &mut dyn Device,
        events: &mut dyn Events,
        eth_src: EthernetAddress,
        packet: &[u8],
    ) {
        let packet = match ipv4_packet::new_checked(packet) {
            Ok(packet) => packet,
            Err(err) => {
                net_trace!("ip: dropping packet: {}", err);
                return;
            }
        };
        let src = packet.src_addr();
        let dst = packet.dst_addr();
        if dst == self.ip {
            // Any directed IP traffic doubles as a neighbor announcement.
            self.arp.learn(eth_src, src);
            match packet.protocol() {
                IpProtocol::Icmp => self.process_icmp(dev, src, packet.payload_slice()),
                IpProtocol::Tcp => self.process_tcp(dev, events, src, packet.payload_slice()),
                IpProtocol::Udp => self.process_udp(dev, events, src, packet.payload_slice()),
                other => {
                    net_trace!("ip: ignoring protocol {}", other);
                }
            }
        } else if dst == self.broadcast || dst.is_broadcast() {
            // Broadcast delivery exists for UDP only.
            if packet.protocol() == IpProtocol::Udp {
                self.process_udp(dev, events, src, packet.payload_slice());
            }
        }
    }

    fn process_icmp(&mut self, dev: &mut dyn Device, src: Ipv4Address, message: &[u8]) {
        let icmp = match icmpv4_packet::new_checked(message) {
            Ok(icmp) => icmp,
            Err(_) => return,
        };
        match icmp.msg_type() {
            Icmpv4Message::EchoRequest => {
                // The reply mirrors identifier, sequence number and payload; only the
                // type changes, and with it the checksum over the ICMP portion.
                let len = message.len();
                if ICMP_OFF + len > self.tx.len() {
                    return;
                }
                self.tx[ICMP_OFF..ICMP_OFF + len].copy_from_slice(message);
                {
                    let reply = icmpv4_packet::new_unchecked_mut(
                        &mut self.tx[ICMP_OFF..ICMP_OFF + len]);
                    reply.set_msg_type(Icmpv4Message::EchoReply);
                    reply.set_msg_code(0);
                    reply.fill_checksum();
                }
                let frame_len = self.emit_ip_frame(src, IpProtocol::Icmp, len);
                self.send_frame(dev, frame_len);
            }
            Icmpv4Message::EchoReply => {
                if self.ping.target == Some(src) && icmp.echo_ident() == PING_IDENT {
                    self.ping.replied = true;
                }
            }
            _ => {}
        }
    }

    fn process_udp(
        &mut self,
        dev: &mut dyn Device,
        events: &mut dyn Events,
        src: Ipv4Address,
        datagram: &[u8],
    ) {
        let packet = match udp_packet::new_checked(datagram) {
            Ok(packet) => packet,
            Err(err) => {
                net_trace!("udp: dropping datagram: {}", err);
                return;
            }
        };
        let local_port = packet.dst_port();
        if !self.udp_ports.contains(local_port) {
            net_trace!("udp: no listener on port {}", local_port);
            return;
        }
        let peer_port = packet.src_port();
        let socket = UdpSocket {
            core: &mut *self,
            dev: &mut *dev,
            peer: src,
            peer_port,
            local_port,
        };
        events.udp(socket, packet.payload_slice());
    }

    pub(crate) fn send_udp(
        &mut self,
        dev: &mut dyn Device,
        dst: Ipv4Address,
        dst_port: u16,
        src_port: u16,
        data: &[u8],
    ) -> Result<(), Error> {
        if UDP_DATA_OFF + data.len() > self.tx.len() {
            return Err(Error::TooLong);
        }
        let udp_len = UDP_HEADER_LEN + data.len();
        self.tx[UDP_DATA_OFF..UDP_DATA_OFF + data.len()].copy_from_slice(data);
        {
            let packet = udp_packet::new_unchecked_mut(&mut self.tx[UDP_OFF..UDP_OFF + udp_len]);
            packet.set_src_port(src_port);
            packet.set_dst_port(dst_port);
            packet.set_len(udp_len as u16);
            packet.fill_checksum(self.ip, dst);
        }
        let frame_len = self.emit_ip_frame(dst, IpProtocol::Udp, udp_len);
        self.send_frame(dev, frame_len);
        Ok(())
    }

    pub(crate) fn send_ping(&mut self, dev: &mut dyn Device, target: Ipv4Address) {
        self.ping = Ping {
            target: Some(target),
            replied: false,
            seq: self.ping.seq.wrapping_add(1),
        };
        let len = ICMPV4_HEADER_LEN + PING_PAYLOAD_LEN;
        let seq = self.ping.seq;
        {
            let echo = icmpv4_packet::new_unchecked_mut(&mut self.tx[ICMP_OFF..ICMP_OFF + len]);
            echo.set_msg_type(Icmpv4Message::EchoRequest);
            echo.set_msg_code(0);
            echo.set_echo_ident(PING_IDENT);
            echo.set_echo_seq_no(seq);
            for (at, byte) in echo.data_mut_slice().iter_mut().enumerate() {
                *byte = at as u8;
            }
            echo.fill_checksum();
        }
        let frame_len = self.emit_ip_frame(target, IpProtocol::Icmp, len);
        self.send_frame(dev, frame_len);
    }
}

/// The protocol engine.
///
/// See the [module documentation](index.html) for the driving pattern.
pub struct Stack {
    core: Core,
    rx: [u8; MTU],
    dhcp: bool,
}

impl Stack {
    /// Create an engine from its configuration.
    ///
    /// The engine does not poll until [`bring_up`](#method.bring_up) (or
    /// [`start_polling`](#method.start_polling)) is called.
    pub fn new(config: Config) -> Self {
        let (ip, netmask, gateway, dhcp) = match config.addr {
            AddressMode::Static { ip, netmask, gateway } => (ip, netmask, gateway, false),
            AddressMode::Dhcp => (
                Ipv4Address::UNSPECIFIED,
                Ipv4Address::UNSPECIFIED,
                Ipv4Address::UNSPECIFIED,
                true,
            ),
        };
        Stack {
            core: Core {
                mac: config.mac,
                ip,
                netmask,
                gateway,
                broadcast: ip.subnet_broadcast(netmask),
                ip_ident: 0,
                arp: arp::Cache::new(),
                tcp: tcp::Engine::new(),
                tcp_ports: PortTable::new(MAX_TCP_PORTS),
                udp_ports: PortTable::new(MAX_UDP_PORTS),
                ping: Ping::default(),
                tx: [0; MTU],
                running: false,
                frame_pending: false,
                tick_pending: false,
                alive: false,
                watchdog: WATCHDOG_WINDOW,
            },
            rx: [0; MTU],
            dhcp,
        }
    }

    /// Note that the controller signalled a pending frame.
    ///
    /// Safe to call from the receive interrupt's deferred context; the frames are
    /// picked up by the next [`poll`](#method.poll).
    pub fn interrupt(&mut self) {
        self.core.frame_pending = true;
        self.core.alive = true;
    }

    /// Advance the engine clock by one second.
    pub fn tick(&mut self) {
        self.core.tick_pending = true;
    }

    /// Run the engine: consume a pending tick, then drain and dispatch frames.
    ///
    /// Does nothing until polling has been started. `events` receives all TCP and
    /// UDP notifications caused by this call.
    pub fn poll<D: Device, E: Events>(&mut self, dev: &mut D, events: &mut E) {
        if !self.core.running {
            return;
        }
        let Stack { core, rx, .. } = self;
        let dev: &mut dyn Device = dev;
        let events: &mut dyn Events = events;

        if core.tick_pending {
            core.tick_pending = false;
            core.tcp_sweep(dev, events);
            core.arp.age();
            core.watchdog = core.watchdog.saturating_sub(1);
            if core.watchdog == 0 {
                core.watchdog = WATCHDOG_WINDOW;
                if core.alive {
                    core.alive = false;
                } else {
                    net_debug!("nic: interface quiet, restarting");
                    dev.restart();
                }
            }
        }

        if !core.frame_pending {
            return;
        }
        core.frame_pending = false;
        loop {
            let len = dev.receive(rx);
            if len == 0 {
                break;
            }
            core.dispatch(dev, &rx[..len], events);
        }
    }

    /// Start the configured address negotiation, or go straight to polling for
    /// static addressing.
    pub fn bring_up(&mut self, dhcp: &mut dyn Dhcp) {
        if self.dhcp {
            dhcp.start();
        } else {
            self.start_polling();
        }
    }

    /// Install new addresses and recompute the subnet broadcast.
    pub fn update_addresses(
        &mut self,
        ip: Ipv4Address,
        netmask: Ipv4Address,
        gateway: Ipv4Address,
    ) {
        self.core.ip = ip;
        self.core.netmask = netmask;
        self.core.gateway = gateway;
        self.core.broadcast = ip.subnet_broadcast(netmask);
    }

    /// Arm the poll loop.
    pub fn start_polling(&mut self) {
        self.core.running = true;
    }

    /// Query whether the poll loop is armed.
    pub fn is_polling(&self) -> bool {
        self.core.running
    }

    /// Open a TCP listener port.
    pub fn listen(&mut self, port: u16) -> Result<(), Error> {
        if self.core.tcp_ports.open(port) {
            Ok(())
        } else {
            Err(Error::Exhausted)
        }
    }

    /// Close a TCP listener port. Existing connections keep their records.
    pub fn close_listener(&mut self, port: u16) {
        self.core.tcp_ports.close(port);
    }

    /// Bind a UDP port for delivery.
    pub fn bind_udp(&mut self, port: u16) -> Result<(), Error> {
        if self.core.udp_ports.open(port) {
            Ok(())
        } else {
            Err(Error::Exhausted)
        }
    }

    /// Remove a UDP port binding.
    pub fn unbind_udp(&mut self, port: u16) {
        self.core.udp_ports.close(port);
    }

    /// Start a connection to `peer:peer_port`, returning its slot.
    ///
    /// Listen on `local_port` as well to receive the connection's events.
    pub fn open<D: Device>(
        &mut self,
        dev: &mut D,
        peer: Ipv4Address,
        peer_port: u16,
        local_port: u16,
    ) -> Result<usize, Error> {
        self.core.tcp_open(dev, peer, peer_port, local_port)
    }

    /// Transmit a data segment on the connection in `slot`.
    pub fn send_tcp<D: Device>(&mut self, dev: &mut D, slot: usize, data: &[u8])
        -> Result<(), Error>
    {
        self.core.tcp_send(dev, slot, data)
    }

    /// Begin tearing down the connection in `slot`.
    pub fn close_tcp<D: Device>(&mut self, dev: &mut D, slot: usize) -> Result<(), Error> {
        self.core.tcp_close(dev, slot)
    }

    /// Transmit a UDP datagram.
    pub fn send_udp<D: Device>(
        &mut self,
        dev: &mut D,
        dst: Ipv4Address,
        dst_port: u16,
        src_port: u16,
        data: &[u8],
    ) -> Result<(), Error> {
        self.core.send_udp(dev, dst, dst_port, src_port, data)
    }

    /// Cap the number of simultaneously held connections.
    ///
    /// Inbound opens past the cap are ignored; the cap never exceeds the table size.
    pub fn set_max_connections(&mut self, limit: usize) {
        self.core.tcp.max_conns = limit.min(tcp::MAX_CONNS);
    }

    /// Probe a host with an ICMP echo request.
    ///
    /// Only one probe is outstanding at a time; a new one forgets the previous
    /// result.
    pub fn ping<D: Device>(&mut self, dev: &mut D, target: Ipv4Address) {
        self.core.send_ping(dev, target)
    }

    /// Query whether the probed host has answered.
    pub fn ping_result(&self) -> bool {
        self.core.ping.replied
    }

    /// The number of held connections.
    pub fn active_connections(&self) -> usize {
        self.core.tcp.active()
    }

    /// The local station address.
    pub fn mac(&self) -> EthernetAddress {
        self.core.mac
    }

    /// Our IP address.
    pub fn ip(&self) -> Ipv4Address {
        self.core.ip
    }

    /// The subnet mask.
    pub fn netmask(&self) -> Ipv4Address {
        self.core.netmask
    }

    /// The default gateway.
    pub fn gateway(&self) -> Ipv4Address {
        self.core.gateway
    }

    /// The subnet broadcast address.
    pub fn broadcast(&self) -> Ipv4Address {
        self.core.broadcast
    }

    /// The neighbor cache.
    pub fn neighbors(&self) -> &arp::Cache {
        &self.core.arp
    }
}
