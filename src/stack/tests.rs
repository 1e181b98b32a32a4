use super::*;
use crate::nic::TestNic;
use crate::wire::{tcp_segment, TcpFlags, TcpSeqNumber};

const LOCAL_MAC: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
const REMOTE_MAC: EthernetAddress = EthernetAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);

const LOCAL_IP: Ipv4Address = Ipv4Address([10, 0, 0, 2]);
const REMOTE_IP: Ipv4Address = Ipv4Address([10, 0, 0, 1]);
const NETMASK: Ipv4Address = Ipv4Address([255, 255, 255, 0]);

const SERVER_PORT: u16 = 80;
const CLIENT_PORT: u16 = 4500;

/// Records every delivered event; optionally answers data with a canned response.
#[derive(Default)]
struct Recorder {
    connected: usize,
    data: Vec<u8>,
    acked: usize,
    retransmits: usize,
    closed: usize,
    datagrams: Vec<u8>,
    tcp_answer: Option<Vec<u8>>,
    udp_answer: Option<Vec<u8>>,
}

impl Events for Recorder {
    fn tcp(&mut self, mut socket: TcpSocket<'_>, event: TcpEvent<'_>) {
        match event {
            TcpEvent::Connected => self.connected += 1,
            TcpEvent::Data(payload) => {
                self.data.extend_from_slice(payload);
                if let Some(answer) = &self.tcp_answer {
                    socket.send(answer).unwrap();
                }
            }
            TcpEvent::Acked => self.acked += 1,
            TcpEvent::Retransmit => self.retransmits += 1,
            TcpEvent::Closed => self.closed += 1,
        }
    }

    fn udp(&mut self, mut socket: UdpSocket<'_>, payload: &[u8]) {
        self.datagrams.extend_from_slice(payload);
        if let Some(answer) = &self.udp_answer {
            socket.reply(answer).unwrap();
        }
    }
}

fn stack() -> Stack {
    let mut stack = Stack::new(Config {
        mac: LOCAL_MAC,
        addr: AddressMode::Static {
            ip: LOCAL_IP,
            netmask: NETMASK,
            gateway: REMOTE_IP,
        },
    });
    stack.start_polling();
    stack
}

fn deliver(stack: &mut Stack, nic: &mut TestNic, events: &mut Recorder, frame: &[u8]) {
    nic.inject(frame);
    stack.interrupt();
    stack.poll(nic, events);
}

fn second(stack: &mut Stack, nic: &mut TestNic, events: &mut Recorder) {
    stack.tick();
    stack.poll(nic, events);
}

fn ip_frame_to(dst: Ipv4Address, protocol: IpProtocol, payload: &[u8]) -> Vec<u8> {
    let total = IPV4_HEADER_LEN + payload.len();
    let mut frame = vec![0; ETHERNET_HEADER_LEN + total];
    {
        let eth = ethernet_frame::new_unchecked_mut(&mut frame);
        eth.set_dst_addr(LOCAL_MAC);
        eth.set_src_addr(REMOTE_MAC);
        eth.set_ethertype(EthernetProtocol::Ipv4);
    }
    frame[IP_OFF + IPV4_HEADER_LEN..].copy_from_slice(payload);
    {
        let ip = ipv4_packet::new_unchecked_mut(&mut frame[IP_OFF..]);
        ip.set_version_header_len();
        ip.set_total_len(total as u16);
        ip.set_hop_limit(64);
        ip.set_protocol(protocol);
        ip.set_src_addr(REMOTE_IP);
        ip.set_dst_addr(dst);
        ip.fill_checksum();
    }
    frame
}

fn tcp_frame(src_port: u16, flags: TcpFlags, seq: u32, ack: u32, payload: &[u8]) -> Vec<u8> {
    let mut segment = vec![0; TCP_HEADER_LEN + payload.len()];
    segment[TCP_HEADER_LEN..].copy_from_slice(payload);
    {
        let seg = tcp_segment::new_unchecked_mut(&mut segment);
        seg.set_src_port(src_port);
        seg.set_dst_port(SERVER_PORT);
        seg.set_seq_number(TcpSeqNumber(seq));
        seg.set_ack_number(TcpSeqNumber(ack));
        seg.set_header_len(TCP_HEADER_LEN as u8);
        seg.set_flags(flags);
        seg.set_window_len(8192);
        seg.set_urgent_at(0);
        seg.fill_checksum(REMOTE_IP, LOCAL_IP);
    }
    ip_frame_to(LOCAL_IP, IpProtocol::Tcp, &segment)
}

fn udp_frame(dst: Ipv4Address, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut datagram = vec![0; UDP_HEADER_LEN + payload.len()];
    datagram[UDP_HEADER_LEN..].copy_from_slice(payload);
    {
        let udp = udp_packet::new_unchecked_mut(&mut datagram);
        udp.set_src_port(CLIENT_PORT);
        udp.set_dst_port(dst_port);
        udp.set_len((UDP_HEADER_LEN + payload.len()) as u16);
        udp.fill_checksum(REMOTE_IP, dst);
    }
    ip_frame_to(dst, IpProtocol::Udp, &datagram)
}

fn sent_tcp(frame: &[u8]) -> &tcp_segment {
    let ip = ipv4_packet::new_checked(&frame[IP_OFF..]).unwrap();
    assert_eq!(ip.protocol(), IpProtocol::Tcp);
    tcp_segment::new_checked(&frame[TCP_OFF..]).unwrap()
}

#[test]
fn syn_is_answered_with_syn_ack() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));

    assert_eq!(nic.sent_count(), 1);
    assert_eq!(stack.active_connections(), 1);

    let frame = nic.sent(0);
    let eth = ethernet_frame::new_checked(frame).unwrap();
    // learned from the segment itself, no broadcast fallback
    assert_eq!(eth.dst_addr(), REMOTE_MAC);
    assert_eq!(eth.src_addr(), LOCAL_MAC);

    let ip = ipv4_packet::new_checked(&frame[IP_OFF..]).unwrap();
    assert_eq!(ip.src_addr(), LOCAL_IP);
    assert_eq!(ip.dst_addr(), REMOTE_IP);
    assert_eq!(ip.hop_limit(), 128);
    assert!(ip.dont_frag());
    assert!(ip.verify_checksum());

    let seg = sent_tcp(frame);
    assert_eq!(seg.flags(), TcpFlags::SYN | TcpFlags::ACK);
    assert_eq!(seg.src_port(), SERVER_PORT);
    assert_eq!(seg.dst_port(), CLIENT_PORT);
    assert_eq!(seg.ack_number(), TcpSeqNumber(1001));
    assert_eq!(seg.window_len(), TCP_WINDOW);
    // the SYN carries our segment size as its single option
    assert_eq!(seg.header_len() as usize, TCP_HEADER_LEN + 4);
    assert_eq!(seg.options_slice(), &[0x02, 0x04, 0x03, 0xd4]);
    assert!(seg.verify_checksum(LOCAL_IP, REMOTE_IP));
}

#[test]
fn first_bare_ack_completes_the_handshake() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    nic.clear_sent();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::ACK, 1001, 1, &[]));
    assert_eq!(events.connected, 1);
    assert_eq!(nic.sent_count(), 0);

    // later bare acknowledgements surface as progress, still without a reply
    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::ACK, 1001, 1, &[]));
    assert_eq!(events.connected, 1);
    assert_eq!(events.acked, 1);
    assert_eq!(nic.sent_count(), 0);
}

#[test]
fn pushed_data_is_delivered_and_acknowledged() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::ACK, 1001, 1, &[]));
    nic.clear_sent();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::PSH | TcpFlags::ACK, 1001, 1, b"GET /"));
    assert_eq!(events.data, b"GET /");

    // the handler stayed silent, the engine acknowledged on its behalf
    assert_eq!(nic.sent_count(), 1);
    let seg = sent_tcp(nic.sent(0));
    assert_eq!(seg.flags(), TcpFlags::ACK);
    assert_eq!(seg.seq_number(), TcpSeqNumber(1));
    assert_eq!(seg.ack_number(), TcpSeqNumber(1006));
    assert!(seg.payload_slice().is_empty());
}

#[test]
fn answering_the_data_replaces_the_bare_ack() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();
    events.tcp_answer = Some(b"pong".to_vec());

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::ACK, 1001, 1, &[]));
    nic.clear_sent();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::PSH | TcpFlags::ACK, 1001, 1, b"ping"));
    assert_eq!(events.data, b"ping");

    assert_eq!(nic.sent_count(), 1);
    let seg = sent_tcp(nic.sent(0));
    assert!(seg.flags().contains(TcpFlags::ACK));
    assert_eq!(seg.ack_number(), TcpSeqNumber(1005));
    assert_eq!(seg.payload_slice(), b"pong");
    assert!(seg.verify_checksum(LOCAL_IP, REMOTE_IP));
}

#[test]
fn fin_notifies_acknowledges_and_frees_the_slot() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::ACK, 1001, 1, &[]));
    nic.clear_sent();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::FIN | TcpFlags::ACK, 1001, 1, &[]));
    assert_eq!(events.closed, 1);
    assert_eq!(stack.active_connections(), 0);

    assert_eq!(nic.sent_count(), 1);
    let seg = sent_tcp(nic.sent(0));
    assert_eq!(seg.flags(), TcpFlags::ACK);
    assert_eq!(seg.ack_number(), TcpSeqNumber(1002));
}

#[test]
fn rst_frees_the_slot_silently() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    nic.clear_sent();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::RST, 1001, 1, &[]));
    assert_eq!(events.closed, 0);
    assert_eq!(nic.sent_count(), 0);
    assert_eq!(stack.active_connections(), 0);
}

#[test]
fn loose_fin_is_acknowledged_from_the_spare_slot() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    // fill every regular slot
    for peer in 0..5 {
        deliver(&mut stack, &mut nic, &mut events,
            &tcp_frame(5000 + peer, TcpFlags::SYN, 1000, 0, &[]));
    }
    assert_eq!(stack.active_connections(), 5);
    nic.clear_sent();

    // a teardown for a connection we no longer know still gets its answer
    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::FIN | TcpFlags::ACK, 7000, 1, &[]));
    assert_eq!(nic.sent_count(), 1);
    let seg = sent_tcp(nic.sent(0));
    assert_eq!(seg.flags(), TcpFlags::ACK);
    assert_eq!(seg.ack_number(), TcpSeqNumber(7001));
    assert_eq!(stack.active_connections(), 5);
}

#[test]
fn connection_cap_ignores_further_opens() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();
    stack.set_max_connections(2);

    for peer in 0..3 {
        deliver(&mut stack, &mut nic, &mut events,
            &tcp_frame(5000 + peer, TcpFlags::SYN, 1000, 0, &[]));
    }
    assert_eq!(stack.active_connections(), 2);
    assert_eq!(nic.sent_count(), 2);
}

#[test]
fn unanswered_connection_is_reset_after_retries() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    nic.clear_sent();

    // the countdown fires every RETRY_TIMEOUT + 1 seconds; the sixth expiry
    // exceeds the retry limit
    let mut reset_after = 0;
    for seconds in 1..=40 {
        second(&mut stack, &mut nic, &mut events);
        if stack.active_connections() == 0 {
            reset_after = seconds;
            break;
        }
    }
    assert_eq!(reset_after, 6 * (tcp::RETRY_TIMEOUT as usize + 1));
    assert_eq!(events.retransmits, 5);

    let seg = sent_tcp(nic.last_sent().unwrap());
    assert_eq!(seg.flags(), TcpFlags::RST | TcpFlags::ACK);
}

#[test]
fn active_open_emits_a_syn_and_completes() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(CLIENT_PORT).unwrap();

    let slot = stack.open(&mut nic, REMOTE_IP, SERVER_PORT, CLIENT_PORT).unwrap();
    assert_eq!(stack.active_connections(), 1);

    let seg = sent_tcp(nic.sent(0));
    assert_eq!(seg.flags(), TcpFlags::SYN);
    assert_eq!(seg.src_port(), CLIENT_PORT);
    assert_eq!(seg.dst_port(), SERVER_PORT);
    assert_eq!(seg.seq_number(), TcpSeqNumber(1234));
    assert_eq!(seg.header_len() as usize, TCP_HEADER_LEN + 4);
    nic.clear_sent();

    // the peer's SYN+ACK is acknowledged immediately
    let mut segment = vec![0; TCP_HEADER_LEN];
    {
        let seg = tcp_segment::new_unchecked_mut(&mut segment);
        seg.set_src_port(SERVER_PORT);
        seg.set_dst_port(CLIENT_PORT);
        seg.set_seq_number(TcpSeqNumber(9000));
        seg.set_ack_number(TcpSeqNumber(1235));
        seg.set_header_len(TCP_HEADER_LEN as u8);
        seg.set_flags(TcpFlags::SYN | TcpFlags::ACK);
        seg.set_window_len(8192);
        seg.set_urgent_at(0);
        seg.fill_checksum(REMOTE_IP, LOCAL_IP);
    }
    deliver(&mut stack, &mut nic, &mut events,
        &ip_frame_to(LOCAL_IP, IpProtocol::Tcp, &segment));

    assert_eq!(nic.sent_count(), 1);
    let seg = sent_tcp(nic.sent(0));
    assert_eq!(seg.flags(), TcpFlags::ACK);
    assert_eq!(seg.seq_number(), TcpSeqNumber(1235));
    assert_eq!(seg.ack_number(), TcpSeqNumber(9001));

    stack.send_tcp(&mut nic, slot, b"hello").unwrap();
    let seg = sent_tcp(nic.last_sent().unwrap());
    assert_eq!(seg.payload_slice(), b"hello");
}

#[test]
fn syn_for_an_unregistered_port_is_ignored() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    deliver(&mut stack, &mut nic, &mut events,
        &tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    assert_eq!(nic.sent_count(), 0);
    assert_eq!(stack.active_connections(), 0);
}

#[test]
fn bound_udp_port_receives_and_replies() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.bind_udp(7).unwrap();
    events.udp_answer = Some(b"echo".to_vec());

    deliver(&mut stack, &mut nic, &mut events, &udp_frame(LOCAL_IP, 7, b"hello"));
    assert_eq!(events.datagrams, b"hello");

    assert_eq!(nic.sent_count(), 1);
    let frame = nic.sent(0);
    let ip = ipv4_packet::new_checked(&frame[IP_OFF..]).unwrap();
    assert_eq!(ip.protocol(), IpProtocol::Udp);
    assert_eq!(ip.dst_addr(), REMOTE_IP);
    let udp = udp_packet::new_checked(&frame[UDP_OFF..]).unwrap();
    assert_eq!(udp.src_port(), 7);
    assert_eq!(udp.dst_port(), CLIENT_PORT);
    assert_eq!(udp.payload_slice(), b"echo");
}

#[test]
fn unbound_udp_port_is_dropped() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    deliver(&mut stack, &mut nic, &mut events, &udp_frame(LOCAL_IP, 7, b"hello"));
    assert!(events.datagrams.is_empty());
    assert_eq!(nic.sent_count(), 0);
}

#[test]
fn broadcasts_reach_udp_but_not_tcp() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.bind_udp(67).unwrap();
    stack.listen(SERVER_PORT).unwrap();

    let subnet = Ipv4Address([10, 0, 0, 255]);
    deliver(&mut stack, &mut nic, &mut events, &udp_frame(subnet, 67, b"offer"));
    deliver(&mut stack, &mut nic, &mut events,
        &udp_frame(Ipv4Address::BROADCAST, 67, b"discover"));
    assert_eq!(events.datagrams, b"offerdiscover");

    // TCP has no broadcast delivery
    let mut syn = tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]);
    {
        let ip = ipv4_packet::new_unchecked_mut(&mut syn[IP_OFF..]);
        ip.set_dst_addr(subnet);
        ip.fill_checksum();
    }
    deliver(&mut stack, &mut nic, &mut events, &syn);
    assert_eq!(stack.active_connections(), 0);
    assert_eq!(nic.sent_count(), 0);
}

#[test]
fn traffic_for_other_hosts_is_ignored() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    let mut syn = tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]);
    {
        let ip = ipv4_packet::new_unchecked_mut(&mut syn[IP_OFF..]);
        ip.set_dst_addr(Ipv4Address([10, 0, 0, 77]));
        ip.fill_checksum();
    }
    deliver(&mut stack, &mut nic, &mut events, &syn);
    assert_eq!(nic.sent_count(), 0);
    assert_eq!(stack.active_connections(), 0);
}

#[test]
fn echo_requests_are_mirrored() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    let mut message = vec![0; ICMPV4_HEADER_LEN + 8];
    {
        let icmp = icmpv4_packet::new_unchecked_mut(&mut message);
        icmp.set_msg_type(Icmpv4Message::EchoRequest);
        icmp.set_msg_code(0);
        icmp.set_echo_ident(0x77);
        icmp.set_echo_seq_no(3);
        icmp.data_mut_slice().copy_from_slice(b"abcdefgh");
        icmp.fill_checksum();
    }
    deliver(&mut stack, &mut nic, &mut events,
        &ip_frame_to(LOCAL_IP, IpProtocol::Icmp, &message));

    assert_eq!(nic.sent_count(), 1);
    let frame = nic.sent(0);
    let ip = ipv4_packet::new_checked(&frame[IP_OFF..]).unwrap();
    assert_eq!(ip.protocol(), IpProtocol::Icmp);
    assert_eq!(ip.dst_addr(), REMOTE_IP);
    let icmp = icmpv4_packet::new_checked(ip.payload_slice()).unwrap();
    assert_eq!(icmp.msg_type(), Icmpv4Message::EchoReply);
    assert_eq!(icmp.echo_ident(), 0x77);
    assert_eq!(icmp.echo_seq_no(), 3);
    assert_eq!(icmp.data_slice(), b"abcdefgh");
    assert!(icmp.verify_checksum());
}

#[test]
fn ping_round_trip() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    stack.ping(&mut nic, REMOTE_IP);
    assert!(!stack.ping_result());

    assert_eq!(nic.sent_count(), 1);
    let frame = nic.sent(0);
    let ip = ipv4_packet::new_checked(&frame[IP_OFF..]).unwrap();
    assert_eq!(ip.protocol(), IpProtocol::Icmp);
    let request = icmpv4_packet::new_checked(ip.payload_slice()).unwrap();
    assert_eq!(request.msg_type(), Icmpv4Message::EchoRequest);
    assert_eq!(request.echo_ident(), PING_IDENT);
    assert_eq!(request.data_slice().len(), PING_PAYLOAD_LEN);

    // mirror the probe back
    let mut message = ip.payload_slice().to_vec();
    {
        let icmp = icmpv4_packet::new_unchecked_mut(&mut message);
        icmp.set_msg_type(Icmpv4Message::EchoReply);
        icmp.fill_checksum();
    }
    deliver(&mut stack, &mut nic, &mut events,
        &ip_frame_to(LOCAL_IP, IpProtocol::Icmp, &message));
    assert!(stack.ping_result());
}

#[test]
fn replies_from_the_wrong_host_do_not_count() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    stack.ping(&mut nic, Ipv4Address([10, 0, 0, 9]));
    let ip = ipv4_packet::new_checked(&nic.sent(0)[IP_OFF..]).unwrap();
    let mut message = ip.payload_slice().to_vec();
    {
        let icmp = icmpv4_packet::new_unchecked_mut(&mut message);
        icmp.set_msg_type(Icmpv4Message::EchoReply);
        icmp.fill_checksum();
    }
    // answered by REMOTE_IP instead of the probed host
    deliver(&mut stack, &mut nic, &mut events,
        &ip_frame_to(LOCAL_IP, IpProtocol::Icmp, &message));
    assert!(!stack.ping_result());
}

#[test]
fn arp_requests_for_our_address_are_answered() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    let request = ArpRepr {
        operation: ArpOperation::Request,
        source_hardware_addr: REMOTE_MAC,
        source_protocol_addr: REMOTE_IP,
        target_hardware_addr: EthernetAddress([0; 6]),
        target_protocol_addr: LOCAL_IP,
    };
    let mut frame = vec![0; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
    {
        let eth = ethernet_frame::new_unchecked_mut(&mut frame);
        eth.set_dst_addr(EthernetAddress::BROADCAST);
        eth.set_src_addr(REMOTE_MAC);
        eth.set_ethertype(EthernetProtocol::Arp);
    }
    request.emit(arp_packet::new_unchecked_mut(&mut frame[IP_OFF..]));
    deliver(&mut stack, &mut nic, &mut events, &frame);

    // the requester was learned
    assert_eq!(stack.neighbors().resolve(REMOTE_IP), Some(REMOTE_MAC));

    assert_eq!(nic.sent_count(), 1);
    let frame = nic.sent(0);
    assert_eq!(frame.len(), 60);
    let eth = ethernet_frame::new_checked(frame).unwrap();
    assert_eq!(eth.dst_addr(), REMOTE_MAC);
    assert_eq!(eth.src_addr(), LOCAL_MAC);
    assert_eq!(eth.ethertype(), EthernetProtocol::Arp);
    let reply = ArpRepr::parse(
        arp_packet::new_checked(&frame[IP_OFF..IP_OFF + ARP_PACKET_LEN]).unwrap()).unwrap();
    assert_eq!(reply.operation, ArpOperation::Reply);
    assert_eq!(reply.source_hardware_addr, LOCAL_MAC);
    assert_eq!(reply.source_protocol_addr, LOCAL_IP);
    assert_eq!(reply.target_hardware_addr, REMOTE_MAC);
    assert_eq!(reply.target_protocol_addr, REMOTE_IP);
}

#[test]
fn arp_requests_for_other_hosts_only_feed_the_cache() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    let request = ArpRepr {
        operation: ArpOperation::Request,
        source_hardware_addr: REMOTE_MAC,
        source_protocol_addr: REMOTE_IP,
        target_hardware_addr: EthernetAddress([0; 6]),
        target_protocol_addr: Ipv4Address([10, 0, 0, 3]),
    };
    let mut frame = vec![0; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
    {
        let eth = ethernet_frame::new_unchecked_mut(&mut frame);
        eth.set_dst_addr(EthernetAddress::BROADCAST);
        eth.set_src_addr(REMOTE_MAC);
        eth.set_ethertype(EthernetProtocol::Arp);
    }
    request.emit(arp_packet::new_unchecked_mut(&mut frame[IP_OFF..]));
    deliver(&mut stack, &mut nic, &mut events, &frame);

    assert_eq!(nic.sent_count(), 0);
    assert_eq!(stack.neighbors().resolve(REMOTE_IP), Some(REMOTE_MAC));
}

#[test]
fn quiet_interface_is_restarted() {
    let (mut stack, mut nic, mut events) = (stack(), TestNic::new(), Recorder::default());

    for _ in 0..WATCHDOG_WINDOW - 1 {
        second(&mut stack, &mut nic, &mut events);
    }
    assert_eq!(nic.restarts(), 0);
    second(&mut stack, &mut nic, &mut events);
    assert_eq!(nic.restarts(), 1);

    // any activity within the next window staves the restart off
    stack.interrupt();
    stack.poll(&mut nic, &mut events);
    for _ in 0..WATCHDOG_WINDOW {
        second(&mut stack, &mut nic, &mut events);
    }
    assert_eq!(nic.restarts(), 1);

    for _ in 0..WATCHDOG_WINDOW {
        second(&mut stack, &mut nic, &mut events);
    }
    assert_eq!(nic.restarts(), 2);
}

#[test]
fn nothing_happens_before_polling_starts() {
    let mut stack = Stack::new(Config {
        mac: LOCAL_MAC,
        addr: AddressMode::Static {
            ip: LOCAL_IP,
            netmask: NETMASK,
            gateway: REMOTE_IP,
        },
    });
    assert!(!stack.is_polling());
    let (mut nic, mut events) = (TestNic::new(), Recorder::default());
    stack.listen(SERVER_PORT).unwrap();

    nic.inject(&tcp_frame(CLIENT_PORT, TcpFlags::SYN, 1000, 0, &[]));
    stack.interrupt();
    stack.poll(&mut nic, &mut events);
    assert_eq!(nic.sent_count(), 0);

    stack.start_polling();
    stack.poll(&mut nic, &mut events);
    assert_eq!(nic.sent_count(), 1);
}

#[test]
fn bring_up_routes_by_address_mode() {
    struct Negotiator {
        started: bool,
    }

    impl Dhcp for Negotiator {
        fn start(&mut self) {
            self.started = true;
        }
    }

    let mut negotiator = Negotiator { started: false };

    let mut fixed = Stack::new(Config {
        mac: LOCAL_MAC,
        addr: AddressMode::Static {
            ip: LOCAL_IP,
            netmask: NETMASK,
            gateway: REMOTE_IP,
        },
    });
    fixed.bring_up(&mut negotiator);
    assert!(fixed.is_polling());
    assert!(!negotiator.started);
    assert_eq!(fixed.broadcast(), Ipv4Address([10, 0, 0, 255]));

    let mut negotiated = Stack::new(Config {
        mac: LOCAL_MAC,
        addr: AddressMode::Dhcp,
    });
    negotiated.bring_up(&mut negotiator);
    assert!(negotiator.started);
    assert!(!negotiated.is_polling());

    // the negotiation collaborator reports back and releases the engine
    negotiated.update_addresses(LOCAL_IP, NETMASK, REMOTE_IP);
    negotiated.start_polling();
    assert!(negotiated.is_polling());
    assert_eq!(negotiated.ip(), LOCAL_IP);
    assert_eq!(negotiated.broadcast(), Ipv4Address([10, 0, 0, 255]));
}

#[test]
fn unresolved_neighbors_fall_back_to_broadcast() {
    let (mut stack, mut nic, _events) = (stack(), TestNic::new(), Recorder::default());

    stack.send_udp(&mut nic, Ipv4Address([10, 0, 0, 50]), 9, 9, b"hi").unwrap();
    let eth = ethernet_frame::new_checked(nic.sent(0)).unwrap();
    assert_eq!(eth.dst_addr(), EthernetAddress::BROADCAST);
}
