//! The reduced-state TCP engine.
//!
//! This is not a general TCP: there is no window management, no out-of-order
//! reassembly, no option parsing, and acknowledgements are driven entirely by the
//! other side's segments. What it does maintain is a fixed table of connection
//! records, a seven-way dispatch over the inbound flag combinations, and a blind
//! retransmission scheme where an aged connection re-asks the application for
//! whatever it would currently send. That is enough to serve request/response
//! protocols from a few kilobytes of state.
use crate::nic::Device;
use crate::wire::{tcp_segment, Ipv4Address, IpProtocol, TcpFlags, TcpSeqNumber, TCP_HEADER_LEN};

use super::{Core, Error, Events, TcpEvent, TcpSocket, TCP_DATA_OFF, TCP_OFF, TCP_WINDOW};

/// The number of regular connection slots.
pub const MAX_CONNS: usize = 5;

/// One spare slot past the regular ones, so a teardown can still be answered while
/// the table is full.
pub(crate) const TABLE_SIZE: usize = MAX_CONNS + 1;
pub(crate) const SPARE: usize = MAX_CONNS;

/// Seconds until an unacknowledged connection retransmits.
pub const RETRY_TIMEOUT: u8 = 3;

/// Seconds an active open may sit unanswered before the aging logic kicks in.
pub const OPEN_TIMEOUT: u8 = 30;

/// Retransmissions beyond this count abort the connection with a reset.
pub const MAX_RETRIES: u8 = 5;

// Fixed seed counters for active opens. Nothing here pretends to offer
// sequence unpredictability.
const INITIAL_SEQ: u32 = 1234;
const INITIAL_ACK: u32 = 2345;

/// The lifecycle phase of a connection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// An active open was sent, nothing came back yet.
    SynSent,
    /// A peer's SYN was answered, the final ACK is outstanding.
    SynRcvd,
    /// Both sides have seen each other.
    Established,
    /// We sent FIN and ignore everything but the teardown from here on.
    Closing,
}

/// One slot of the connection table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Connection {
    pub(crate) peer_ip: Ipv4Address,
    pub(crate) peer_port: u16,
    pub(crate) local_port: u16,
    /// The next sequence number we transmit; follows the peer's ack field.
    pub(crate) local_seq: TcpSeqNumber,
    /// The next sequence number we expect, transmitted as our ack field.
    pub(crate) remote_seq: TcpSeqNumber,
    /// Flags for the next outbound segment, cleared by transmission.
    pub(crate) pending: TcpFlags,
    pub(crate) state: State,
    /// Count of data-phase events, capped just below the u16 range.
    pub(crate) progress: u16,
    /// Retransmission countdown in seconds; `None` exempts the slot from aging.
    pub(crate) retransmit: Option<u8>,
    pub(crate) errors: u8,
    /// Set by the first bare ACK, never cleared.
    pub(crate) saw_ack: bool,
}

/// The fixed connection table.
pub(crate) struct Engine {
    table: [Option<Connection>; TABLE_SIZE],
    pub(crate) max_conns: usize,
}

impl Engine {
    pub(crate) fn new() -> Self {
        Engine {
            table: [None; TABLE_SIZE],
            max_conns: MAX_CONNS,
        }
    }

    pub(crate) fn find(&self, peer_ip: Ipv4Address, peer_port: u16, local_port: u16)
        -> Option<usize>
    {
        self.table.iter().position(|slot| match slot {
            Some(conn) => conn.peer_ip == peer_ip
                && conn.peer_port == peer_port
                && conn.local_port == local_port,
            None => false,
        })
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Connection> {
        self.table.get(index).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.table.get_mut(index).and_then(|slot| slot.as_mut())
    }

    /// Put a record into the first free regular slot.
    pub(crate) fn create(&mut self, conn: Connection) -> Option<usize> {
        let index = self.table[..MAX_CONNS].iter().position(|slot| slot.is_none())?;
        self.table[index] = Some(conn);
        Some(index)
    }

    /// Put a record into the spare slot, displacing whatever transient state was there.
    pub(crate) fn create_spare(&mut self, conn: Connection) -> usize {
        self.table[SPARE] = Some(conn);
        SPARE
    }

    pub(crate) fn destroy(&mut self, index: usize) {
        if let Some(slot) = self.table.get_mut(index) {
            *slot = None;
        }
    }

    /// The number of occupied regular slots.
    pub(crate) fn active(&self) -> usize {
        self.table[..MAX_CONNS].iter().filter(|slot| slot.is_some()).count()
    }
}

impl Connection {
    /// A record seeded from an inbound segment, as the dispatch cases create them.
    fn from_segment(
        peer_ip: Ipv4Address, peer_port: u16, local_port: u16,
        seq: TcpSeqNumber, ack: TcpSeqNumber, flags: TcpFlags, state: State,
    ) -> Self {
        Connection {
            peer_ip, peer_port, local_port,
            local_seq: ack,
            remote_seq: seq,
            pending: flags,
            state,
            progress: 0,
            retransmit: Some(RETRY_TIMEOUT),
            errors: 0,
            saw_ack: false,
        }
    }
}

impl Core {
    /// Dispatch one inbound segment addressed to us.
    pub(super) fn process_tcp(
        &mut self,
        dev: &mut dyn Device,
        events: &mut dyn Events,
        peer_ip: Ipv4Address,
        segment: &[u8],
    ) {
        let seg = match tcp_segment::new_checked(segment) {
            Ok(seg) => seg,
            Err(err) => {
                net_trace!("tcp: dropping segment from {}: {}", peer_ip, err);
                return;
            }
        };
        let peer_port = seg.src_port();
        let local_port = seg.dst_port();
        let seq = seg.seq_number();
        let ack = seg.ack_number();
        let flags = seg.flags();
        let payload = seg.payload_slice();

        let registered = self.tcp_ports.contains(local_port);
        let index = self.tcp.find(peer_ip, peer_port, local_port);
        if index.is_none() && !registered {
            return;
        }

        // An existing record is refreshed from every segment before the case
        // analysis: the peer's ack becomes our send position and its sequence,
        // advanced over the payload, our next expected number.
        if let Some(index) = index {
            if let Some(conn) = self.tcp.get_mut(index) {
                conn.local_seq = ack;
                conn.remote_seq = seq + payload.len();
                conn.pending = flags;
                if conn.retransmit.is_some() {
                    conn.retransmit = Some(RETRY_TIMEOUT);
                }
            }
        }

        if flags.contains(TcpFlags::SYN | TcpFlags::ACK) {
            // Answer to our active open.
            let index = match index {
                Some(index) => index,
                None => match self.tcp.create(Connection::from_segment(
                    peer_ip, peer_port, local_port, seq, ack, flags, State::SynSent)) {
                    Some(index) => index,
                    None => {
                        net_debug!("tcp: table full, ignoring SYN+ACK");
                        return;
                    }
                },
            };
            if let Some(conn) = self.tcp.get_mut(index) {
                conn.remote_seq += 1;
                conn.pending = TcpFlags::ACK;
                conn.state = State::Established;
                conn.progress = 1;
                conn.retransmit = None;
                conn.errors = 0;
            }
            self.build_tcp_segment(dev, index, 0);
        } else if flags.contains(TcpFlags::SYN) {
            // Passive open.
            let index = match index {
                Some(index) => index,
                None => {
                    if self.tcp.active() >= self.tcp.max_conns {
                        net_debug!("tcp: connection limit reached, ignoring SYN");
                        return;
                    }
                    match self.tcp.create(Connection::from_segment(
                        peer_ip, peer_port, local_port, seq, ack, flags, State::SynRcvd)) {
                        Some(index) => index,
                        None => {
                            net_debug!("tcp: table full, ignoring SYN");
                            return;
                        }
                    }
                }
            };
            if let Some(conn) = self.tcp.get_mut(index) {
                conn.state = State::SynRcvd;
                conn.pending = TcpFlags::SYN | TcpFlags::ACK;
            }
            self.build_tcp_segment(dev, index, 0);
        } else if flags.intersects(TcpFlags::FIN | TcpFlags::RST) {
            match index {
                None => {
                    // Loose teardown without a record: answer out of the spare slot so
                    // this works even when the table is full, then forget about it.
                    let index = self.tcp.create_spare(Connection::from_segment(
                        peer_ip, peer_port, local_port, seq + payload.len(), ack, flags,
                        State::Closing));
                    if let Some(conn) = self.tcp.get_mut(index) {
                        conn.remote_seq += 1;
                    }
                    if flags.contains(TcpFlags::FIN) {
                        if let Some(conn) = self.tcp.get_mut(index) {
                            conn.pending = TcpFlags::ACK;
                        }
                        self.build_tcp_segment(dev, index, 0);
                    }
                    self.tcp.destroy(index);
                }
                Some(index) => {
                    if let Some(conn) = self.tcp.get_mut(index) {
                        conn.remote_seq += 1;
                    }
                    if flags.contains(TcpFlags::FIN) {
                        if registered {
                            events.tcp(
                                TcpSocket { core: &mut *self, dev: &mut *dev, index },
                                TcpEvent::Closed);
                        }
                        if let Some(conn) = self.tcp.get_mut(index) {
                            conn.pending = TcpFlags::ACK;
                        }
                        self.build_tcp_segment(dev, index, 0);
                    }
                    self.tcp.destroy(index);
                }
            }
        } else if flags.contains(TcpFlags::PSH | TcpFlags::ACK) {
            let index = match index {
                Some(index) => index,
                None => return,
            };
            if let Some(conn) = self.tcp.get_mut(index) {
                if conn.progress < 0xfffe {
                    conn.progress += 1;
                }
                conn.pending = TcpFlags::ACK;
            }
            if registered {
                events.tcp(
                    TcpSocket { core: &mut *self, dev: &mut *dev, index },
                    TcpEvent::Data(payload));
                // A handler that answered has already acknowledged the data; cover
                // for a silent one.
                if self.tcp.get(index).map_or(false, |conn| !conn.pending.is_empty()) {
                    self.build_tcp_segment(dev, index, 0);
                }
            }
        } else if flags.contains(TcpFlags::ACK) {
            let index = match index {
                Some(index) => index,
                // A stray ACK without a record is noise.
                None => return,
            };
            let (saw_ack, closing) = match self.tcp.get(index) {
                Some(conn) => (conn.saw_ack, conn.state == State::Closing),
                None => return,
            };
            if !saw_ack {
                if let Some(conn) = self.tcp.get_mut(index) {
                    conn.saw_ack = true;
                    if conn.state == State::SynRcvd {
                        conn.state = State::Established;
                    }
                }
                if registered {
                    events.tcp(
                        TcpSocket { core: &mut *self, dev: &mut *dev, index },
                        TcpEvent::Connected);
                }
            } else if !closing {
                if let Some(conn) = self.tcp.get_mut(index) {
                    conn.pending = TcpFlags::ACK;
                    if conn.progress < 0xfffe {
                        conn.progress += 1;
                    }
                }
                if registered {
                    events.tcp(
                        TcpSocket { core: &mut *self, dev: &mut *dev, index },
                        TcpEvent::Acked);
                }
            }
        }
    }

    /// Transmit one segment for a connection from its current record.
    ///
    /// `payload_len` octets starting at the data offset of the transmit buffer go out
    /// with the segment. Transmission consumes the pending flags; a SYN additionally
    /// carries our maximum segment size as its only option and acknowledges one
    /// sequence number ahead.
    pub(super) fn build_tcp_segment(
        &mut self,
        dev: &mut dyn Device,
        index: usize,
        payload_len: usize,
    ) {
        let conn = match self.tcp.get(index) {
            Some(conn) => *conn,
            None => return,
        };
        let syn = conn.pending.contains(TcpFlags::SYN);
        let data_len = if syn { 4 } else { payload_len };
        let tcp_len = TCP_HEADER_LEN + data_len;

        let frame_len = self.emit_ip_frame(conn.peer_ip, IpProtocol::Tcp, tcp_len);
        {
            let seg = tcp_segment::new_unchecked_mut(
                &mut self.tx[TCP_OFF..TCP_OFF + tcp_len]);
            seg.set_src_port(conn.local_port);
            seg.set_dst_port(conn.peer_port);
            seg.set_seq_number(conn.local_seq);
            seg.set_ack_number(if syn { conn.remote_seq + 1 } else { conn.remote_seq });
            if syn {
                seg.set_header_len((TCP_HEADER_LEN + 4) as u8);
                seg.set_mss_option(TCP_WINDOW);
            } else {
                seg.set_header_len(TCP_HEADER_LEN as u8);
            }
            seg.set_flags(conn.pending);
            seg.set_window_len(TCP_WINDOW);
            seg.set_urgent_at(0);
            seg.fill_checksum(self.ip, conn.peer_ip);
        }
        self.send_frame(dev, frame_len);

        if let Some(conn) = self.tcp.get_mut(index) {
            conn.pending = TcpFlags::NONE;
        }
    }

    /// Run the once-per-second aging pass over the connection table.
    ///
    /// An expired countdown re-arms itself and counts an error. Past the retry limit
    /// the connection is aborted with RST+ACK and its slot freed; below it, the
    /// application is re-invoked through the regular delivery path so it can repeat
    /// whatever it would currently send.
    pub(super) fn tcp_sweep(&mut self, dev: &mut dyn Device, events: &mut dyn Events) {
        for index in 0..MAX_CONNS {
            let local_port = match self.tcp.get_mut(index) {
                None => continue,
                Some(conn) => match conn.retransmit {
                    None => continue,
                    Some(0) => {
                        conn.retransmit = Some(RETRY_TIMEOUT);
                        conn.errors += 1;
                        conn.local_port
                    }
                    Some(ticks) => {
                        conn.retransmit = Some(ticks - 1);
                        continue;
                    }
                },
            };

            let errors = self.tcp.get(index).map_or(0, |conn| conn.errors);
            if errors > MAX_RETRIES {
                net_debug!("tcp: slot {} unresponsive, resetting", index);
                if let Some(conn) = self.tcp.get_mut(index) {
                    conn.pending = TcpFlags::RST | TcpFlags::ACK;
                }
                self.build_tcp_segment(dev, index, 0);
                self.tcp.destroy(index);
            } else if self.tcp_ports.contains(local_port) {
                events.tcp(
                    TcpSocket { core: &mut *self, dev: &mut *dev, index },
                    TcpEvent::Retransmit);
            }
        }
    }

    /// Start a connection to a remote endpoint.
    pub(super) fn tcp_open(
        &mut self,
        dev: &mut dyn Device,
        peer_ip: Ipv4Address,
        peer_port: u16,
        local_port: u16,
    ) -> Result<usize, Error> {
        let conn = Connection {
            peer_ip, peer_port, local_port,
            local_seq: TcpSeqNumber(INITIAL_SEQ),
            remote_seq: TcpSeqNumber(INITIAL_ACK),
            pending: TcpFlags::SYN,
            state: State::SynSent,
            progress: 0,
            retransmit: Some(OPEN_TIMEOUT),
            errors: 0,
            saw_ack: false,
        };
        let index = self.tcp.create(conn).ok_or(Error::Exhausted)?;
        self.build_tcp_segment(dev, index, 0);
        Ok(index)
    }

    /// Send application data over a connection.
    pub(super) fn tcp_send(
        &mut self,
        dev: &mut dyn Device,
        index: usize,
        data: &[u8],
    ) -> Result<(), Error> {
        if TCP_DATA_OFF + data.len() > self.tx.len() {
            return Err(Error::TooLong);
        }
        match self.tcp.get_mut(index) {
            None => return Err(Error::InvalidHandle),
            Some(conn) => conn.pending |= TcpFlags::ACK,
        }
        self.tx[TCP_DATA_OFF..TCP_DATA_OFF + data.len()].copy_from_slice(data);
        self.build_tcp_segment(dev, index, data.len());
        Ok(())
    }

    /// Begin tearing a connection down.
    ///
    /// The record stays around in the closing state until the peer's side of the
    /// teardown (or the aging logic) destroys it.
    pub(super) fn tcp_close(&mut self, dev: &mut dyn Device, index: usize)
        -> Result<(), Error>
    {
        match self.tcp.get_mut(index) {
            None => return Err(Error::InvalidHandle),
            Some(conn) => {
                conn.state = State::Closing;
                conn.pending = TcpFlags::FIN | TcpFlags::ACK;
            }
        }
        self.build_tcp_segment(dev, index, 0);
        Ok(())
    }
}
