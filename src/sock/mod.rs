//! Transport-independent sockets.
//!
//! Firmware that grew up on a vendor TCP api usually keeps that stack around for
//! one transport (the radio) while the wired interface is served by this crate's
//! engine. This module papers over the difference: the application implements
//! [`SocketHandler`] once, talks to peers through [`Conn`], and a tag bit in the
//! [`Handle`] decides which backend a connection lives on. The vendor side stays
//! behind the [`NativeConn`] and [`NativeStack`] traits so the crate itself never
//! links against it.
//!
//! [`SocketHandler`]: trait.SocketHandler.html
//! [`Conn`]: enum.Conn.html
//! [`Handle`]: struct.Handle.html
//! [`NativeConn`]: trait.NativeConn.html
//! [`NativeStack`]: trait.NativeStack.html
use core::fmt;

use crate::stack::{Error, Events, Stack, TcpEvent, TcpSocket};
use crate::wire::Ipv4Address;

const WIRED_TAG: u8 = 0x40;
const SLOT_MASK: u8 = 0x3f;

/// A compact connection identifier, stable for the connection's lifetime.
///
/// The low six bits carry the backend's slot or id, bit 6 marks a connection
/// held by the wired engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(u8);

impl Handle {
    /// The handle of a connection in the wired engine's slot `slot`.
    pub fn wired(slot: usize) -> Handle {
        debug_assert!(slot <= SLOT_MASK as usize);
        Handle(WIRED_TAG | (slot as u8 & SLOT_MASK))
    }

    /// The handle of a native connection with backend id `id`.
    pub fn native(id: u8) -> Handle {
        debug_assert!(id <= SLOT_MASK);
        Handle(id & SLOT_MASK)
    }

    /// Query whether the wired engine holds this connection.
    pub fn is_wired(self) -> bool {
        self.0 & WIRED_TAG != 0
    }

    /// The backend's slot or id.
    pub fn slot(self) -> usize {
        (self.0 & SLOT_MASK) as usize
    }

    /// The tagged byte, as stored by applications.
    pub fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_wired() {
            write!(f, "wired:{}", self.slot())
        } else {
            write!(f, "native:{}", self.slot())
        }
    }
}

/// One connection held by the vendor stack.
///
/// Locally initiated teardown runs through [`Conn::disconnect`], which invokes
/// the application's disconnect callback itself; an implementation must not
/// fire its own callback again for those.
///
/// [`Conn::disconnect`]: enum.Conn.html#method.disconnect
pub trait NativeConn {
    /// The connection's handle; [`Handle::is_wired`] must be false.
    ///
    /// [`Handle::is_wired`]: struct.Handle.html#method.is_wired
    fn handle(&self) -> Handle;

    /// The peer's address.
    fn peer_addr(&self) -> Ipv4Address;

    /// The peer's port.
    fn peer_port(&self) -> u16;

    /// Queue `data` for transmission.
    fn send(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Tear the connection down.
    fn disconnect(&mut self) -> Result<(), Error>;
}

/// The connection-independent operations of the vendor stack.
pub trait NativeStack {
    /// Start accepting connections on a local port.
    fn accept(&mut self, port: u16) -> Result<(), Error>;

    /// Cap the number of simultaneously accepted connections.
    fn set_max_connections(&mut self, limit: usize);
}

/// A connection on either backend.
///
/// Callbacks receive the variant their transport produced; application code
/// treats both alike.
pub enum Conn<'a> {
    /// A vendor stack connection.
    Native(&'a mut dyn NativeConn),
    /// A connection in the wired engine.
    Wired(TcpSocket<'a>),
}

impl Conn<'_> {
    /// The connection's tagged handle.
    pub fn handle(&self) -> Handle {
        match self {
            Conn::Native(conn) => conn.handle(),
            Conn::Wired(socket) => Handle::wired(socket.slot()),
        }
    }

    /// The peer's address.
    pub fn peer_addr(&self) -> Ipv4Address {
        match self {
            Conn::Native(conn) => conn.peer_addr(),
            Conn::Wired(socket) => socket.peer_addr(),
        }
    }

    /// The peer's port.
    pub fn peer_port(&self) -> u16 {
        match self {
            Conn::Native(conn) => conn.peer_port(),
            Conn::Wired(socket) => socket.peer_port(),
        }
    }

    /// Transmit `data` to the peer.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        match self {
            Conn::Native(conn) => conn.send(data),
            Conn::Wired(socket) => socket.send(data),
        }
    }

    /// Tear the connection down.
    ///
    /// The handler's [`on_disconnect`] runs synchronously, before the teardown
    /// reaches the wire, on both backends.
    ///
    /// [`on_disconnect`]: trait.SocketHandler.html#method.on_disconnect
    pub fn disconnect(&mut self, handler: &mut dyn SocketHandler) -> Result<(), Error> {
        handler.on_disconnect(self.handle());
        match self {
            Conn::Native(conn) => conn.disconnect(),
            Conn::Wired(socket) => socket.close(),
        }
    }
}

/// The callback contract an application implements once for both transports.
///
/// All methods default to doing nothing.
pub trait SocketHandler {
    /// A peer completed its connection.
    fn on_connect(&mut self, conn: Conn<'_>) {
        let _ = conn;
    }

    /// A peer pushed application data.
    fn on_receive(&mut self, conn: Conn<'_>, data: &[u8]) {
        let _ = (conn, data);
    }

    /// Previously sent data was acknowledged, or wants to be sent again; either
    /// way the connection is ready for the next write.
    fn on_sent(&mut self, conn: Conn<'_>) {
        let _ = conn;
    }

    /// The connection ended, orderly.
    fn on_disconnect(&mut self, handle: Handle) {
        let _ = handle;
    }

    /// The connection ended abnormally. Only the native backend reports this;
    /// the wired engine frees aborted connections without a callback.
    fn on_reconnect(&mut self, handle: Handle, reason: i8) {
        let _ = (handle, reason);
    }
}

/// Adapts a [`SocketHandler`] to the engine's [`Events`] interface.
///
/// Hand this to [`Stack::poll`] and wired TCP traffic arrives through the same
/// callbacks as native traffic.
///
/// [`SocketHandler`]: trait.SocketHandler.html
/// [`Events`]: ../stack/trait.Events.html
/// [`Stack::poll`]: ../stack/struct.Stack.html#method.poll
pub struct WiredEvents<'a, H: ?Sized> {
    handler: &'a mut H,
}

impl<'a, H: SocketHandler + ?Sized> WiredEvents<'a, H> {
    /// Wrap a handler for one poll.
    pub fn new(handler: &'a mut H) -> Self {
        WiredEvents { handler }
    }
}

impl<H: SocketHandler + ?Sized> Events for WiredEvents<'_, H> {
    fn tcp(&mut self, socket: TcpSocket<'_>, event: TcpEvent<'_>) {
        match event {
            TcpEvent::Connected => self.handler.on_connect(Conn::Wired(socket)),
            TcpEvent::Data(data) => self.handler.on_receive(Conn::Wired(socket), data),
            TcpEvent::Acked => self.handler.on_sent(Conn::Wired(socket)),
            TcpEvent::Retransmit => self.handler.on_sent(Conn::Wired(socket)),
            TcpEvent::Closed => self.handler.on_disconnect(Handle::wired(socket.slot())),
        }
    }
}

/// Which backend serves new traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// The vendor stack.
    Native,
    /// This crate's engine.
    Wired,
}

/// Routes connection-independent operations to the active backend.
pub struct Facade<N> {
    native: N,
    transport: Transport,
}

impl<N: NativeStack> Facade<N> {
    /// A façade over `native`, starting out on `transport`.
    pub fn new(native: N, transport: Transport) -> Self {
        Facade { native, transport }
    }

    /// The active backend.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Switch the active backend. Existing connections stay where they are.
    pub fn set_transport(&mut self, transport: Transport) {
        self.transport = transport;
    }

    /// Direct access to the vendor stack.
    pub fn native(&mut self) -> &mut N {
        &mut self.native
    }

    /// Start accepting connections on `port` on the active backend.
    pub fn accept(&mut self, stack: &mut Stack, port: u16) -> Result<(), Error> {
        match self.transport {
            Transport::Native => self.native.accept(port),
            Transport::Wired => stack.listen(port),
        }
    }

    /// Cap simultaneous connections on both backends.
    ///
    /// Opens beyond the cap are ignored, not refused.
    pub fn set_max_connections(&mut self, stack: &mut Stack, limit: usize) {
        self.native.set_max_connections(limit);
        stack.set_max_connections(limit);
    }
}
