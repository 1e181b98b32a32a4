//! A fixed-memory Ethernet/IP engine for raw packet network controllers.
//!
//! This crate drives a wired Ethernet controller (the kind that hands the host whole
//! frames over SPI, such as an ENC28J60-class chip) with a deliberately small TCP/IP
//! engine: a fixed ARP cache, ICMP echo handling with a single ping probe, UDP port
//! dispatch, and a reduced-state TCP engine with a fixed connection table and blind
//! retransmission. A socket façade on top lets application code talk to either this
//! engine or a platform-native socket stack through one callback contract, selected
//! per connection by a handle tag.
//!
//! Nothing here *ever* dynamically allocates memory. All tables and both frame
//! buffers live inside [`Stack`](stack/struct.Stack.html); setup code decides once
//! how much memory the network owes it. The chip itself stays behind the
//! [`nic::Device`](nic/trait.Device.html) seam, so the engine can be exercised
//! against an in-memory device in tests.
//!
//! The intended control flow mirrors an interrupt-driven firmware main loop: the
//! controller ISR calls [`interrupt`](stack/struct.Stack.html#method.interrupt), a
//! one-second timer calls [`tick`](stack/struct.Stack.html#method.tick), and the
//! main loop calls [`poll`](stack/struct.Stack.html#method.poll) with the device
//! and the application's event handler.
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod nic;
pub mod sock;
pub mod stack;
pub mod wire;
