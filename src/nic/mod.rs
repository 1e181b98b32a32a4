//! The interface to the Ethernet controller.
//!
//! The engine never talks to hardware directly. A chip driver (for an SPI-attached
//! controller such as the ENC28J60 family, or anything else that moves whole Ethernet
//! frames) implements [`Device`] and the engine calls it from
//! [`Stack::poll`](../stack/struct.Stack.html#method.poll). The driver is expected to
//! filter on its own station address plus broadcast; everything it hands out is
//! dispatched.
//!
//! [`Device`]: trait.Device.html
mod testnic;

pub use self::testnic::TestNic;

/// A network device moving whole Ethernet frames.
///
/// Transmission is fire-and-forget, matching half of the controllers this is written
/// for: there is no completion report beyond the chip having accepted the frame, and
/// the engine's own retransmission logic papers over losses.
pub trait Device {
    /// Queue one frame for transmission.
    fn transmit(&mut self, frame: &[u8]);

    /// Fetch the next pending frame into `buffer`.
    ///
    /// Returns the length of the frame, or 0 when no frame is pending. Frames longer
    /// than the buffer are to be dropped by the driver, not truncated.
    fn receive(&mut self, buffer: &mut [u8]) -> usize;

    /// Query the PHY link state.
    fn link_up(&mut self) -> bool;

    /// Fully re-initialize the controller.
    ///
    /// Called by the liveness watchdog when an interface has gone quiet for a whole
    /// observation window, which on the target hardware usually means the chip has
    /// wedged and only a reset brings it back.
    fn restart(&mut self);
}

impl<D: Device + ?Sized> Device for &mut D {
    fn transmit(&mut self, frame: &[u8]) {
        (**self).transmit(frame)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> usize {
        (**self).receive(buffer)
    }

    fn link_up(&mut self) -> bool {
        (**self).link_up()
    }

    fn restart(&mut self) {
        (**self).restart()
    }
}
