//! An in-memory device for exercising the engine.
use super::Device;

const FRAME_CAP: usize = 1200;
const QUEUE_CAP: usize = 8;

#[derive(Clone, Copy)]
struct Slot {
    len: usize,
    data: [u8; FRAME_CAP],
}

impl Slot {
    const EMPTY: Slot = Slot { len: 0, data: [0; FRAME_CAP] };

    fn filled(frame: &[u8]) -> Slot {
        let mut slot = Slot::EMPTY;
        slot.len = frame.len();
        slot.data[..frame.len()].copy_from_slice(frame);
        slot
    }

    fn frame(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// A device backed by two bounded in-memory frame queues.
///
/// Frames pushed with [`inject`](#method.inject) come back out of `receive` in order;
/// everything the engine transmits is captured and can be inspected afterwards. Useful
/// only for tests and examples, but compiled unconditionally so that dependent crates
/// can use it in theirs.
pub struct TestNic {
    inbound: [Slot; QUEUE_CAP],
    inbound_len: usize,
    inbound_head: usize,
    outbound: [Slot; QUEUE_CAP],
    outbound_len: usize,
    link: bool,
    restarts: usize,
}

impl TestNic {
    /// Create a device with an empty queue and the link up.
    pub fn new() -> Self {
        TestNic {
            inbound: [Slot::EMPTY; QUEUE_CAP],
            inbound_len: 0,
            inbound_head: 0,
            outbound: [Slot::EMPTY; QUEUE_CAP],
            outbound_len: 0,
            link: true,
            restarts: 0,
        }
    }

    /// Queue a frame to be handed out by `receive`.
    ///
    /// # Panics
    /// Panics when the queue is full or the frame too long; the queues are sized for
    /// directed tests, not load.
    pub fn inject(&mut self, frame: &[u8]) {
        assert!(self.inbound_len < QUEUE_CAP, "inbound queue full");
        assert!(frame.len() <= FRAME_CAP, "frame too long");
        let at = (self.inbound_head + self.inbound_len) % QUEUE_CAP;
        self.inbound[at] = Slot::filled(frame);
        self.inbound_len += 1;
    }

    /// The number of captured outbound frames.
    pub fn sent_count(&self) -> usize {
        self.outbound_len
    }

    /// A captured outbound frame, oldest first.
    pub fn sent(&self, index: usize) -> &[u8] {
        assert!(index < self.outbound_len);
        self.outbound[index].frame()
    }

    /// The most recently captured outbound frame, if any.
    pub fn last_sent(&self) -> Option<&[u8]> {
        self.outbound_len.checked_sub(1).map(|i| self.outbound[i].frame())
    }

    /// Drop all captured outbound frames.
    pub fn clear_sent(&mut self) {
        self.outbound_len = 0;
    }

    /// Set the reported PHY link state.
    pub fn set_link(&mut self, up: bool) {
        self.link = up;
    }

    /// How often the watchdog asked for a restart.
    pub fn restarts(&self) -> usize {
        self.restarts
    }
}

impl Default for TestNic {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for TestNic {
    fn transmit(&mut self, frame: &[u8]) {
        assert!(self.outbound_len < QUEUE_CAP, "outbound queue full");
        assert!(frame.len() <= FRAME_CAP, "frame too long");
        self.outbound[self.outbound_len] = Slot::filled(frame);
        self.outbound_len += 1;
    }

    fn receive(&mut self, buffer: &mut [u8]) -> usize {
        if self.inbound_len == 0 {
            return 0;
        }
        let slot = self.inbound[self.inbound_head];
        self.inbound_head = (self.inbound_head + 1) % QUEUE_CAP;
        self.inbound_len -= 1;
        if slot.len > buffer.len() {
            // mirrors a real driver dropping oversized frames
            return 0;
        }
        buffer[..slot.len].copy_from_slice(slot.frame());
        slot.len
    }

    fn link_up(&mut self) -> bool {
        self.link
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn queues_round_trip_in_order() {
        let mut nic = TestNic::new();
        nic.inject(&[1, 2, 3]);
        nic.inject(&[4, 5]);

        let mut buffer = [0; 16];
        assert_eq!(nic.receive(&mut buffer), 3);
        assert_eq!(&buffer[..3], &[1, 2, 3]);
        assert_eq!(nic.receive(&mut buffer), 2);
        assert_eq!(nic.receive(&mut buffer), 0);

        nic.transmit(&[9, 9]);
        assert_eq!(nic.sent_count(), 1);
        assert_eq!(nic.sent(0), &[9, 9]);
    }
}
