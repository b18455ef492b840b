//! Stream Pair: the two ring-buffered bulk endpoints (TX/RX) of a mounted
//! interface, plus the zero-length-packet bookkeeping the spec requires.
//!
//! The distilled spec treats ring buffers as an external primitive
//! (`edpt_stream`) the way the teacher kernel treats the DMA-safe "bounce
//! buffer" it passes to `bulk_transfer` as something the caller owns. This
//! crate hand-rolls a small fixed-capacity ring buffer directly — the same
//! shape as the teacher's own `RxRingBuffer` in `cdc_acm.rs` (head/tail
//! indices into a fixed array, `push`/`read_into`) — generalized to both
//! directions and sized by a const generic instead of a crate-wide constant,
//! since no external ring-buffer crate is assumed to be present in a
//! `#![no_std]` embedding.
//!
//! The "DMA-safe endpoint packet buffer" the spec's data model assigns to
//! each direction is not duplicated here: the concrete [`crate::HostBus`]
//! implementation already owns real DMA-capable memory for its own
//! hardware, so this crate only tracks the ring buffer and the endpoint
//! address/max-packet-size needed to submit against it.

/// Ring buffer capacity, in bytes, for each direction of a stream pair.
pub const RING_CAPACITY: usize = 512;

/// A fixed-capacity byte ring buffer. One extra slot is kept empty so
/// `head == tail` unambiguously means "empty" (the classic ring-buffer
/// full/empty disambiguation, the same approach the teacher's
/// `RxRingBuffer` uses).
#[derive(Clone, Copy)]
pub struct RingBuffer<const CAP: usize> {
    buf: [u8; CAP],
    head: usize,
    tail: usize,
}

impl<const CAP: usize> RingBuffer<CAP> {
    pub const fn new() -> Self {
        RingBuffer {
            buf: [0; CAP],
            head: 0,
            tail: 0,
        }
    }

    pub fn available(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            CAP - self.tail + self.head
        }
    }

    fn free_space(&self) -> usize {
        CAP - 1 - self.available()
    }

    /// Copies as much of `src` as fits; never blocks. Returns bytes queued.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.free_space());
        for &b in &src[..n] {
            self.buf[self.head] = b;
            self.head = (self.head + 1) % CAP;
        }
        n
    }

    /// Drains into `dst`. Returns bytes returned.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.available());
        for slot in dst.iter_mut().take(n) {
            *slot = self.buf[self.tail];
            self.tail = (self.tail + 1) % CAP;
        }
        n
    }

    /// Copies without consuming.
    pub fn peek(&self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.available());
        let mut t = self.tail;
        for slot in dst.iter_mut().take(n) {
            *slot = self.buf[t];
            t = (t + 1) % CAP;
        }
        n
    }

    /// Discards `n` bytes from the front without copying them out.
    pub fn discard(&mut self, n: usize) {
        let n = n.min(self.available());
        self.tail = (self.tail + n) % CAP;
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

/// One direction (TX or RX) of a mounted interface's byte stream.
#[derive(Clone, Copy)]
pub struct StreamDirection {
    pub ring: RingBuffer<RING_CAPACITY>,
    pub ep_addr: u8,
    pub max_packet_size: u16,
    /// `true` while a bulk transfer on this endpoint is outstanding.
    pub xfer_in_flight: bool,
    /// Bytes moved by the most recently completed transfer; used by TX to
    /// decide whether a ZLP is owed.
    pub last_xfer_bytes: usize,
    /// Cleared by [`crate::CdcHost::xfer_cb`] on a non-success completion
    /// (§4.6); once disarmed, no further transfer is submitted on this
    /// direction until the interface is re-opened.
    pub armed: bool,
}

impl StreamDirection {
    pub const fn new() -> Self {
        StreamDirection {
            ring: RingBuffer::new(),
            ep_addr: 0,
            max_packet_size: 0,
            xfer_in_flight: false,
            last_xfer_bytes: 0,
            armed: false,
        }
    }

    fn open(&mut self, ep_addr: u8, max_packet_size: u16) {
        self.ring.clear();
        self.ep_addr = ep_addr;
        self.max_packet_size = max_packet_size;
        self.xfer_in_flight = false;
        self.last_xfer_bytes = 0;
        self.armed = true;
    }

    fn close(&mut self) {
        self.ep_addr = 0;
        self.armed = false;
        self.xfer_in_flight = false;
        self.ring.clear();
    }
}

/// The TX/RX pair backing one mounted interface.
#[derive(Clone, Copy)]
pub struct StreamPair {
    pub tx: StreamDirection,
    pub rx: StreamDirection,
}

impl StreamPair {
    pub const fn new() -> Self {
        StreamPair {
            tx: StreamDirection::new(),
            rx: StreamDirection::new(),
        }
    }

    pub fn open(&mut self, tx_ep: u8, tx_max_packet: u16, rx_ep: u8, rx_max_packet: u16) {
        self.tx.open(tx_ep, tx_max_packet);
        self.rx.open(rx_ep, rx_max_packet);
    }

    pub fn close(&mut self) {
        self.tx.close();
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_round_trip() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        assert_eq!(ring.write(b"abcd"), 4);
        assert_eq!(ring.available(), 4);
        let mut out = [0u8; 4];
        assert_eq!(ring.read(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn ring_buffer_wraps_around() {
        let mut ring: RingBuffer<4> = RingBuffer::new();
        // capacity is CAP - 1 usable bytes
        assert_eq!(ring.write(b"abc"), 3);
        assert_eq!(ring.write(b"d"), 0);
        let mut out = [0u8; 2];
        ring.read(&mut out);
        assert_eq!(&out, b"ab");
        assert_eq!(ring.write(b"ef"), 2);
        let mut out = [0u8; 3];
        assert_eq!(ring.read(&mut out), 3);
        assert_eq!(&out, b"cef");
    }

    #[test]
    fn ring_buffer_peek_does_not_consume() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        ring.write(b"xyz");
        let mut out = [0u8; 3];
        assert_eq!(ring.peek(&mut out), 3);
        assert_eq!(ring.available(), 3);
        ring.discard(1);
        assert_eq!(ring.available(), 2);
        assert_eq!(ring.peek(&mut out[..2]), 2);
        assert_eq!(&out[..2], b"yz");
    }

    #[test]
    fn stream_direction_close_resets_armed() {
        let mut dir = StreamDirection::new();
        dir.open(0x81, 64);
        assert!(dir.armed);
        dir.ring.write(b"hi");
        dir.close();
        assert!(!dir.armed);
        assert_eq!(dir.ring.available(), 0);
    }
}
