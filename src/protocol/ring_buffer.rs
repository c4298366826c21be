//! Ingress ring buffer between the byte-arrival context and the poll loop.
//!
//! # Design
//!
//! A fixed-capacity single-producer/single-consumer byte queue:
//! - The producer is the transport's byte-received notification, which on
//!   hardware runs at interrupt level. It only ever calls [`RingBuffer::put`].
//! - The consumer is the frame assembler, driven from the cooperative poll loop.
//!
//! `head` is written only by the producer and `tail` only by the consumer, so
//! each side publishes its index with a release store and observes the other
//! with an acquire load. `put` never blocks, never allocates and never calls
//! into the parser. When full it drops the byte and counts an overflow.
//!
//! [`ingress`] splits one buffer into an [`IngressPort`] (producer) and an
//! [`IngressReader`] (consumer). Neither half is `Clone`, which keeps the
//! single-producer/single-consumer discipline in the type system.

use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default ring buffer capacity in bytes (four full frames).
pub const DEFAULT_RING_CAPACITY: usize = 1024;

/// Fixed-capacity SPSC byte queue.
#[derive(Debug)]
pub struct RingBuffer {
    /// Byte slots.
    slots: Box<[AtomicU8]>,
    /// Total bytes ever written (producer-owned).
    head: AtomicUsize,
    /// Total bytes ever read (consumer-owned).
    tail: AtomicUsize,
    /// Bytes dropped because the buffer was full.
    overflows: AtomicU32,
}

impl RingBuffer {
    /// Create a ring buffer holding `capacity` bytes.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| AtomicU8::new(0)).collect(),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflows: AtomicU32::new(0),
        }
    }

    /// Append a byte. Producer side only.
    ///
    /// Returns `false` and increments the overflow counter if full.
    #[inline]
    pub fn put(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= self.slots.len() {
            self.overflows.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.slots[head % self.slots.len()].store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Remove the oldest byte. Consumer side only.
    #[inline]
    pub fn get(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        let byte = self.slots[tail % self.slots.len()].load(Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Bytes waiting to be read.
    #[inline]
    pub fn available(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Bytes that can still be written before overflow.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.slots.len() - self.available()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Discard everything currently buffered. Consumer side only.
    pub fn flush(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }

    /// Bytes dropped because the buffer was full.
    #[inline]
    pub fn overflow_count(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// Reset the overflow counter.
    pub fn reset_overflow_count(&self) {
        self.overflows.store(0, Ordering::Relaxed);
    }
}

/// Create a ring buffer and split it into producer and consumer halves.
pub fn ingress(capacity: usize) -> (IngressPort, IngressReader) {
    let ring = Arc::new(RingBuffer::new(capacity));
    (
        IngressPort { ring: ring.clone() },
        IngressReader { ring },
    )
}

/// Producer half: handed to whatever delivers received bytes.
#[derive(Debug)]
pub struct IngressPort {
    ring: Arc<RingBuffer>,
}

impl IngressPort {
    /// Byte-received notification. Non-blocking and allocation-free.
    #[inline]
    pub fn try_send(&self, byte: u8) -> bool {
        self.ring.put(byte)
    }

    /// Deliver a run of bytes; returns how many were accepted.
    pub fn try_send_all(&self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| self.ring.put(b)).count()
    }

    /// Bytes dropped on this port because the buffer was full.
    pub fn overflow_count(&self) -> u32 {
        self.ring.overflow_count()
    }
}

/// Consumer half: owned by the engine's poll loop.
#[derive(Debug)]
pub struct IngressReader {
    ring: Arc<RingBuffer>,
}

impl IngressReader {
    #[inline]
    pub fn try_recv(&self) -> Option<u8> {
        self.ring.get()
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    #[inline]
    pub fn free_space(&self) -> usize {
        self.ring.free_space()
    }

    pub fn flush(&self) {
        self.ring.flush();
    }

    pub fn overflow_count(&self) -> u32 {
        self.ring.overflow_count()
    }

    pub fn reset_overflow_count(&self) {
        self.ring.reset_overflow_count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_fifo() {
        let ring = RingBuffer::new(8);

        assert!(ring.put(1));
        assert!(ring.put(2));
        assert!(ring.put(3));
        assert_eq!(ring.available(), 3);

        assert_eq!(ring.get(), Some(1));
        assert_eq!(ring.get(), Some(2));
        assert_eq!(ring.get(), Some(3));
        assert_eq!(ring.get(), None);
    }

    #[test]
    fn test_fill_to_capacity_then_overflow() {
        let ring = RingBuffer::new(16);

        for i in 0..16 {
            assert!(ring.put(i), "put {} should succeed", i);
        }
        assert_eq!(ring.free_space(), 0);
        assert_eq!(ring.overflow_count(), 0);

        assert!(!ring.put(0xFF));
        assert_eq!(ring.overflow_count(), 1);
        assert_eq!(ring.available(), 16);

        ring.flush();
        assert_eq!(ring.available(), 0);
        assert_eq!(ring.free_space(), 16);
    }

    #[test]
    fn test_overflow_drops_newest() {
        let ring = RingBuffer::new(2);
        ring.put(b'a');
        ring.put(b'b');
        ring.put(b'c');

        assert_eq!(ring.get(), Some(b'a'));
        assert_eq!(ring.get(), Some(b'b'));
        assert_eq!(ring.get(), None);
    }

    #[test]
    fn test_wraparound() {
        let ring = RingBuffer::new(4);

        for round in 0..10u8 {
            for i in 0..3 {
                assert!(ring.put(round * 3 + i));
            }
            for i in 0..3 {
                assert_eq!(ring.get(), Some(round * 3 + i));
            }
        }
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let ring = RingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
        assert!(ring.put(7));
        assert!(!ring.put(8));
    }

    #[test]
    fn test_split_halves_share_buffer() {
        let (port, reader) = ingress(4);

        assert_eq!(port.try_send_all(&[1, 2, 3, 4, 5]), 4);
        assert_eq!(port.overflow_count(), 1);
        assert_eq!(reader.overflow_count(), 1);
        assert_eq!(reader.available(), 4);
        assert_eq!(reader.try_recv(), Some(1));
        assert_eq!(reader.free_space(), 1);

        reader.flush();
        reader.reset_overflow_count();
        assert_eq!(reader.available(), 0);
        assert_eq!(port.overflow_count(), 0);
    }

    #[test]
    fn test_producer_on_another_thread() {
        let (port, reader) = ingress(64);

        let producer = std::thread::spawn(move || {
            let mut sent = 0u32;
            for i in 0..1000u32 {
                while !port.try_send((i % 251) as u8) {
                    std::thread::yield_now();
                }
                sent += 1;
            }
            sent
        });

        let mut received = Vec::with_capacity(1000);
        while received.len() < 1000 {
            match reader.try_recv() {
                Some(b) => received.push(b),
                None => std::thread::yield_now(),
            }
        }

        assert_eq!(producer.join().unwrap(), 1000);
        for (i, b) in received.iter().enumerate() {
            assert_eq!(*b, (i % 251) as u8);
        }
    }
}
