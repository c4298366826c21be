//! Bounded FIFO of validated frames.
//!
//! Sits between the assembler and the dispatcher so that a burst of frames
//! drained from the ring buffer in one poll is dispatched in arrival order.
//! Storage is reserved up front and never grows; when the queue is full the
//! newest frame is dropped and counted.

use std::collections::VecDeque;

use super::Frame;

/// Default inbound queue depth.
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

/// Fixed-depth frame queue.
#[derive(Debug)]
pub struct FrameQueue {
    slots: VecDeque<Frame>,
    depth: usize,
    overflows: u32,
}

impl FrameQueue {
    /// Create a queue holding at most `depth` frames (minimum one).
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            slots: VecDeque::with_capacity(depth),
            depth,
            overflows: 0,
        }
    }

    /// Enqueue a frame. Returns `false` and counts an overflow if full.
    pub fn put(&mut self, frame: Frame) -> bool {
        if self.slots.len() >= self.depth {
            self.overflows += 1;
            return false;
        }
        self.slots.push_back(frame);
        true
    }

    /// Dequeue the oldest frame.
    pub fn get(&mut self) -> Option<Frame> {
        self.slots.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.depth
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Drop every queued frame.
    pub fn flush(&mut self) {
        self.slots.clear();
    }

    /// Frames dropped because the queue was full.
    #[inline]
    pub fn overflow_count(&self) -> u32 {
        self.overflows
    }

    pub fn reset_overflow_count(&mut self) {
        self.overflows = 0;
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_DEPTH)
    }
}
