//! Protocol module - wire format, framing, and the inbound byte path.
//!
//! This module implements the fixed-size serial frame:
//! - 255-byte frame encoding and XOR checksum validation
//! - SPSC ring buffer fed from the byte-arrival context
//! - Frame assembler that resynchronises on the start marker
//! - Bounded queue of validated frames

mod frame;
mod frame_buffer;
mod frame_queue;
mod ring_buffer;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use frame_buffer::FrameAssembler;
pub use frame_queue::{FrameQueue, DEFAULT_QUEUE_DEPTH};
pub use ring_buffer::{ingress, IngressPort, IngressReader, RingBuffer, DEFAULT_RING_CAPACITY};
pub use wire_format::{
    checksum, validate_frame, MessageKind, CHECKSUM_OFFSET, END_MARKER, END_OFFSET, FRAME_SIZE,
    KIND_OFFSET, LENGTH_OFFSET, MAX_PAYLOAD_SIZE, PAYLOAD_OFFSET, START_MARKER,
};
