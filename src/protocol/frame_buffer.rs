//! Frame assembler for reassembling frames byte by byte.
//!
//! Implements a two-state machine:
//! - `Hunting`: discard bytes until a start marker appears
//! - `Collecting`: copy bytes into the scratch frame until `FRAME_SIZE` is reached
//!
//! The frame size is a protocol constant, so the declared length is never
//! consulted while collecting. Once the scratch frame is full it is
//! validated and the assembler resets, whatever the outcome. A corrupt
//! frame is not searched for an embedded start marker.
//!
//! # Example
//!
//! ```
//! use console_link::protocol::{build_frame, FrameAssembler, MessageKind};
//!
//! let mut assembler = FrameAssembler::new();
//! let raw = build_frame(MessageKind::Heartbeat, &[]).unwrap();
//!
//! let mut frames = Vec::new();
//! for byte in [0x00, 0x13].iter().chain(raw.iter()) {
//!     if let Some(Ok(frame)) = assembler.push_byte(*byte) {
//!         frames.push(frame);
//!     }
//! }
//! assert_eq!(frames.len(), 1);
//! ```

use super::wire_format::{FRAME_SIZE, START_MARKER};
use super::Frame;
use crate::error::FrameError;

/// Byte-at-a-time frame assembler with a single scratch frame.
pub struct FrameAssembler {
    /// Scratch frame being filled.
    scratch: [u8; FRAME_SIZE],
    /// Next write position in `scratch`.
    write_index: usize,
    /// Whether a start marker has been seen.
    active: bool,
}

impl FrameAssembler {
    /// Create an idle assembler.
    pub const fn new() -> Self {
        Self {
            scratch: [0u8; FRAME_SIZE],
            write_index: 0,
            active: false,
        }
    }

    /// Feed one byte.
    ///
    /// Returns:
    /// - `None` while still hunting or collecting
    /// - `Some(Ok(frame))` when a complete frame validated
    /// - `Some(Err(..))` when a complete frame failed validation
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<Frame, FrameError>> {
        if !self.active {
            if byte != START_MARKER {
                return None;
            }
            self.active = true;
            self.write_index = 0;
        }

        self.scratch[self.write_index] = byte;
        self.write_index += 1;

        if self.write_index < FRAME_SIZE {
            return None;
        }

        let result = Frame::decode(&self.scratch);
        self.reset();
        Some(result)
    }

    /// Abandon any partial frame.
    pub fn reset(&mut self) {
        self.write_index = 0;
        self.active = false;
    }

    /// Whether a frame is partially collected.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of bytes collected for the current frame.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.write_index
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, MessageKind, PAYLOAD_OFFSET};

    fn feed(assembler: &mut FrameAssembler, bytes: &[u8]) -> Vec<Result<Frame, FrameError>> {
        bytes
            .iter()
            .filter_map(|&b| assembler.push_byte(b))
            .collect()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut assembler = FrameAssembler::new();
        let raw = build_frame(MessageKind::Command, b"start").unwrap();

        let results = feed(&mut assembler, &raw);

        assert_eq!(results.len(), 1);
        let frame = results[0].as_ref().unwrap();
        assert_eq!(frame.kind(), MessageKind::Command);
        assert_eq!(frame.payload(), b"start");
        assert!(!assembler.is_active());
    }

    #[test]
    fn test_noise_before_and_after() {
        let mut assembler = FrameAssembler::new();
        let raw = build_frame(MessageKind::Data, b"payload").unwrap();

        let mut stream = vec![0x00, 0x12, 0x55, 0xFE];
        stream.extend_from_slice(&raw);
        stream.extend_from_slice(&[0x01, 0x02, 0x03]);

        let results = feed(&mut assembler, &stream);

        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
        assert!(!assembler.is_active());
    }

    #[test]
    fn test_partial_frame_stays_active() {
        let mut assembler = FrameAssembler::new();
        let raw = build_frame(MessageKind::Ack, &[]).unwrap();

        let results = feed(&mut assembler, &raw[..100]);
        assert!(results.is_empty());
        assert!(assembler.is_active());
        assert_eq!(assembler.buffered(), 100);

        let results = feed(&mut assembler, &raw[100..]);
        assert_eq!(results.len(), 1);
        assert_eq!(assembler.buffered(), 0);
    }

    #[test]
    fn test_corrupt_frame_reported_then_reset() {
        let mut assembler = FrameAssembler::new();
        let mut bad = build_frame(MessageKind::Chat, b"hello").unwrap();
        bad[PAYLOAD_OFFSET + 1] ^= 0xFF;
        let good = build_frame(MessageKind::Chat, b"again").unwrap();

        let mut stream = bad.to_vec();
        stream.extend_from_slice(&good);
        let results = feed(&mut assembler, &stream);

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(FrameError::ChecksumMismatch { .. })
        ));
        assert_eq!(results[1].as_ref().unwrap().payload(), b"again");
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut assembler = FrameAssembler::new();
        let mut stream = Vec::new();
        for kind in [MessageKind::Heartbeat, MessageKind::Ack, MessageKind::Nack] {
            stream.extend_from_slice(&build_frame(kind, &[]).unwrap());
        }

        let kinds: Vec<_> = feed(&mut assembler, &stream)
            .into_iter()
            .map(|r| r.unwrap().kind())
            .collect();

        assert_eq!(
            kinds,
            vec![MessageKind::Heartbeat, MessageKind::Ack, MessageKind::Nack]
        );
    }

    #[test]
    fn test_reset_abandons_partial() {
        let mut assembler = FrameAssembler::new();
        let raw = build_frame(MessageKind::Ack, &[]).unwrap();
        feed(&mut assembler, &raw[..10]);

        assembler.reset();

        assert!(!assembler.is_active());
        assert_eq!(assembler.buffered(), 0);
        // The tail of the abandoned frame holds no start marker, so it is ignored.
        assert!(feed(&mut assembler, &raw[10..]).is_empty());
    }
}
