//! Diagnostic counters and their stdout rendering.
//!
//! Counters are incremented inline by the component that observes the
//! event; [`Stats`] is the read-only snapshot handed to the application.
//!
//! # Output
//!
//! - **stdout**: one JSON object per line, written by [`write_stdout_line`]
//! - **logs**: everything else goes through `tracing`
//!
//! Lines end with an explicit `\n`; `println!` is not used.

use std::io::Write;

use serde::Serialize;

/// Snapshot of the link counters.
///
/// Every counter increases monotonically until the engine is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_sent: u64,
    /// Frames that passed structural validation.
    pub messages_parsed: u64,
    /// Structural failures: markers, kind, length or checksum.
    pub parse_errors: u64,
    /// Intact frames whose length does not fit their kind.
    pub length_mismatches: u64,
    pub send_errors: u64,
    /// Bytes dropped because the ingress ring was full.
    pub buffer_overflows: u64,
    /// Frames dropped because the inbound queue was full.
    pub queue_overflows: u64,
}

impl Stats {
    /// Render as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Total frames dropped for any reason on the inbound path.
    pub fn inbound_drops(&self) -> u64 {
        self.parse_errors + self.length_mismatches + self.queue_overflows
    }
}

/// Write a line to stdout followed by a single `\n`, then flush.
pub fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(line.as_bytes())?;
    handle.write_all(b"\n")?;
    handle.flush()
}
