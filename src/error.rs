//! Representations of errors returned by this crate.

use std::io;

use thiserror::Error;

/// A frame failed to decode. The framer is unaffected; the pipeline
/// counts the error and moves on to the next frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The frame is below the 5-byte protocol minimum (3 type bytes,
    /// at least one payload byte, the trailer).
    #[error("short frame ({len} bytes)")]
    ShortFrame { len: usize },

    /// The frame does not end in the 0x81 trailer.
    #[error("missing trailer (last byte 0x{last:02x})")]
    MissingTrailer { last: u8 },

    /// The frame length disagrees with the length the message class
    /// declares.
    #[error("{class}: expected {expected} bytes, got {got}")]
    LengthMismatch {
        class: &'static str,
        expected: usize,
        got: usize,
    },

    /// The 24-bit type code has no entry in the class table.
    #[error("no handler for type 0x{code:06x} ({len} bytes)")]
    UnhandledClass { code: u32, len: usize },

    /// A field the class table documents as constant was observed
    /// otherwise.
    #[error("{class}: {detail}")]
    AssumptionViolation { class: &'static str, detail: String },
}

/// A byte source failed in a way its own retry policy cannot absorb.
///
/// Retryable serial failures (device unplugged, port busy) never surface
/// here; the serial source absorbs those with its reopen backoff. What
/// does surface is unrecoverable: a capture file that cannot be opened,
/// or a port the process lacks permission for.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot open port {path}: {source}")]
    Port {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
