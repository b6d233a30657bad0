//! Byte sources feeding the pipeline: live serial, and the two offline
//! capture formats.
//!
//! All three normalize to the same pull contract: a timestamped chunk
//! of raw bytes, an [`Chunk::Idle`] sentinel when nothing is available
//! right now (so the caller can pace itself), or `Ok(None)` at end of
//! stream. Live serial never ends.

mod dump;
mod serial;

pub use dump::{HexdumpSource, RawDumpSource};
pub use serial::SerialSource;

use crate::error::TransportError;

/// One read's worth of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Raw bytes and the moment they were read. Capture replays carry
    /// the capture's own timestamps (values below 2.0 are relative
    /// deltas, continuation frames within one read carry 0).
    Bytes { ts: f64, data: Vec<u8> },

    /// No data available right now.
    Idle,
}

/// A lazy producer of byte chunks.
pub trait ByteSource {
    /// Pull the next chunk. `Ok(None)` means the stream is exhausted.
    fn pull(&mut self) -> Result<Option<Chunk>, TransportError>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn pull(&mut self) -> Result<Option<Chunk>, TransportError> {
        (**self).pull()
    }
}
