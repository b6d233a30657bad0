//! Byte-stream framing with resynchronization.
//!
//! Splitting on the 0x81 trailer alone undercounts frames: 0x81 turns
//! up inside payloads whenever a little-endian field happens to encode
//! it. Framing is therefore length-guided for every class in the table,
//! with the in-band `T1 + 5` length convention covering codes the table
//! does not know, and a byte-by-byte skip when neither fits.

use log::{debug, warn};

use crate::message::{MessageClass, MAX_FRAME_LEN, MIN_FRAME_LEN, TRAILER};

/// Upper bound on buffered bytes; beyond it the framer drops everything
/// and resynchronizes.
const MAX_BUFFER: usize = 1024;

/// Stateful frame splitter. Push arbitrary chunks in, pull complete
/// frames (each ending in 0x81) out, in byte-stream order.
#[derive(Debug)]
pub struct Framer {
    buf: Vec<u8>,
    /// Whether the buffer start is a trusted frame boundary: the byte
    /// after an emitted frame, or the start of the stream. Lost when a
    /// candidate has to be skipped, regained on the next clean frame.
    synced: bool,
    /// Bytes skipped since the last emitted frame.
    skipped: usize,
    resets: u64,
}

impl Default for Framer {
    fn default() -> Framer {
        Framer {
            buf: Vec::new(),
            synced: true,
            skipped: 0,
            resets: 0,
        }
    }
}

impl Framer {
    pub fn new() -> Framer {
        Framer::default()
    }

    /// Number of times the buffer overflowed and was dropped.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Append raw bytes from the transport.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > MAX_BUFFER {
            warn!(
                "framer reset: {} bytes buffered without a frame",
                self.buf.len()
            );
            self.buf.clear();
            self.synced = false;
            self.skipped = 0;
            self.resets += 1;
        }
    }

    /// Pull the next complete frame, if the buffer holds one.
    pub fn pull(&mut self) -> Option<Vec<u8>> {
        loop {
            if self.buf.len() < 3 {
                return None;
            }

            let code = (u32::from(self.buf[0]) << 16)
                | (u32::from(self.buf[1]) << 8)
                | u32::from(self.buf[2]);
            let declared = MessageClass::from_code(code).and_then(MessageClass::frame_len);
            // Every known class declares T1 + 5; unknown codes get
            // judged by the same convention.
            let derived = usize::from(self.buf[1]) + 5;

            let len = match declared {
                Some(len) => len,
                None => {
                    if derived < MIN_FRAME_LEN || derived > MAX_FRAME_LEN {
                        self.skip(1);
                        continue;
                    }
                    derived
                }
            };

            if self.buf.len() < len {
                return None;
            }
            if self.buf[len - 1] == TRAILER {
                return Some(self.take(len));
            }

            // No trailer where the length says. For an unknown class at
            // a trusted boundary, fall back to scanning for the nearest
            // trailer still within a plausible frame; smallest
            // candidate wins. Once desynchronized that scan would
            // happily merge garbage with the next real frame, so resync
            // strictly byte by byte instead.
            if declared.is_none() && self.synced {
                let window = self.buf.len().min(MAX_FRAME_LEN);
                if let Some(at) = self.buf[MIN_FRAME_LEN - 1..window]
                    .iter()
                    .position(|&b| b == TRAILER)
                {
                    return Some(self.take(MIN_FRAME_LEN + at));
                }
                if self.buf.len() < MAX_FRAME_LEN {
                    // A trailer may still arrive.
                    return None;
                }
            }
            self.skip(1);
        }
    }

    fn take(&mut self, len: usize) -> Vec<u8> {
        if self.skipped > 0 {
            debug!("resynchronized after skipping {} bytes", self.skipped);
            self.skipped = 0;
        }
        self.synced = true;
        let frame = self.buf[..len].to_vec();
        self.buf.drain(..len);
        frame
    }

    fn skip(&mut self, n: usize) {
        self.buf.drain(..n);
        self.synced = false;
        self.skipped += n;
    }
}
