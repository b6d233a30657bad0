//! The pull pipeline: source → framer → decoder → consumer.
//!
//! Single-threaded and cooperative. The consumer blocks on the source
//! (bounded by the serial read timeout or the reopen backoff), the
//! framer and decoder never block. Events come out in framer order;
//! nothing is reordered.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::decode::{decode, Decoded};
use crate::error::{DecodeError, TransportError};
use crate::framer::Framer;
use crate::message::Message;
use crate::source::{ByteSource, Chunk};

/// One step of pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A decoded, non-suppressed message.
    Event(Message),

    /// The source had nothing; lets the consumer pace itself.
    Idle,
}

/// Drives a byte source through framing and decoding, applying the
/// recovery policy: decode errors are counted and logged, never fatal.
pub struct Pipeline<S> {
    source: S,
    framer: Framer,
    pending: VecDeque<Message>,
    n_msg: u64,
    n_errors: u64,
}

impl<S: ByteSource> Pipeline<S> {
    pub fn new(source: S) -> Pipeline<S> {
        Pipeline {
            source,
            framer: Framer::new(),
            pending: VecDeque::new(),
            n_msg: 0,
            n_errors: 0,
        }
    }

    /// Messages delivered so far.
    pub fn n_msg(&self) -> u64 {
        self.n_msg
    }

    /// Decode errors absorbed so far.
    pub fn n_errors(&self) -> u64 {
        self.n_errors
    }

    fn absorb(&mut self, err: DecodeError) {
        self.n_errors += 1;
        match err {
            // Stray trailer runts are routine, keep them out of the
            // default log level.
            DecodeError::ShortFrame { .. } => debug!("ignoring: {}", err),
            _ => warn!("ignoring: {}", err),
        }
    }

    fn drain_framer(&mut self) {
        while let Some(frame) = self.framer.pull() {
            match decode(&frame) {
                Ok(Decoded::Event(msg)) => {
                    self.n_msg += 1;
                    self.pending.push_back(msg);
                }
                Ok(Decoded::Suppressed) => {}
                Err(e) => self.absorb(e),
            }
        }
    }
}

impl<S: ByteSource> Iterator for Pipeline<S> {
    type Item = Result<Step, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(msg) = self.pending.pop_front() {
                return Some(Ok(Step::Event(msg)));
            }

            match self.source.pull() {
                Err(e) => return Some(Err(e)),
                Ok(None) => return None,
                Ok(Some(Chunk::Idle)) => return Some(Ok(Step::Idle)),
                Ok(Some(Chunk::Bytes { data, .. })) => {
                    self.framer.push(&data);
                    self.drain_framer();
                }
            }
        }
    }
}
