//! Output formatters consuming decoded messages.
//!
//! Formatters own whatever cross-message state their format needs (the
//! NMEA emitter holds the latest position and wall clock for composite
//! sentences); the decoder stays stateless.

mod json;
mod nmea;
mod signalk;

pub use json::JsonLines;
pub use nmea::Nmea0183;
pub use signalk::SignalkDelta;

use crate::message::Message;

/// Turns messages into output lines. `None` means this message
/// produced nothing (accumulated state, or nothing the format can
/// express).
pub trait Formatter {
    fn format(&mut self, msg: &Message) -> Option<String>;
}
