//! A [sans-I/O](https://sans-io.readthedocs.io/how-to-sans-io.html)
//! framer and decoder for the FDX protocol spoken on the USB port of
//! Garmin GND10 gateways, plus the transport and output plumbing to run
//! it against a live port or a capture file.
//!
//! The protocol is reverse-engineered: frames are
//! `[type0 type1 type2 payload… 0x81]` with little-endian payload
//! fields, no checksum anyone has cracked, and a trailer byte that also
//! occurs inside payloads. [`Framer`] turns a byte stream into frames
//! using per-class declared lengths, [`decode`] turns one frame into a
//! typed [`Message`] (or a suppression, or a classified error), and
//! [`Pipeline`] ties a [`ByteSource`] to both with the recovery policy
//! that keeps the stream alive across malformed input and serial
//! disconnects.
//!
//! Common abbreviations:
//!
//! - AWA/AWS: apparent wind angle/speed, relative to the vessel;
//! - COG/SOG: course/speed over ground (from GPS);
//! - STW: speed through water (paddlewheel);
//! - LE: little-endian.
//!
//! Usage:
//! ```no_run
//! use fdxread::{Pipeline, SerialSource, Step};
//!
//! let source = SerialSource::new("/dev/ttyACM0", false);
//! for step in Pipeline::new(source) {
//!     match step {
//!         Ok(Step::Event(msg)) => println!("{:?}", msg),
//!         Ok(Step::Idle) => {}
//!         Err(e) => {
//!             eprintln!("{}", e);
//!             break;
//!         }
//!     }
//! }
//! ```

pub mod decode;
pub mod error;
pub mod format;
pub mod framer;
pub mod measure;
pub mod message;
pub mod pipeline;
pub mod source;

pub use decode::{decode, Decoded};
pub use error::{DecodeError, TransportError};
pub use framer::Framer;
pub use measure::{Coordinate, Quantity};
pub use message::{Message, MessageClass};
pub use pipeline::{Pipeline, Step};
pub use source::{ByteSource, Chunk, HexdumpSource, RawDumpSource, SerialSource};
