//! Pure frame decoding: complete frame bytes in, typed message (or
//! suppression, or classified error) out. No I/O, no global state.

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::error::DecodeError;
use crate::measure::{
    angle16, course16, fahrenheit_to_celsius, feet_to_meters, nan_u16, Coordinate,
};
use crate::message::{Message, MessageClass, MIN_FRAME_LEN, TRAILER};

/// The outcome of decoding one complete frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A measurement-bearing message for downstream consumers.
    Event(Message),

    /// Recognized frame with nothing worth emitting: a static
    /// heartbeat, an idle pre-lock body, or a class that is understood
    /// only well enough to be kept quiet.
    Suppressed,
}

/// The 24-bit type code of a frame, as conventionally written
/// (`frame[0]` is the most significant byte).
pub fn type_code(frame: &[u8]) -> u32 {
    (u32::from(frame[0]) << 16) | (u32::from(frame[1]) << 8) | u32::from(frame[2])
}

fn u16le(body: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([body[at], body[at + 1]])
}

/// Decode one complete frame, trailer included.
///
/// Idempotent and pure: equal input bytes decode to equal results.
pub fn decode(frame: &[u8]) -> Result<Decoded, DecodeError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(DecodeError::ShortFrame { len: frame.len() });
    }
    let last = frame[frame.len() - 1];
    if last != TRAILER {
        return Err(DecodeError::MissingTrailer { last });
    }

    let code = type_code(frame);
    let class = MessageClass::from_code(code).ok_or(DecodeError::UnhandledClass {
        code,
        len: frame.len(),
    })?;

    if let Some(expected) = class.frame_len() {
        if frame.len() != expected {
            return Err(DecodeError::LengthMismatch {
                class: class.name(),
                expected,
                got: frame.len(),
            });
        }
    }

    // Payload between the type bytes and the trailer.
    let body = &frame[3..frame.len() - 1];

    use MessageClass::*;
    match class {
        WindApparent => Ok(wind_apparent(body)),
        Depth => Ok(depth(body)),
        GpsPosition => Ok(gps_position(body)),
        GpsCogSog => Ok(gps_cog_sog(body)),
        GpsTime => Ok(gps_time(body)),
        Environment => Ok(environment(body)),

        EmptyHeartbeat => Ok(constant_body(
            class,
            body,
            &[&[0xff, 0xff, 0x00][..], &[0x00, 0x00, 0x00][..]],
        )),
        StaticOne => Ok(constant_body(
            class,
            body,
            &[&[0x00, 0x80, 0xff, 0xff, 0xff, 0x7f][..]],
        )),
        StaticTwo => Ok(constant_body(
            class,
            body,
            &[&[0xff, 0xff, 0x00, 0x00, 0x80, 0x80][..]],
        )),
        WindHeartbeat => {
            if body[0] == body[1] {
                Ok(Decoded::Suppressed)
            } else {
                Ok(fault(class, body, "counter bytes differ"))
            }
        }

        ZeroHeartbeat => {
            if body.iter().all(|&b| b == 0) {
                Ok(Decoded::Suppressed)
            } else {
                Err(assumption(class, body, "body should be zero"))
            }
        }
        WindSignal => {
            if body[0] == body[1] {
                Ok(Decoded::Suppressed)
            } else {
                Err(assumption(class, body, "counter bytes differ"))
            }
        }

        Junk => {
            // Codes only ever seen with tiny bodies; a bigger one means
            // the backstop assumption no longer holds.
            if body.len() <= 1 {
                Ok(Decoded::Suppressed)
            } else {
                Err(assumption(class, body, "body should be small"))
            }
        }

        // Recognized but not understood; kept out of the output.
        DepthAux | WindStale | WindDup | GpsPing | GatewayPulse | Wind40s | SounderPulse
        | Service | Wind7 | Wind8 | Wind3 => Ok(Decoded::Suppressed),
    }
}

fn wind_apparent(body: &[u8]) -> Decoded {
    Decoded::Event(Message::WindApparent {
        aws: nan_u16(u16le(body, 0)) * 0.01,
        awa: angle16(u16le(body, 2)),
        aws_lo: f64::from(body[4]) * 0.01,
    })
}

fn depth(body: &[u8]) -> Decoded {
    // Idle body while the transducer is absent or asleep.
    if body == [0xff, 0xff, 0x00, 0x00] {
        return Decoded::Event(Message::Depth {
            depth: f64::NAN,
            stw: f64::NAN,
        });
    }
    Decoded::Event(Message::Depth {
        depth: nan_u16(u16le(body, 0)) * 0.01,
        stw: nan_u16(u16le(body, 2)) * 0.001,
    })
}

fn gps_position(body: &[u8]) -> Decoded {
    // The gateway fakes this body until the receiver has a fix. The
    // elevation byte holds filler then, so it is NaN'd along with the
    // coordinates.
    if body[..6].iter().all(|&b| b == 0) {
        return Decoded::Event(Message::GpsPosition {
            lat: Coordinate::NAN,
            lon: Coordinate::NAN,
            elevation: f64::NAN,
        });
    }
    Decoded::Event(Message::GpsPosition {
        lat: Coordinate::new(f64::from(body[0]), f64::from(u16le(body, 1)) * 0.001),
        lon: Coordinate::new(f64::from(body[3]), f64::from(u16le(body, 4)) * 0.001),
        elevation: feet_to_meters(f64::from(body[8])),
    })
}

fn gps_cog_sog(body: &[u8]) -> Decoded {
    Decoded::Event(Message::GpsCogSog {
        sog: nan_u16(u16le(body, 0)) * 0.01,
        cog: course16(u16le(body, 2)),
    })
}

fn gps_time(body: &[u8]) -> Decoded {
    if body[..5] == [0xff; 5] {
        return Decoded::Event(Message::GpsTime { utctime: None });
    }

    let (hour, minute, second) = (body[0], body[1], body[2]);
    let (day, month) = (body[3], body[4]);
    let year = 1992 + i32::from(u16le(body, 5));

    // The year field is 16 bits on the wire but only the low byte has
    // ever been seen in use; the bound catches the rest going rogue.
    if year <= 1992 || year >= 2150 {
        debug!("gps_time year {} outside sanity bounds", year);
        return Decoded::Event(Message::GpsTime { utctime: None });
    }

    let utctime = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day)).and_then(|d| {
        d.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
    });
    if utctime.is_none() {
        debug!(
            "gps_time fields do not form a date: {}-{}-{} {}:{}:{}",
            year, month, day, hour, minute, second
        );
    }
    Decoded::Event(Message::GpsTime { utctime })
}

fn environment(body: &[u8]) -> Decoded {
    // Idle body while the barometer is warming up.
    if body == [0xff, 0xff, 0xff, 0x40, 0xbf] {
        return Decoded::Suppressed;
    }

    let mut faults = Vec::new();
    if body[2] != 0xff {
        faults.push(format!("spacer is 0x{:02x}, expected 0xff", body[2]));
    }
    if body[3] != 0x00 {
        faults.push(format!("null is 0x{:02x}, expected 0x00", body[3]));
    }

    let temp_f = f64::from(body[4]);
    Decoded::Event(Message::Environment {
        airpressure: f64::from(u16le(body, 0)) * 0.01,
        temp_f,
        temp_c: fahrenheit_to_celsius(temp_f),
        fault: if faults.is_empty() {
            None
        } else {
            Some(faults.join("; "))
        },
    })
}

/// Static-body classes: the known constant is suppressed, anything
/// else becomes an observable fault event.
fn constant_body(class: MessageClass, body: &[u8], known: &[&[u8]]) -> Decoded {
    if known.iter().any(|k| *k == body) {
        Decoded::Suppressed
    } else {
        fault(class, body, "non-static body seen")
    }
}

fn fault(class: MessageClass, body: &[u8], what: &str) -> Decoded {
    Decoded::Event(Message::Fault {
        class,
        body: body.to_vec(),
        detail: format!("{} (got {})", what, hex::encode(body)),
    })
}

fn assumption(class: MessageClass, body: &[u8], what: &str) -> DecodeError {
    DecodeError::AssumptionViolation {
        class: class.name(),
        detail: format!("{} (got {})", what, hex::encode(body)),
    }
}

/// Pack a wall clock into a `gps_time` frame, inverse of the decoder.
/// The penultimate byte is the suspected checksum, which nothing can
/// compute yet; 0xff stands in for it.
pub fn pack_gps_time(ts: &NaiveDateTime) -> [u8; 12] {
    use chrono::{Datelike, Timelike};
    let year = (ts.year() - 1992) as u16;
    let [year_lo, year_hi] = year.to_le_bytes();
    [
        0x24,
        0x07,
        0x23,
        ts.hour() as u8,
        ts.minute() as u8,
        ts.second() as u8,
        ts.day() as u8,
        ts.month() as u8,
        year_lo,
        year_hi,
        0xff,
        TRAILER,
    ]
}
