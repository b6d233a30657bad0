//! The FDX message classes and the decoded messages they produce.
//!
//! The protocol is reverse-engineered from USB captures of a GND10
//! gateway on a Nexus-instrumented sailboat. Class names and field
//! layouts reflect what the captures show, not any vendor document;
//! several classes are recognized only well enough to be kept out of
//! the output.

use chrono::NaiveDateTime;

use crate::measure::{Coordinate, Quantity};

/// The constant byte terminating every frame. Also appears inside
/// payloads, which is why framing is length-guided.
pub const TRAILER: u8 = 0x81;

/// Smallest possible frame: 3 type bytes, one payload byte, trailer.
pub const MIN_FRAME_LEN: usize = 5;

/// Largest frame any known class declares (plus headroom for unknown
/// ones).
pub const MAX_FRAME_LEN: usize = 24;

/// The set of 24-bit type codes this crate recognizes.
///
/// For every class with a known total length, that length equals
/// `T1 + 5` where `T1` is the middle type byte; the framer leans on
/// this convention when it meets a code not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// `0x000202`. Body is `ff ff 00` or `00 00 00`; anything else is
    /// reported as a fault.
    EmptyHeartbeat,

    /// `0x010405` (9 bytes, 3 Hz). Apparent wind from the masthead
    /// unit, relayed by the gateway.
    ///
    /// With no wind box on the bus (or one that has browned out) the
    /// body is always `ff ff 00 00 00`.
    WindApparent,

    /// `0x020301`. Carries a depth-shaped field that jumps around far
    /// too much to be depth. Kept suppressed until someone works out
    /// what it measures.
    DepthAux,

    /// `0x030102`. All-zero body, roughly once a second.
    ZeroHeartbeat,

    /// `0x070304`. Depth from the DST200 transducer, confirmed against
    /// the onboard display, plus a speed-through-water field.
    Depth,

    /// `0x080109` (1 Hz). Two identical bytes counting down while wind
    /// data is stale.
    WindHeartbeat,

    /// `0x090108`. Same two-equal-bytes shape as `WindHeartbeat`.
    WindSignal,

    /// `0x110213`. Seen while the wind box is stale; content unknown.
    WindStale,

    /// `0x120416`. Near-duplicate of `WindApparent` emitted alongside
    /// it; suppressed to halve the clutter.
    WindDup,

    /// `0x130211`. Periodic GPS-adjacent ping, content unknown.
    GpsPing,

    /// `0x150411`. Gateway housekeeping, content unknown.
    GatewayPulse,

    /// `0x170512`. Static body `00 80 ff ff ff 7f`, every 2 s.
    StaticOne,

    /// `0x1a041e`. Barometer and outside temperature.
    Environment,

    /// `0x1c031f`. Shows up every 40 s or so near wind traffic.
    Wind40s,

    /// `0x200828` (13 bytes). GPS position.
    ///
    /// Pattern: `20 08 28 3b xx c3 0a yy yy e0 00 zz 81`. Before a
    /// fix is attained the body is always
    /// `00 00 00 00 00 00 10 00 10`. Where the fix quality and hdop
    /// live is still unknown.
    GpsPosition,

    /// `0x210425`. Course and speed over ground.
    GpsCogSog,

    /// `0x230526`. Static body `ff ff 00 00 80 80`.
    StaticTwo,

    /// `0x240723` (1 Hz). GPS wall clock.
    ///
    /// Common no-lock bodies: `ff ff ff 00 00 00 10 ef` and
    /// `ff ff ff 00 80 80 10 ef`, alternating during startup. The last
    /// body byte looks like a checksum but has resisted analysis.
    GpsTime,

    /// `0x2c022e`. DST200 housekeeping.
    SounderPulse,

    /// `0x2d0528`. Only seen during gateway service mode.
    Service,

    /// `0x310938`. Unknown wind-adjacent traffic.
    Wind7,

    /// `0x350336`. Unknown wind-adjacent traffic.
    Wind8,

    /// `0x700373`. Two slowly-moving angle-shaped fields.
    Wind3,

    /// Assorted codes seen a handful of times in long dumps, always
    /// with tiny bodies. Length unknown, so the framer falls back to
    /// trailer scanning for these.
    Junk,
}

impl MessageClass {
    /// Looks up a 24-bit type code in the class table.
    pub fn from_code(code: u32) -> Option<MessageClass> {
        use MessageClass::*;
        Some(match code {
            0x000202 => EmptyHeartbeat,
            0x010405 => WindApparent,
            0x020301 => DepthAux,
            0x030102 => ZeroHeartbeat,
            0x070304 => Depth,
            0x080109 => WindHeartbeat,
            0x090108 => WindSignal,
            0x110213 => WindStale,
            0x120416 => WindDup,
            0x130211 => GpsPing,
            0x150411 => GatewayPulse,
            0x170512 => StaticOne,
            0x1a041e => Environment,
            0x1c031f => Wind40s,
            0x200828 => GpsPosition,
            0x210425 => GpsCogSog,
            0x230526 => StaticTwo,
            0x240723 => GpsTime,
            0x2c022e => SounderPulse,
            0x2d0528 => Service,
            0x310938 => Wind7,
            0x350336 => Wind8,
            0x700373 => Wind3,
            0x811504 | 0xb2e000 | 0x0e008f | 0x0c008d | 0xc70a2f | 0xc70a92 => Junk,
            _ => return None,
        })
    }

    /// Total declared frame length, trailer included. `None` for the
    /// junk codes whose length was never pinned down.
    pub fn frame_len(self) -> Option<usize> {
        use MessageClass::*;
        Some(match self {
            EmptyHeartbeat => 7,
            WindApparent | WindDup | GatewayPulse | Environment | GpsCogSog => 9,
            DepthAux | Depth | Wind40s | Wind8 | Wind3 => 8,
            ZeroHeartbeat | WindHeartbeat | WindSignal => 6,
            WindStale | GpsPing | SounderPulse => 7,
            StaticOne | StaticTwo | Service => 10,
            GpsPosition => 13,
            GpsTime => 12,
            Wind7 => 14,
            Junk => return None,
        })
    }

    /// Stable identifier used in output tagging and log lines.
    pub fn name(self) -> &'static str {
        use MessageClass::*;
        match self {
            EmptyHeartbeat => "empty_heartbeat",
            WindApparent => "wind_apparent",
            DepthAux => "depth_aux",
            ZeroHeartbeat => "zero_heartbeat",
            Depth => "depth",
            WindHeartbeat => "wind_heartbeat",
            WindSignal => "wind_signal",
            WindStale => "wind_stale",
            WindDup => "wind_dup",
            GpsPing => "gps_ping",
            GatewayPulse => "gateway_pulse",
            StaticOne => "static_one",
            Environment => "environment",
            Wind40s => "wind_40s",
            GpsPosition => "gps_position",
            GpsCogSog => "gps_cog_sog",
            StaticTwo => "static_two",
            GpsTime => "gps_time",
            SounderPulse => "sounder_pulse",
            Service => "service",
            Wind7 => "wind_7",
            Wind8 => "wind_8",
            Wind3 => "wind_3",
            Junk => "junk",
        }
    }
}

/// A decoded, non-suppressed message: one event handed downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Apparent wind relative to the vessel.
    WindApparent {
        /// Apparent wind angle, degrees in `[0, 360)`.
        awa: f64,
        /// Apparent wind speed, knots.
        aws: f64,
        /// Secondary wind speed field, knots. Tracks `aws` but at
        /// lower resolution; believed to come from the other bus.
        aws_lo: f64,
    },

    /// Depth below transducer and speed through water.
    Depth {
        /// Meters.
        depth: f64,
        /// Knots, from the paddlewheel.
        stw: f64,
    },

    /// GPS position fix.
    GpsPosition {
        lat: Coordinate,
        lon: Coordinate,
        /// Antenna elevation, meters.
        elevation: f64,
    },

    /// GPS course and speed over ground.
    GpsCogSog {
        /// Degrees true. NaN while the receiver has no lock.
        cog: f64,
        /// Knots.
        sog: f64,
    },

    /// GPS wall clock. `None` while the receiver has no time lock or
    /// the field contents fail the calendar sanity bounds.
    GpsTime { utctime: Option<NaiveDateTime> },

    /// Barometric pressure and outside temperature.
    Environment {
        /// Hectopascals.
        airpressure: f64,
        /// Degrees Fahrenheit, as carried on the wire.
        temp_f: f64,
        /// Degrees Celsius.
        temp_c: f64,
        /// Set when one of the documented-constant spacer bytes held
        /// something else.
        fault: Option<String>,
    },

    /// A class whose body is documented constant carried something
    /// else. Observability event, not an error: the stream stays up.
    Fault {
        class: MessageClass,
        body: Vec<u8>,
        detail: String,
    },
}

impl Message {
    pub fn class(&self) -> MessageClass {
        match self {
            Message::WindApparent { .. } => MessageClass::WindApparent,
            Message::Depth { .. } => MessageClass::Depth,
            Message::GpsPosition { .. } => MessageClass::GpsPosition,
            Message::GpsCogSog { .. } => MessageClass::GpsCogSog,
            Message::GpsTime { .. } => MessageClass::GpsTime,
            Message::Environment { .. } => MessageClass::Environment,
            Message::Fault { class, .. } => *class,
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class().name()
    }

    /// The measurements this message carries, as stable-keyed labeled
    /// quantities. This is the generic view the JSON formatter uses;
    /// unit-aware formatters match on the enum directly.
    pub fn measurements(&self) -> Vec<(&'static str, Quantity)> {
        match self {
            Message::WindApparent { awa, aws, aws_lo } => vec![
                ("awa", Quantity::Degrees(*awa)),
                ("aws", Quantity::Knots(*aws)),
                ("aws_lo", Quantity::Knots(*aws_lo)),
            ],
            Message::Depth { depth, stw } => vec![
                ("depth", Quantity::Meters(*depth)),
                ("stw", Quantity::Knots(*stw)),
            ],
            Message::GpsPosition {
                lat,
                lon,
                elevation,
            } => vec![
                ("lat", Quantity::Position(*lat)),
                ("lon", Quantity::Position(*lon)),
                ("elevation", Quantity::Meters(*elevation)),
            ],
            Message::GpsCogSog { cog, sog } => vec![
                ("cog", Quantity::Degrees(*cog)),
                ("sog", Quantity::Knots(*sog)),
            ],
            Message::GpsTime { utctime } => {
                vec![("utctime", Quantity::Timestamp(*utctime))]
            }
            Message::Environment {
                airpressure,
                temp_f,
                temp_c,
                fault,
            } => {
                let mut m = vec![
                    ("airpressure", Quantity::Hectopascals(*airpressure)),
                    ("temp_f", Quantity::Scalar(*temp_f)),
                    ("temp_c", Quantity::Celsius(*temp_c)),
                ];
                if let Some(fault) = fault {
                    m.push(("fault", Quantity::Text(fault.clone())));
                }
                m
            }
            Message::Fault { detail, .. } => {
                vec![("fault", Quantity::Text(detail.clone()))]
            }
        }
    }
}
