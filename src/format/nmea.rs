//! NMEA 0183 emission.
//!
//! Rudimentary but sufficient to drive OpenCPN (via kplex in tcp mode)
//! for visualization. Composite sentences (RMC, HDT) wait until both a
//! wall clock and a position have been seen.

use chrono::NaiveDateTime;

use crate::format::Formatter;
use crate::measure::Coordinate;
use crate::message::Message;

/// NMEA 0183 sentence emitter.
pub struct Nmea0183 {
    gpstime: Option<NaiveDateTime>,
    gpspos: Option<(Coordinate, Coordinate)>,
    joinlines: bool,
}

impl Nmea0183 {
    pub fn new() -> Nmea0183 {
        Nmea0183 {
            gpstime: None,
            gpspos: None,
            joinlines: true,
        }
    }

    /// One result line per sentence instead of a CRLF-joined block.
    #[cfg(test)]
    fn separate_lines() -> Nmea0183 {
        Nmea0183 {
            joinlines: false,
            ..Nmea0183::new()
        }
    }

    fn sentences(&mut self, msg: &Message) -> Vec<String> {
        let mut result = Vec::new();
        match msg {
            Message::Depth { depth, stw } => {
                // $--DBT,x.x,f,x.x,M,x.x,F*hh
                if depth.is_finite() {
                    result.push(format!("$SDDBT,,f,{},m,,F", depth));
                }
                // $--VHW,x.x,T,x.x,M,x.x,N,x.x,K*hh
                if stw.is_finite() {
                    result.push(format!("$SDVHW,0.0,T,0.0,M,{:.2},N,0.0,K", stw));
                }
            }

            Message::WindApparent { awa, aws, .. } => {
                // $--MWV,x.x,a,x.x,a*hh
                if awa.is_finite() && aws.is_finite() {
                    result.push(format!(
                        "$FVMWV,{:.2},R,{:.2},K,A", // (R)elative, knots, valid
                        awa, aws
                    ));
                }
            }

            Message::GpsTime {
                utctime: Some(ts), ..
            } => {
                // Held for the next RMC.
                self.gpstime = Some(*ts);
            }
            Message::GpsTime { utctime: None } => {}

            Message::GpsPosition { lat, lon, .. } => {
                if !lat.is_nan() && !lon.is_nan() {
                    self.gpspos = Some((*lat, *lon));
                }
            }

            Message::GpsCogSog { cog, sog } => {
                if let (Some(ts), Some((lat, lon))) = (self.gpstime, self.gpspos) {
                    if cog.is_finite() && sog.is_finite() {
                        result.push(format!(
                            "$GPRMC,{},A,{},N,{},E,{:.2},{:.2},{},0.0,E",
                            ts.format("%H%M%S"),
                            degrees_minutes(&lat),
                            degrees_minutes(&lon),
                            sog,
                            cog,
                            ts.format("%d%m%y"),
                        ));
                        // $--HDT,x.x,T*hh
                        result.push(format!("$GPHDT,{:.2},T", cog));
                    }
                }
            }

            Message::Environment {
                airpressure,
                temp_c,
                ..
            } => {
                // $IIXDR,P,1.02481,B,Barometer*0D
                // $IIXDR,C,19.52,C,TempAir*3D
                result.push(format!("$ZZXDR,P,{:.5},B,Barometer", airpressure));
                result.push(format!("$ZZXDR,C,{:.2},C,TempDir", temp_c));
            }

            Message::Fault { .. } => {}
        }
        result
    }
}

impl Default for Nmea0183 {
    fn default() -> Nmea0183 {
        Nmea0183::new()
    }
}

impl Formatter for Nmea0183 {
    fn format(&mut self, msg: &Message) -> Option<String> {
        let completed: Vec<String> = self
            .sentences(msg)
            .iter()
            .map(|s| checksum(s))
            .collect();
        if completed.is_empty() {
            None
        } else if self.joinlines {
            Some(completed.join("\r\n"))
        } else {
            Some(completed.join("\n"))
        }
    }
}

/// Appends the XOR checksum: `"$" payload "*" hex(xor(payload))`.
pub fn checksum(sentence: &str) -> String {
    debug_assert!(sentence.starts_with('$'));
    let sum = sentence.bytes().skip(1).fold(0u8, |acc, b| acc ^ b);
    format!("{}*{:02X}", sentence, sum)
}

/// Degrees-and-decimal-minutes, the minute part zero-padded to five
/// characters: 54° 6.15′ → `5406.15`.
fn degrees_minutes(c: &Coordinate) -> String {
    format!("{}{:05.2}", c.degree as i64, c.minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn position_formatting() {
        // 54.1024833333° N → 54° 6.15′
        assert_eq!(
            degrees_minutes(&Coordinate::new(54.0, 6.1476)),
            "5406.15"
        );
        assert_eq!(
            degrees_minutes(&Coordinate::new(10.0, 48.474)),
            "1048.47"
        );
    }

    #[test]
    fn rmc_hdt_after_time_and_position() {
        let mut f = Nmea0183::separate_lines();

        // Position alone is silent, and so is the wall clock.
        assert_eq!(
            f.format(&Message::GpsPosition {
                lat: Coordinate::new(54.0, 6.1476),
                lon: Coordinate::new(10.0, 48.474),
                elevation: 0.0,
            }),
            None
        );
        let ts = NaiveDate::from_ymd_opt(2017, 1, 12)
            .unwrap()
            .and_hms_opt(19, 16, 55)
            .unwrap();
        assert_eq!(f.format(&Message::GpsTime { utctime: Some(ts) }), None);

        let out = f
            .format(&Message::GpsCogSog {
                sog: 0.16,
                cog: 344.47058823529414,
            })
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "$GPRMC,191655,A,5406.15,N,1048.47,E,0.16,344.47,120117,0.0,E*47"
        );
        assert_eq!(lines[1], "$GPHDT,344.47,T*05");
    }

    #[test]
    fn cog_sog_without_fix_is_silent() {
        let mut f = Nmea0183::new();
        assert_eq!(
            f.format(&Message::GpsCogSog {
                sog: 0.16,
                cog: 344.47,
            }),
            None
        );
    }

    #[test]
    fn environment_sentences() {
        let mut f = Nmea0183::new();
        let out = f
            .format(&Message::Environment {
                airpressure: 101.42,
                temp_f: 69.8,
                temp_c: 21.0,
                fault: None,
            })
            .unwrap();
        assert_eq!(
            out,
            "$ZZXDR,P,101.42000,B,Barometer*21\r\n$ZZXDR,C,21.00,C,TempDir*10"
        );
    }

    #[test]
    fn nan_values_stay_off_the_wire() {
        let mut f = Nmea0183::new();
        assert_eq!(
            f.format(&Message::WindApparent {
                awa: f64::NAN,
                aws: f64::NAN,
                aws_lo: f64::NAN,
            }),
            None
        );
        assert_eq!(
            f.format(&Message::Depth {
                depth: f64::NAN,
                stw: f64::NAN,
            }),
            None
        );
    }

    #[test]
    fn checksum_matches_known_sentences() {
        assert_eq!(
            checksum("$GPHDT,344.47,T"),
            "$GPHDT,344.47,T*05"
        );
        assert_eq!(
            checksum("$ZZXDR,P,101.42000,B,Barometer"),
            "$ZZXDR,P,101.42000,B,Barometer*21"
        );
    }
}
