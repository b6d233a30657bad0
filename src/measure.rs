//! Physical quantities and the unit conversions the wire format calls
//! for.
//!
//! Sentinel wire values ("no reading") decode to [`f64::NAN`]; NaN is a
//! first-class measurement state throughout the crate and serializes as
//! `null`.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// A geographic coordinate, stored as whole degrees plus decimal
/// minutes the way the wire carries it.
///
/// The protocol encodes no hemisphere; values are taken as north/east,
/// which matches every capture seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub degree: f64,
    pub minute: f64,
}

impl Coordinate {
    /// The "no fix" coordinate.
    pub const NAN: Coordinate = Coordinate {
        degree: f64::NAN,
        minute: f64::NAN,
    };

    pub fn new(degree: f64, minute: f64) -> Coordinate {
        Coordinate { degree, minute }
    }

    pub fn decimal_degrees(&self) -> f64 {
        self.degree + self.minute / 60.0
    }

    pub fn is_nan(&self) -> bool {
        self.degree.is_nan() || self.minute.is_nan()
    }
}

impl Serialize for Coordinate {
    /// Serializes as decimal degrees (`null` without a fix).
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.decimal_degrees())
    }
}

/// A measurement value with its physical unit.
///
/// Untagged on the wire: formatters that need the unit match on the
/// variant, serialization emits the bare number (or string).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quantity {
    /// Dimensionless decimal value.
    Scalar(f64),
    Degrees(f64),
    Radians(f64),
    Knots(f64),
    MetersPerSecond(f64),
    Meters(f64),
    Hectopascals(f64),
    Celsius(f64),
    Kelvin(f64),
    /// Geographic coordinate; serializes as decimal degrees.
    Position(Coordinate),
    /// UTC wall clock; `None` when the instrument has no time lock.
    Timestamp(Option<NaiveDateTime>),
    /// Free-form annotation, used for fault bodies.
    Text(String),
}

/// knots => m/s
pub fn knots_to_ms(knots: f64) -> f64 {
    knots * (1852.0 / 3600.0)
}

pub fn fahrenheit_to_celsius(temp: f64) -> f64 {
    (temp - 32.0) * (5.0 / 9.0)
}

pub fn fahrenheit_to_kelvin(temp: f64) -> f64 {
    (temp + 459.67) * (5.0 / 9.0)
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * 0.3048
}

/// u16 field with the all-ones "no reading" sentinel.
pub fn nan_u16(raw: u16) -> f64 {
    if raw == u16::MAX {
        f64::NAN
    } else {
        f64::from(raw)
    }
}

/// 16-bit angle, full scale 360 degrees. Both 0 and all-ones are
/// sentinels for "no reading".
pub fn angle16(raw: u16) -> f64 {
    if raw == 0 || raw == u16::MAX {
        f64::NAN
    } else {
        f64::from(raw) * (360.0 / 65536.0)
    }
}

/// 16-bit course angle. Same sentinels as [`angle16`] but offset by one
/// degree, which is what the reference captures calibrate to.
pub fn course16(raw: u16) -> f64 {
    if raw == 0 || raw == u16::MAX {
        f64::NAN
    } else {
        f64::from(raw) * (360.0 / 65536.0) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knots() {
        assert_eq!(knots_to_ms(10.0), 5.144444444444445);
        assert_eq!(knots_to_ms(1.0), 1852.0 / 3600.0);
    }

    #[test]
    fn fahrenheit() {
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert_eq!(fahrenheit_to_kelvin(69.8), (69.8 + 459.67) * (5.0 / 9.0));
        assert!((fahrenheit_to_kelvin(32.0) - 273.15).abs() < 1e-9);
    }

    #[test]
    fn feet() {
        assert_eq!(feet_to_meters(66.0), 20.1168);
    }

    #[test]
    fn sentinels() {
        assert!(nan_u16(0xffff).is_nan());
        assert_eq!(nan_u16(268), 268.0);

        assert!(angle16(0).is_nan());
        assert!(angle16(0xffff).is_nan());
        assert!(angle16(0x8000) == 180.0);

        assert!(course16(0).is_nan());
        assert!(course16(0xffff).is_nan());
        assert_eq!(course16(0x7e66), 176.747802734375);
    }

    #[test]
    fn coordinate() {
        let lat = Coordinate::new(59.0, 49.953);
        assert!((lat.decimal_degrees() - 59.83255).abs() < 1e-9);
        assert!(Coordinate::NAN.is_nan());
        assert!(Coordinate::NAN.decimal_degrees().is_nan());
    }
}
