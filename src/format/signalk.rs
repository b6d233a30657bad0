//! Structured delta output with dotted hierarchical paths and SI
//! units, as consumed by Signal K-style aggregators: angles in
//! radians, speeds in m/s, temperature in Kelvin, pressure in Pascal.

use serde_json::{json, Value};

use crate::format::Formatter;
use crate::measure::{fahrenheit_to_kelvin, knots_to_ms};
use crate::message::Message;

pub struct SignalkDelta;

impl SignalkDelta {
    pub fn new() -> SignalkDelta {
        SignalkDelta
    }

    fn values(msg: &Message) -> Vec<(&'static str, Value)> {
        fn put(values: &mut Vec<(&'static str, Value)>, path: &'static str, v: f64) {
            if v.is_finite() {
                values.push((path, json!(v)));
            }
        }

        let mut values = Vec::new();
        match msg {
            Message::WindApparent { awa, aws, .. } => {
                put(&mut values, "environment.wind.angleApparent", awa.to_radians());
                put(&mut values, "environment.wind.speedApparent", knots_to_ms(*aws));
            }
            Message::Depth { depth, stw } => {
                put(&mut values, "environment.depth.belowTransducer", *depth);
                put(&mut values, "navigation.speedThroughWater", knots_to_ms(*stw));
            }
            Message::GpsPosition {
                lat,
                lon,
                elevation,
            } => {
                if !lat.is_nan() && !lon.is_nan() {
                    values.push((
                        "navigation.position",
                        json!({
                            "latitude": lat.decimal_degrees(),
                            "longitude": lon.decimal_degrees(),
                        }),
                    ));
                }
                if elevation.is_finite() {
                    values.push(("navigation.gnss.antennaAltitude", json!(elevation)));
                }
            }
            Message::GpsCogSog { cog, sog } => {
                put(&mut values, "navigation.courseOverGroundTrue", cog.to_radians());
                put(&mut values, "navigation.speedOverGround", knots_to_ms(*sog));
            }
            Message::GpsTime { utctime: Some(ts) } => {
                values.push((
                    "navigation.datetime",
                    json!(format!("{}Z", ts.format("%Y-%m-%dT%H:%M:%S"))),
                ));
            }
            Message::GpsTime { utctime: None } => {}
            Message::Environment {
                airpressure,
                temp_f,
                ..
            } => {
                put(&mut values, "environment.outside.pressure", airpressure * 100.0);
                put(
                    &mut values,
                    "environment.outside.temperature",
                    fahrenheit_to_kelvin(*temp_f),
                );
            }
            Message::Fault { .. } => {}
        }
        values
    }
}

impl Default for SignalkDelta {
    fn default() -> SignalkDelta {
        SignalkDelta::new()
    }
}

impl Formatter for SignalkDelta {
    fn format(&mut self, msg: &Message) -> Option<String> {
        let values = SignalkDelta::values(msg);
        if values.is_empty() {
            return None;
        }
        let values: Vec<Value> = values
            .into_iter()
            .map(|(path, value)| json!({ "path": path, "value": value }))
            .collect();
        let delta = json!({
            "updates": [{
                "source": { "label": "fdxread" },
                "values": values,
            }]
        });
        Some(delta.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Coordinate;

    fn first_value(line: &str) -> (String, serde_json::Value) {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        let v = &parsed["updates"][0]["values"][0];
        (v["path"].as_str().unwrap().to_string(), v["value"].clone())
    }

    #[test]
    fn wind_is_si() {
        let mut f = SignalkDelta::new();
        let line = f
            .format(&Message::WindApparent {
                awa: 180.0,
                aws: 10.0,
                aws_lo: 9.9,
            })
            .unwrap();
        let (path, value) = first_value(&line);
        assert_eq!(path, "environment.wind.angleApparent");
        assert!((value.as_f64().unwrap() - std::f64::consts::PI).abs() < 1e-12);
        assert!(line.contains("environment.wind.speedApparent"));
        assert!(line.contains("5.144444444444445"));
    }

    #[test]
    fn position_is_decimal_degrees() {
        let mut f = SignalkDelta::new();
        let line = f
            .format(&Message::GpsPosition {
                lat: Coordinate::new(59.0, 49.953),
                lon: Coordinate::new(10.0, 36.607),
                elevation: 20.1168,
            })
            .unwrap();
        let (path, value) = first_value(&line);
        assert_eq!(path, "navigation.position");
        assert!((value["latitude"].as_f64().unwrap() - 59.83255).abs() < 1e-7);
    }

    #[test]
    fn nan_produces_no_update() {
        let mut f = SignalkDelta::new();
        assert_eq!(
            f.format(&Message::GpsCogSog {
                cog: f64::NAN,
                sog: f64::NAN,
            }),
            None
        );
    }

    #[test]
    fn pressure_in_pascal_temperature_in_kelvin() {
        let mut f = SignalkDelta::new();
        let line = f
            .format(&Message::Environment {
                airpressure: 101.42,
                temp_f: 69.8,
                temp_c: 21.0,
                fault: None,
            })
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        let values = parsed["updates"][0]["values"].as_array().unwrap();
        let by_path = |p: &str| {
            values
                .iter()
                .find(|v| v["path"] == p)
                .and_then(|v| v["value"].as_f64())
                .unwrap()
        };
        assert!((by_path("environment.outside.pressure") - 10142.0).abs() < 1e-6);
        assert!((by_path("environment.outside.temperature") - 294.15).abs() < 1e-6);
    }
}
