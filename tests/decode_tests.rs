use fdxread::*;

fn from_hex(s: &str) -> Vec<u8> {
    hex::decode(s.replace(' ', "")).unwrap()
}

fn decode_event(s: &str) -> Message {
    match decode(&from_hex(s)).unwrap() {
        Decoded::Event(msg) => msg,
        Decoded::Suppressed => panic!("unexpectedly suppressed: {}", s),
    }
}

#[test]
fn decode_gps_time() {
    match decode_event("24 07 23 0f 1b 17 11 08 18 00 02 81") {
        Message::GpsTime { utctime: Some(ts) } => {
            assert_eq!(
                ts,
                chrono::NaiveDate::from_ymd_opt(2016, 8, 17)
                    .unwrap()
                    .and_hms_opt(15, 27, 23)
                    .unwrap()
            );
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_gps_position_lock() {
    match decode_event("20 08 28 3b 21 c3 0a ff 8e e0 00 42 81") {
        Message::GpsPosition { lat, lon, .. } => {
            assert!((lat.decimal_degrees() - 59.83255).abs() < 1e-7);
            assert!((lon.decimal_degrees() - 10.61011666).abs() < 1e-7);
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_gps_position_no_lock() {
    match decode_event("20 08 28 00 00 00 00 00 00 10 00 10 81") {
        Message::GpsPosition { lat, lon, .. } => {
            assert!(lat.is_nan());
            assert!(lon.is_nan());
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_cog_sog_moving() {
    match decode_event("21 04 25 0c 01 66 7e 15 81") {
        Message::GpsCogSog { cog, sog } => {
            assert!((cog - 176.74).abs() < 0.01);
            assert_eq!(sog, 2.68);
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_cog_sog_no_lock() {
    match decode_event("21 04 25 ff ff 00 00 00 81") {
        Message::GpsCogSog { cog, sog } => {
            assert!(cog.is_nan());
            assert!(sog.is_nan());
        }
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_wind_apparent() {
    match decode_event("01 04 05 be 00 96 b9 91 81") {
        Message::WindApparent { awa, aws, .. } => {
            assert!(aws > 0.0);
            assert!(awa.is_finite());
            assert!((0.0..360.0).contains(&awa));
        }
        other => panic!("{:?}", other),
    }

    match decode_event("01 04 05 ff ff 00 00 00 81") {
        Message::WindApparent { aws, .. } => assert!(aws.is_nan()),
        other => panic!("{:?}", other),
    }
}

#[test]
fn decode_depth() {
    match decode_event("07 03 04 0f 02 00 0d 81") {
        Message::Depth { depth, stw } => {
            assert!(depth > 0.0);
            assert!(stw < 30.0);
        }
        other => panic!("{:?}", other),
    }

    match decode_event("07 03 04 ff ff 00 00 81") {
        Message::Depth { depth, .. } => assert!(depth.is_nan()),
        other => panic!("{:?}", other),
    }
}

#[test]
fn short_frames_are_rejected() {
    assert_eq!(decode(&[0x81]), Err(DecodeError::ShortFrame { len: 1 }));
    assert_eq!(
        decode(&[0x81, 0x81]),
        Err(DecodeError::ShortFrame { len: 2 })
    );
}

#[test]
fn framer_discards_garbage_and_keeps_order() {
    // Noise, then two valid frames; the frames must come out in input
    // order with the noise gone.
    let mut framer = Framer::new();
    let noise: Vec<u8> = (0u8..200).map(|i| 0x30 + (i % 9)).collect();
    assert!(!noise.contains(&0x81));

    let frame2 = from_hex("21 04 25 0c 01 66 7e 15 81");
    let frame1 = from_hex("24 07 23 0f 1b 17 11 08 18 00 02 81");

    framer.push(&noise);
    framer.push(&frame2);
    framer.push(&frame1);

    let mut frames = Vec::new();
    while let Some(f) = framer.pull() {
        frames.push(f);
    }
    assert_eq!(frames, vec![frame2, frame1]);
}

#[test]
fn framer_only_emits_trailer_terminated_frames() {
    let mut framer = Framer::new();
    let mut stream = from_hex("ff 00 aa 55 13");
    stream.extend(from_hex("01 04 05 be 00 96 b9 91 81"));
    stream.extend(from_hex("07 03 04 0f 02 00 0d 81"));
    framer.push(&stream);
    let mut n = 0;
    while let Some(frame) = framer.pull() {
        assert_eq!(*frame.last().unwrap(), 0x81);
        n += 1;
    }
    assert!(n >= 2);
}

#[test]
fn sentinel_fields_map_to_nan_and_values_stay_finite() {
    // Each (frame, key) pair with a sentinel in place decodes to NaN;
    // replacing the sentinel yields a finite number.
    let cases = [
        ("07 03 04 ff ff 01 00 81", "depth", "07 03 04 0f 02 01 00 81"),
        (
            "01 04 05 ff ff 96 b9 91 81",
            "aws",
            "01 04 05 be 00 96 b9 91 81",
        ),
        (
            "21 04 25 ff ff 66 7e 00 81",
            "sog",
            "21 04 25 0c 01 66 7e 00 81",
        ),
    ];
    for (nan_frame, key, finite_frame) in &cases {
        let lookup = |frame: &str| -> f64 {
            let msg = decode_event(frame);
            msg.measurements()
                .into_iter()
                .find(|(k, _)| k == key)
                .map(|(_, q)| match q {
                    Quantity::Knots(v) | Quantity::Meters(v) | Quantity::Degrees(v) => v,
                    other => panic!("{:?}", other),
                })
                .unwrap()
        };
        assert!(lookup(nan_frame).is_nan(), "{} {}", nan_frame, key);
        assert!(lookup(finite_frame).is_finite(), "{} {}", finite_frame, key);
    }
}

#[test]
fn unknown_class_is_classified() {
    assert_eq!(
        decode(&from_hex("99 02 99 aa bb cc 81")),
        Err(DecodeError::UnhandledClass {
            code: 0x990299,
            len: 7
        })
    );
}
