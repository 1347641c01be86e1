//! Frame splitter and prefix decoder vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;

use chatbot_core::protocol::frame::{decode_frame, split_frames, Frame};

use vector_loader::load;

#[test]
fn decode_vectors() {
    let files = [
        "frame_connect.json",
        "frame_ping.json",
        "frame_message.json",
        "frame_message_hex.json",
        "frame_unknown_prefix.json",
        "frame_not_utf8.json",
        "frame_prefix_not_leading.json",
    ];

    for f in files {
        let v = load(f);
        let raw = v.frame.decode();
        let res = decode_frame(&raw);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let frame = res.expect("expected ok frame");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(frame.kind(), ex["kind"].as_str().unwrap(), "vector={}", v.description);
        if let Frame::Message(payload) = &frame {
            assert_eq!(payload, ex["payload"].as_str().unwrap(), "vector={}", v.description);
        }
    }
}

#[test]
fn split_vectors() {
    let files = [
        "split_single.json",
        "split_two.json",
        "split_short_frames.json",
        "split_hex.json",
        "split_empty.json",
    ];

    for f in files {
        let v = load(f);
        let body = Bytes::from(v.frame.decode());
        let ex = v.expect.expect("missing expect block");

        let got: Vec<String> = split_frames(body)
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect();
        let want: Vec<String> = ex["frames"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap().to_owned())
            .collect();

        assert_eq!(got, want, "vector={}", v.description);
    }
}

#[test]
fn n_long_frames_survive_and_short_ones_do_not() {
    let long = r#"4:::{"event":"join","data":"{}"}"#;
    let n = 5;

    let mut body = String::new();
    for _ in 0..n {
        body.push('\u{fffd}');
        body.push_str("31");
        body.push('\u{fffd}');
        body.push_str(long);
    }
    assert_eq!(split_frames(Bytes::from(body.clone())).count(), n);

    body.push('\u{fffd}');
    body.push_str("8::");
    assert_eq!(split_frames(Bytes::from(body)).count(), n);
}

#[test]
fn every_prefix_decodes_to_its_variant() {
    assert_eq!(decode_frame(b"1::").unwrap(), Frame::Connect);
    assert_eq!(decode_frame(b"8::").unwrap(), Frame::Ping);
    assert_eq!(
        decode_frame(b"4:::{\"event\":\"x\"}").unwrap(),
        Frame::Message("{\"event\":\"x\"}".into())
    );
    assert_eq!(decode_frame(b"4:::").unwrap(), Frame::Message(String::new()));
}

#[test]
fn split_then_decode_pipeline() {
    let body = "\u{fffd}40\u{fffd}4:::{\"event\":\"join\",\"data\":\"{}\"}\u{fffd}3\u{fffd}8::";
    let frames: Vec<Frame> = split_frames(Bytes::from(body))
        .filter_map(|raw| decode_frame(&raw).ok())
        .collect();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].kind(), "message");
}
