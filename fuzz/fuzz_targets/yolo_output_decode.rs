//! Fuzz target for YOLOv8 head decoding.
//!
//! The first two bytes pick the class and anchor counts; the rest is read as
//! little-endian f32 values, so NaN and infinite scores and boxes show up.
//!
//! Run with:
//!   cargo +nightly fuzz run yolo_output_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use pdflayout::model::backend::RawOutput;
use pdflayout::model::yolo::{decode_output, YoloConfig};

fuzz_target!(|data: &[u8]| {
    let [classes, anchors, rest @ ..] = data else {
        return;
    };
    let features = 4 + usize::from(*classes % 16) + 1;
    let anchors = usize::from(*anchors) + 1;

    let values: Vec<f32> = rest
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    if values.len() < features * anchors {
        return;
    }

    let output = RawOutput {
        shape: vec![1, features, anchors],
        data: values[..features * anchors].to_vec(),
    };
    let _ = decode_output(&output, &YoloConfig::default());
});
