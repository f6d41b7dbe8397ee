//! Fuzz target for detections JSON parsing and validation.
//!
//! Run with:
//!   cargo +nightly fuzz run detections_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use pdflayout::layout::io_json::from_json_str;
use pdflayout::validation::validate_document;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(document) = from_json_str(text) {
        let _ = validate_document(&document);
    }
});
