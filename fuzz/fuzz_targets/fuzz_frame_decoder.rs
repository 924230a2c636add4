//! Fuzz target: `mesh::decode`
//!
//! Drives arbitrary payloads into the text frame decoder and asserts that
//! it never panics and that anything it accepts re-encodes to a message
//! that decodes identically.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use meshnag::mesh::{MAX_FRAME_LEN, decode, encode};

fuzz_target!(|data: &[u8]| {
    let Ok(decoded) = decode(data) else {
        return;
    };

    let payload = encode(&decoded.message);
    assert!(payload.len() <= MAX_FRAME_LEN, "re-encoded frame too long");

    let again = decode(&payload).expect("own encoding must decode");
    assert_eq!(again.message, decoded.message);
});
