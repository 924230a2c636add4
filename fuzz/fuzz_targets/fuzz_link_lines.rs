//! Fuzz target: serial link line handling
//!
//! Streams arbitrary bytes through the line splitter and parses every line
//! it yields.  Lines never exceed the buffer and parsing never panics.
//!
//! cargo fuzz run fuzz_link_lines

#![no_main]

use libfuzzer_sys::fuzz_target;
use meshnag::adapters::serial_link::{LINE_MAX, LineSplitter, parse_line};

fuzz_target!(|data: &[u8]| {
    let mut splitter = LineSplitter::new();
    for &byte in data {
        if let Some(line) = splitter.feed(byte) {
            assert!(!line.is_empty() && line.len() <= LINE_MAX);
            assert!(!line.contains(&b'\n'));
            if let Some((_, payload)) = parse_line(&line) {
                assert!(!payload.is_empty());
            }
        }
    }
});
