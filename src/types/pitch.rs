// Copyright (c) 2024 Mike Tsao

//! MIDI key numbers.
//!
//! There are two different mappings of piano notes to MIDI numbers. They both
//! agree that key 0 is a C, but they otherwise differ by an octave. We use
//! C4=60, which puts the reference key 40 at E2.

use super::error::{NotationError, Result};

/// The lowest valid key number.
pub const KEY_MIN: u8 = 0;
/// The highest valid key number.
pub const KEY_MAX: u8 = 127;
/// The key that the rest of the system treats as its reference octave anchor.
pub const KEY_REFERENCE: u8 = 40;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Checks that `key_no` is a valid MIDI key and narrows it.
pub fn check_key(key_no: i32) -> Result<u8> {
    if (KEY_MIN as i32..=KEY_MAX as i32).contains(&key_no) {
        Ok(key_no as u8)
    } else {
        Err(NotationError::value(
            "key number",
            key_no,
            "must be between 0 and 127",
        ))
    }
}

/// The pitch-class name of a key, e.g. "C#".
pub fn key_name(key_no: u8) -> &'static str {
    NAMES[(key_no % 12) as usize]
}

/// The name of a key including its octave, e.g. "E2" for 40 or "C-1" for 0.
pub fn key_name_with_octave(key_no: u8) -> String {
    let octave = (key_no / 12) as i32 - 1;
    format!("{}{octave}", key_name(key_no))
}
