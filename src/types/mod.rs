// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ErrorKind, NotationError, NoteValue, Tempo};
}

pub use {
    error::{ErrorKind, NotationError, Result},
    pitch::{check_key, key_name, key_name_with_octave, KEY_MAX, KEY_MIN, KEY_REFERENCE},
    time::{NoteValue, Tempo},
    uid::{IsUid, UidFactory},
};

pub(crate) use {
    error::{check_f64_in, check_positive_f64},
    time::{duration_to_string, quantized},
};

mod error;
mod pitch;
mod time;
mod uid;
