// Copyright (c) 2024 Mike Tsao

//! Creation and editing of music scores.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChordSlot, MusicalWork, Pattern, PatternBuilder, PatternUid, SharedMusicalWork, Tone,
        ToneBuilder,
    };
}

pub use chord::*;
pub use pattern::*;
pub use shared::*;
pub use tone::*;
pub use work::*;

mod chord;
mod pattern;
mod shared;
mod tone;
mod work;
