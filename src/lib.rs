// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Partitura models a musical work as a hierarchy of timed note events, and
//! provides the structural edits a score editor needs.
//!
//! * A [Tone](composition::Tone) is one note or rest: an optional MIDI key, a
//! duration in whole notes, and a velocity.
//! * A [ChordSlot](composition::ChordSlot) is one moment in a pattern, holding
//! every tone that sounds then, lowest first.
//! * A [Pattern](composition::Pattern) is a sequence of chord slots for one
//! instrument, starting at some bar. It can be transposed, scaled in time, and
//! quantized, and tones can be appended, inserted into chords, and deleted.
//! * A [MusicalWork] owns the patterns along with the name, author, and tempo
//! of the piece.
//!
//! ```
//! use partitura::prelude::*;
//!
//! let mut work = MusicalWork::new("Sonatina No.6", Some("Mozart"), 140).unwrap();
//! let pattern = work.add_pattern();
//! pattern.append_tone(Tone::note(40, 0.5, 0.45).unwrap());
//! pattern.append_tone(Tone::note(40, 0.5, 0.55).unwrap());
//! pattern.insert_tone(Tone::note(44, 0.5, 0.55).unwrap(), 1).unwrap();
//! pattern.transpose(3).unwrap();
//! pattern.scale(0.5).unwrap();
//! assert_eq!(pattern.slot(1).unwrap().tones()[1].key_no(), Some(47));
//! ```
//!
//! Every operation validates its input and reports problems as a
//! [NotationError](types::NotationError). Nothing is ever left half-edited.

/// A collection of imports that are useful to users of this crate. `use
/// partitura::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        composition::prelude::*, traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {composition::MusicalWork, types::Result};

pub mod composition;
pub mod traits;
pub mod types;
pub mod util;
