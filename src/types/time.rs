// Copyright (c) 2024 Mike Tsao

//! Musical time: tempo and note durations.
//!
//! Durations are plain `f64`s measured in whole notes, so 1.0 is a whole note,
//! 0.5 a half note, and 0.75 a dotted half.

use super::error::{NotationError, Result};
use core::fmt::{self, Display};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

/// Beats per minute. Always within [Tempo::MIN_VALUE]..=[Tempo::MAX_VALUE].
#[derive(Clone, Copy, Debug, Derivative, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[derivative(Default)]
#[serde(into = "u16")]
pub struct Tempo(#[derivative(Default(value = "120"))] u16);
impl Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{} BPM", self.0))
    }
}
impl Tempo {
    /// The largest value we'll allow.
    pub const MAX_VALUE: u16 = 320;

    /// The smallest value we'll allow.
    pub const MIN_VALUE: u16 = 40;

    /// Creates a [Tempo], failing if `bpm` is out of range.
    pub fn new(bpm: i32) -> Result<Self> {
        if (Self::MIN_VALUE as i32..=Self::MAX_VALUE as i32).contains(&bpm) {
            Ok(Self(bpm as u16))
        } else {
            Err(NotationError::value(
                "tempo",
                bpm,
                "must be between 40 and 320 BPM",
            ))
        }
    }

    /// Beats per minute.
    pub const fn bpm(&self) -> u16 {
        self.0
    }

    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 as f64 / 60.0
    }

    /// MIN..=MAX
    pub const fn range() -> core::ops::RangeInclusive<u16> {
        Self::MIN_VALUE..=Self::MAX_VALUE
    }
}
impl TryFrom<i32> for Tempo {
    type Error = NotationError;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}
impl From<Tempo> for u16 {
    fn from(value: Tempo) -> Self {
        value.0
    }
}
impl<'de> Deserialize<'de> for Tempo {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bpm = i32::deserialize(deserializer)?;
        Tempo::new(bpm).map_err(serde::de::Error::custom)
    }
}

/// [NoteValue] names the common note lengths. Handy as a quantization grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum NoteValue {
    /// breve
    Double,
    /// semibreve
    Whole,
    /// dotted minim
    DottedHalf,
    /// minim
    Half,
    /// dotted crotchet
    DottedQuarter,
    /// crotchet
    #[default]
    Quarter,
    /// quaver
    Eighth,
    /// semiquaver
    Sixteenth,
    /// demisemiquaver
    ThirtySecond,
    /// hemidemisemiquaver
    SixtyFourth,
}
impl NoteValue {
    /// The length of this note value, in whole notes.
    pub const fn duration(&self) -> f64 {
        match self {
            NoteValue::Double => 2.0,
            NoteValue::Whole => 1.0,
            NoteValue::DottedHalf => 0.75,
            NoteValue::Half => 0.5,
            NoteValue::DottedQuarter => 0.375,
            NoteValue::Quarter => 0.25,
            NoteValue::Eighth => 0.125,
            NoteValue::Sixteenth => 0.0625,
            NoteValue::ThirtySecond => 0.03125,
            NoteValue::SixtyFourth => 0.015625,
        }
    }
}
impl From<NoteValue> for f64 {
    fn from(value: NoteValue) -> Self {
        value.duration()
    }
}

/// Snaps `duration` to the nearest whole multiple of `quantum`, never going
/// below one `quantum`. A duration exactly halfway between two multiples
/// goes to the larger one.
pub(crate) fn quantized(duration: f64, quantum: f64) -> f64 {
    let quanta = (duration / quantum + 0.5).floor().max(1.0);
    quanta * quantum
}

/// Renders a duration as a reduced fraction of a whole note when it has a
/// power-of-two denominator no finer than 1/256, falling back to decimal.
pub(crate) fn duration_to_string(duration: f64) -> String {
    let mut denominator: u64 = 1;
    while denominator <= 256 {
        let numerator = duration * denominator as f64;
        if numerator > u64::MAX as f64 {
            break;
        }
        if numerator.fract() == 0.0 {
            let numerator = numerator as u64;
            return if denominator == 1 {
                format!("{numerator}")
            } else {
                format!("{numerator}/{denominator}")
            };
        }
        denominator *= 2;
    }
    format!("{duration}")
}
