// Copyright (c) 2024 Mike Tsao

use crate::{
    traits::HasDuration,
    types::{
        check_f64_in, check_key, check_positive_f64, duration_to_string, key_name_with_octave,
        quantized, NotationError, Result, KEY_MAX,
    },
};
use core::fmt::{self, Display};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A [Tone] is a single played note, or a rest if it has no key. It knows
/// which key it's playing (a MIDI key value), how long it lasts in whole
/// notes, and how hard the key was struck.
///
/// Every way of creating or changing a [Tone] validates its input, so a
/// [Tone] is always internally consistent.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate", error = "NotationError"))]
#[serde(rename_all = "kebab-case", try_from = "RawTone")]
pub struct Tone {
    /// The MIDI key code, or None for a rest.
    #[builder(default, setter(strip_option))]
    key_no: Option<u8>,

    /// Length in whole notes. 1.0 is a whole note, 0.75 a dotted half.
    duration: f64,

    /// How hard the key is struck, 0.0..=1.0.
    #[builder(default = "Tone::DEFAULT_VELOCITY")]
    velocity: f64,
}
impl Tone {
    /// The velocity a [ToneBuilder] uses when none is given.
    pub const DEFAULT_VELOCITY: f64 = 1.0;

    /// Creates a [Tone]. A `key_no` of None makes it a rest.
    ///
    /// ```
    /// use partitura::prelude::*;
    ///
    /// let tone = Tone::new(Some(40), 1.0 / 2.0, 0.77).unwrap();
    /// assert_eq!(tone.key_no(), Some(40));
    /// assert!(Tone::new(Some(128), 0.5, 0.77).is_err());
    /// ```
    pub fn new(key_no: Option<i32>, duration: f64, velocity: f64) -> Result<Self> {
        Ok(Self {
            key_no: Self::check_key_no(key_no)?,
            duration: check_positive_f64("duration", duration)?,
            velocity: Self::check_velocity(velocity)?,
        })
    }

    /// Creates a pitched [Tone].
    pub fn note(key_no: i32, duration: f64, velocity: f64) -> Result<Self> {
        Self::new(Some(key_no), duration, velocity)
    }

    /// Creates a rest.
    pub fn rest(duration: f64, velocity: f64) -> Result<Self> {
        Self::new(None, duration, velocity)
    }

    /// The MIDI key, or None if this is a rest.
    pub fn key_no(&self) -> Option<u8> {
        self.key_no
    }

    /// Length in whole notes.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[allow(missing_docs)]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// True if this tone is silent.
    pub fn is_rest(&self) -> bool {
        self.key_no.is_none()
    }

    /// Sets the key. None turns the tone into a rest. Leaves the tone
    /// unchanged on error.
    pub fn set_key_no(&mut self, key_no: Option<i32>) -> Result<()> {
        self.key_no = Self::check_key_no(key_no)?;
        Ok(())
    }

    /// Sets the duration, which must be a positive number of whole notes.
    pub fn set_duration(&mut self, duration: f64) -> Result<()> {
        self.duration = check_positive_f64("duration", duration)?;
        Ok(())
    }

    /// Sets the velocity, which must be in 0.0..=1.0.
    pub fn set_velocity(&mut self, velocity: f64) -> Result<()> {
        self.velocity = Self::check_velocity(velocity)?;
        Ok(())
    }

    /// Returns a copy shifted by `n_semitones`. Rests come back unchanged.
    pub(crate) fn transposed(&self, n_semitones: i32) -> Result<Self> {
        let key_no = match self.key_no {
            Some(key_no) => {
                let shifted = (key_no as i32).checked_add(n_semitones).ok_or_else(|| {
                    NotationError::value(
                        "key number",
                        format!("{key_no}{n_semitones:+}"),
                        "must be between 0 and 127",
                    )
                })?;
                Some(check_key(shifted)?)
            }
            None => None,
        };
        Ok(Self {
            key_no,
            ..self.clone()
        })
    }

    /// Returns a copy whose duration is multiplied by `coef`.
    pub(crate) fn scaled(&self, coef: f64) -> Result<Self> {
        Ok(Self {
            duration: check_positive_f64("scaled duration", self.duration * coef)?,
            ..self.clone()
        })
    }

    /// Returns a copy whose duration is snapped to a multiple of `quantum`.
    pub(crate) fn quantized(&self, quantum: f64) -> Result<Self> {
        Ok(Self {
            duration: check_positive_f64(
                "quantized duration",
                quantized(self.duration, quantum),
            )?,
            ..self.clone()
        })
    }

    fn check_key_no(key_no: Option<i32>) -> Result<Option<u8>> {
        key_no.map(check_key).transpose()
    }

    fn check_velocity(velocity: f64) -> Result<f64> {
        check_f64_in(
            "velocity",
            velocity,
            0.0..=1.0,
            "must be between 0.0 and 1.0",
        )
    }
}
impl HasDuration for Tone {
    fn duration(&self) -> f64 {
        self.duration
    }
}
impl Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_no {
            Some(key_no) => f.write_str(&key_name_with_octave(key_no))?,
            None => f.write_str("rest")?,
        }
        write!(
            f,
            " {} @{:.2}",
            duration_to_string(self.duration),
            self.velocity
        )
    }
}
impl ToneBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(Some(key_no)) = self.key_no {
            if key_no > KEY_MAX {
                return Err(NotationError::value(
                    "key number",
                    key_no,
                    "must be between 0 and 127",
                ));
            }
        }
        if let Some(duration) = self.duration {
            check_positive_f64("duration", duration)?;
        }
        if let Some(velocity) = self.velocity {
            Tone::check_velocity(velocity)?;
        }
        Ok(())
    }
}

// The shape a [Tone] takes on the wire. Deserializing goes through
// [Tone::new] so that stored data gets the same validation as live edits.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawTone {
    #[serde(default)]
    key_no: Option<i32>,
    duration: f64,
    velocity: f64,
}
impl TryFrom<RawTone> for Tone {
    type Error = NotationError;

    fn try_from(value: RawTone) -> Result<Self> {
        Tone::new(value.key_no, value.duration, value.velocity)
    }
}
