// Copyright (c) 2024 Mike Tsao

use super::Tone;
use crate::{
    traits::HasDuration,
    types::{NotationError, Result},
};
use serde::{Deserialize, Serialize};

/// A [ChordSlot] is one temporal position in a [Pattern](super::Pattern).
/// It holds one or more [Tone]s that sound together, ordered by ascending
/// key with the lowest at index 0. Rests sort below every pitch.
///
/// A [ChordSlot] is never empty. Its owning pattern removes it as soon as
/// its last tone is taken out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tone>", into = "Vec<Tone>")]
pub struct ChordSlot(Vec<Tone>);
impl ChordSlot {
    /// Creates a slot holding just `tone`.
    pub fn new_with(tone: Tone) -> Self {
        Self(vec![tone])
    }

    /// The tones in this slot, lowest first.
    pub fn tones(&self) -> &[Tone] {
        &self.0
    }

    /// Returns the tone at `index_in_chord`, counting up from the lowest.
    pub fn tone(&self, index_in_chord: usize) -> Option<&Tone> {
        self.0.get(index_in_chord)
    }

    /// The number of tones sounding in this slot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a slot that belongs to a pattern.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The lowest tone.
    pub fn lowest(&self) -> Option<&Tone> {
        self.0.first()
    }

    /// The highest tone.
    pub fn highest(&self) -> Option<&Tone> {
        self.0.last()
    }

    /// Adds `tone` where it belongs in pitch order and returns its index.
    /// A tone whose key matches existing tones goes above them.
    pub(crate) fn insert(&mut self, tone: Tone) -> usize {
        // None < Some(_), so rests land below every pitch.
        let index = self.0.partition_point(|t| t.key_no() <= tone.key_no());
        self.0.insert(index, tone);
        index
    }

    /// Removes and returns the tone at `index_in_chord`.
    pub(crate) fn remove(&mut self, index_in_chord: usize) -> Result<Tone> {
        if index_in_chord < self.0.len() {
            Ok(self.0.remove(index_in_chord))
        } else {
            Err(NotationError::index(
                "chord index",
                index_in_chord,
                self.0.len(),
            ))
        }
    }

    /// Builds a new slot by applying `f` to every tone, stopping at the first
    /// failure. `f` must not reorder keys relative to each other.
    pub(crate) fn try_map(&self, f: impl Fn(&Tone) -> Result<Tone>) -> Result<Self> {
        Ok(Self(self.0.iter().map(f).collect::<Result<Vec<_>>>()?))
    }
}
impl HasDuration for ChordSlot {
    /// A slot lasts as long as its longest tone.
    fn duration(&self) -> f64 {
        self.0
            .iter()
            .map(|t| t.duration())
            .fold(0.0, f64::max)
    }
}
impl TryFrom<Vec<Tone>> for ChordSlot {
    type Error = NotationError;

    fn try_from(mut tones: Vec<Tone>) -> Result<Self> {
        if tones.is_empty() {
            return Err(NotationError::value(
                "chord slot",
                "[]",
                "must hold at least one tone",
            ));
        }
        // Stable, so equal keys keep their stored order.
        tones.sort_by_key(|t| t.key_no());
        Ok(Self(tones))
    }
}
impl From<ChordSlot> for Vec<Tone> {
    fn from(value: ChordSlot) -> Self {
        value.0
    }
}
