// Copyright (c) 2024 Mike Tsao

use super::{ChordSlot, Tone};
use crate::{
    traits::HasDuration,
    types::{check_positive_f64, IsUid, NotationError, NoteValue, Result},
    util::Rng,
};
use derive_builder::Builder;
use kahan::KahanSum;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use synonym::Synonym;

/// Identifies a [Pattern] within its [MusicalWork](super::MusicalWork). Unlike
/// a pattern's index, a [PatternUid] keeps pointing at the same pattern when
/// other patterns are deleted.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
pub struct PatternUid(usize);
impl IsUid for PatternUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}
impl PatternUid {
    /// The uid of a pattern that no work has adopted yet.
    pub const UNASSIGNED: PatternUid = PatternUid(0);
}

/// A [Pattern] is what a piano roll shows for one instrument: a sequence of
/// [ChordSlot]s, each holding the [Tone]s that sound together at that point,
/// anchored at a starting bar of the work.
///
/// Positions are zero-based indexes into the slot sequence. They are not
/// stable: removing the last tone of a slot removes the slot, and every later
/// slot moves down by one.
///
/// The transforms [Pattern::transpose()], [Pattern::scale()], and
/// [Pattern::quantize()] are all-or-nothing. If any tone would end up
/// invalid, the pattern is left exactly as it was.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate", error = "NotationError"))]
#[serde(rename_all = "kebab-case", try_from = "RawPattern")]
pub struct Pattern {
    #[builder(setter(skip), default = "PatternUid::UNASSIGNED")]
    #[serde(skip)]
    uid: PatternUid,

    /// The bar of the work at which this pattern begins.
    #[builder(default)]
    start_bar: u32,

    /// The instrument or voice that plays this pattern.
    #[builder(default = "Pattern::DEFAULT_INSTRUMENT.to_string()", setter(into))]
    instrument: String,

    /// The chord slots, in temporal order.
    #[builder(default, setter(custom))]
    slots: Vec<ChordSlot>,
}
impl Pattern {
    /// The instrument a [PatternBuilder] uses when none is given.
    pub const DEFAULT_INSTRUMENT: &'static str = "Piano";

    /// Creates an empty [Pattern].
    ///
    /// ```
    /// use partitura::prelude::*;
    ///
    /// let pattern = Pattern::new(1, "Violin").unwrap();
    /// assert!(pattern.is_empty());
    /// assert!(Pattern::new(-1, "Violin").is_err());
    /// assert!(Pattern::new(1, "").is_err());
    /// ```
    pub fn new(start_bar: i64, instrument: &str) -> Result<Self> {
        Ok(Self {
            uid: PatternUid::UNASSIGNED,
            start_bar: Self::check_start_bar(start_bar)?,
            instrument: Self::check_instrument(instrument)?.to_string(),
            slots: Vec::default(),
        })
    }

    // For callers that have already validated the fields.
    pub(crate) fn new_unchecked(start_bar: u32, instrument: String) -> Self {
        debug_assert!(!instrument.is_empty());
        Self {
            uid: PatternUid::UNASSIGNED,
            start_bar,
            instrument,
            slots: Vec::default(),
        }
    }

    /// The [PatternUid] assigned by the owning work, or
    /// [PatternUid::UNASSIGNED].
    pub fn uid(&self) -> PatternUid {
        self.uid
    }

    pub(crate) fn set_uid(&mut self, uid: PatternUid) {
        self.uid = uid;
    }

    #[allow(missing_docs)]
    pub fn start_bar(&self) -> u32 {
        self.start_bar
    }

    /// Sets the bar at which this pattern begins, which must be in
    /// 0..=[u32::MAX].
    pub fn set_start_bar(&mut self, start_bar: i64) -> Result<()> {
        self.start_bar = Self::check_start_bar(start_bar)?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Assigns an instrument to this pattern. Must not be empty.
    pub fn set_instrument(&mut self, instrument: &str) -> Result<()> {
        self.instrument = Self::check_instrument(instrument)?.to_string();
        Ok(())
    }

    /// The chord slots, in temporal order.
    pub fn slots(&self) -> &[ChordSlot] {
        &self.slots
    }

    /// Returns the slot at `position`.
    pub fn slot(&self, position: usize) -> Result<&ChordSlot> {
        self.slots
            .get(position)
            .ok_or_else(|| NotationError::index("position", position, self.slots.len()))
    }

    /// The number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The number of tones across all slots.
    pub fn tone_count(&self) -> usize {
        self.slots.iter().map(|s| s.len()).sum()
    }

    /// Every tone in the pattern, slot by slot, lowest first within a slot.
    pub fn tones(&self) -> impl Iterator<Item = &Tone> {
        self.slots.iter().flat_map(|s| s.tones().iter())
    }

    /// Adds `tone` in a new slot at the end of the pattern and returns the
    /// slot's position.
    pub fn append_tone(&mut self, tone: Tone) -> usize {
        self.slots.push(ChordSlot::new_with(tone));
        let position = self.slots.len() - 1;
        trace!("{}: new slot at position {position}", self.instrument);
        position
    }

    /// Adds `tone` to the chord already sounding at `position`, keeping the
    /// chord in pitch order, and returns the tone's index within the chord.
    /// This never creates a slot and never moves later slots.
    pub fn insert_tone(&mut self, tone: Tone, position: usize) -> Result<usize> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(position)
            .ok_or_else(|| NotationError::index("position", position, len))?;
        Ok(slot.insert(tone))
    }

    /// Removes and returns the tone at `index_in_chord` (0 is the lowest) of
    /// the chord at `position`. If that was the chord's last tone, the slot
    /// goes away and every later position shifts down by one.
    pub fn delete_tone(&mut self, position: usize, index_in_chord: usize) -> Result<Tone> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(position)
            .ok_or_else(|| NotationError::index("position", position, len))?;
        let tone = slot.remove(index_in_chord)?;
        if slot.is_empty() {
            self.slots.remove(position);
            trace!("{}: removed empty slot {position}", self.instrument);
        }
        Ok(tone)
    }

    /// Removes the lowest tone of the chord at `position`.
    pub fn delete_lowest_tone(&mut self, position: usize) -> Result<Tone> {
        self.delete_tone(position, 0)
    }

    /// Shifts every pitched tone by `n_semitones`. Rests don't move. Fails
    /// without changing anything if any key would leave 0..=127.
    pub fn transpose(&mut self, n_semitones: i32) -> Result<()> {
        self.replace_tones("transpose", |t| t.transposed(n_semitones))?;
        debug!("{}: transposed by {n_semitones}", self.instrument);
        Ok(())
    }

    /// Multiplies every tone's duration by `coef`, stretching (coef > 1) or
    /// compressing (coef < 1) the pattern in time. Pitches, slot order, and
    /// the starting bar stay put.
    pub fn scale(&mut self, coef: f64) -> Result<()> {
        let coef = check_positive_f64("scale coefficient", coef)?;
        self.replace_tones("scale", |t| t.scaled(coef))?;
        debug!("{}: scaled by {coef}", self.instrument);
        Ok(())
    }

    /// Snaps every tone's duration to the nearest multiple of
    /// `threshold_duration`. A duration exactly halfway between two multiples
    /// goes to the larger one, and nothing gets shorter than
    /// `threshold_duration` itself. Applying the same quantization twice is
    /// the same as applying it once.
    pub fn quantize(&mut self, threshold_duration: f64) -> Result<()> {
        let quantum = check_positive_f64("quantize threshold", threshold_duration)?;
        self.replace_tones("quantize", |t| t.quantized(quantum))?;
        debug!("{}: quantized to {quantum}", self.instrument);
        Ok(())
    }

    /// [Pattern::quantize()] on the grid of a named [NoteValue].
    pub fn quantize_to(&mut self, note_value: NoteValue) -> Result<()> {
        self.quantize(note_value.duration())
    }

    // Builds the complete replacement first, so a failure partway through
    // leaves the pattern untouched.
    fn replace_tones(&mut self, operation: &str, f: impl Fn(&Tone) -> Result<Tone>) -> Result<()> {
        match self
            .slots
            .iter()
            .map(|slot| slot.try_map(&f))
            .collect::<Result<Vec<_>>>()
        {
            Ok(slots) => {
                self.slots = slots;
                Ok(())
            }
            Err(e) => {
                warn!("{}: {operation} rejected: {e}", self.instrument);
                Err(e)
            }
        }
    }

    fn check_start_bar(start_bar: i64) -> Result<u32> {
        u32::try_from(start_bar).map_err(|_| {
            NotationError::value(
                "start bar",
                start_bar,
                "must be between 0 and 4294967295",
            )
        })
    }

    fn check_instrument(instrument: &str) -> Result<&str> {
        if instrument.is_empty() {
            Err(NotationError::value(
                "instrument",
                "\"\"",
                "must not be empty",
            ))
        } else {
            Ok(instrument)
        }
    }
}
impl HasDuration for Pattern {
    /// The sum of the slot durations. Each slot lasts as long as its longest
    /// tone.
    fn duration(&self) -> f64 {
        let mut sum = KahanSum::new_with_value(0.0);
        self.slots.iter().for_each(|slot| sum += slot.duration());
        sum.sum()
    }
}
impl PatternBuilder {
    /// Appends `tone` in a new slot.
    pub fn tone(&mut self, tone: Tone) -> &mut Self {
        self.slots
            .get_or_insert_with(Vec::default)
            .push(ChordSlot::new_with(tone));
        self
    }

    /// Appends a slot with all of `tones` sounding together. An empty chord
    /// is ignored.
    pub fn chord(&mut self, tones: Vec<Tone>) -> &mut Self {
        if let Ok(slot) = ChordSlot::try_from(tones) {
            self.slots.get_or_insert_with(Vec::default).push(slot);
        }
        self
    }

    /// Appends a slot holding a rest of `duration`.
    pub fn rest(&mut self, duration: f64) -> Result<&mut Self> {
        let rest = Tone::rest(duration, 0.0)?;
        Ok(self.tone(rest))
    }

    /// Fills the pattern with random chords. Good for tests.
    pub fn random(&mut self, rng: &mut Rng) -> &mut Self {
        let note_values: Vec<NoteValue> = NoteValue::iter().collect();
        let slot_count = rng.rand_range(4..17);
        for _ in 0..slot_count {
            let note_value = note_values[rng.rand_range(0..note_values.len() as u64) as usize];
            let chord_size = rng.rand_range(1..4);
            let tones = (0..chord_size)
                .filter_map(|_| {
                    let key_no = if rng.rand_range(0..8) == 0 {
                        None
                    } else {
                        Some(rng.rand_range(24..101) as i32)
                    };
                    Tone::new(key_no, note_value.duration(), rng.rand_float()).ok()
                })
                .collect();
            self.chord(tones);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(instrument) = self.instrument.as_ref() {
            Pattern::check_instrument(instrument)?;
        }
        Ok(())
    }
}

// The shape a [Pattern] takes on the wire. Deserializing re-runs the same
// checks as [Pattern::new].
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPattern {
    start_bar: i64,
    instrument: String,
    #[serde(default)]
    slots: Vec<ChordSlot>,
}
impl TryFrom<RawPattern> for Pattern {
    type Error = NotationError;

    fn try_from(value: RawPattern) -> Result<Self> {
        let mut pattern = Pattern::new(value.start_bar, &value.instrument)?;
        pattern.slots = value.slots;
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use float_cmp::approx_eq;
    use more_asserts::assert_le;

    fn keys(pattern: &Pattern) -> Vec<Vec<Option<u8>>> {
        pattern
            .slots()
            .iter()
            .map(|s| s.tones().iter().map(|t| t.key_no()).collect())
            .collect()
    }

    fn three_halves() -> Pattern {
        let mut pattern = Pattern::new(0, "Violin").unwrap();
        pattern.append_tone(Tone::note(40, 0.5, 0.45).unwrap());
        pattern.append_tone(Tone::note(40, 0.5, 0.55).unwrap());
        pattern.append_tone(Tone::note(40, 0.5, 0.45).unwrap());
        pattern
    }

    #[test]
    fn pattern_fields() {
        let mut p = Pattern::new(1, "Violin").unwrap();
        assert_eq!(p.start_bar(), 1);
        assert_eq!(p.instrument(), "Violin");
        assert_eq!(p.uid(), PatternUid::UNASSIGNED);

        p.set_start_bar(2).unwrap();
        assert_eq!(p.start_bar(), 2);
        assert_eq!(p.set_start_bar(-1).unwrap_err().kind(), ErrorKind::Value);
        let err = p.set_start_bar(u32::MAX as i64 + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("between 0 and 4294967295"));
        assert!(p.set_start_bar(u32::MAX as i64).is_ok());
        p.set_start_bar(2).unwrap();
        assert_eq!(p.start_bar(), 2);

        p.set_instrument("Cello").unwrap();
        assert_eq!(p.set_instrument("").unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(p.instrument(), "Cello");
    }

    #[test]
    fn append_returns_position() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        for n in 0..5 {
            let tone = Tone::note(60 + n as i32, 0.25, 0.5).unwrap();
            assert_eq!(p.append_tone(tone.clone()), n);
            assert_eq!(p.len(), n + 1);
            assert_eq!(p.slot(n).unwrap().tones(), &[tone]);
        }
    }

    #[test]
    fn insert_adds_to_existing_chord() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        p.append_tone(Tone::note(40, 0.5, 0.5).unwrap());
        p.append_tone(Tone::note(40, 0.5, 0.5).unwrap());
        assert_eq!(p.insert_tone(Tone::note(44, 0.5, 0.55).unwrap(), 1), Ok(1));
        assert_eq!(p.insert_tone(Tone::note(36, 0.5, 0.55).unwrap(), 1), Ok(0));
        assert_eq!(p.len(), 2, "insert should never create a slot");
        assert_eq!(
            keys(&p),
            vec![vec![Some(40)], vec![Some(36), Some(40), Some(44)]]
        );

        let err = p
            .insert_tone(Tone::note(50, 0.5, 0.5).unwrap(), 2)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
        assert_eq!(p.tone_count(), 4);

        let mut empty = Pattern::new(0, "Piano").unwrap();
        assert!(
            empty
                .insert_tone(Tone::note(50, 0.5, 0.5).unwrap(), 0)
                .is_err(),
            "there's no chord to insert into"
        );
    }

    #[test]
    fn delete_removes_emptied_slots() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        p.append_tone(Tone::note(40, 0.5, 0.5).unwrap());
        p.append_tone(Tone::note(40, 0.5, 0.5).unwrap());
        p.insert_tone(Tone::note(44, 0.5, 0.55).unwrap(), 1).unwrap();
        p.append_tone(Tone::note(50, 0.5, 0.5).unwrap());

        assert_eq!(p.delete_tone(1, 2).unwrap_err().kind(), ErrorKind::Index);
        assert_eq!(p.delete_tone(3, 0).unwrap_err().kind(), ErrorKind::Index);

        assert_eq!(p.delete_tone(1, 1).unwrap().key_no(), Some(44));
        assert_eq!(p.len(), 3, "slot still has a tone, so it stays");
        assert_eq!(p.delete_lowest_tone(1).unwrap().key_no(), Some(40));
        assert_eq!(p.len(), 2, "emptied slot should be removed");
        assert_eq!(
            keys(&p),
            vec![vec![Some(40)], vec![Some(50)]],
            "later slots should shift down"
        );
    }

    #[test]
    fn insert_then_delete_restores_slot() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        p.append_tone(Tone::note(60, 0.5, 0.5).unwrap());
        p.insert_tone(Tone::note(67, 0.5, 0.5).unwrap(), 0).unwrap();
        p.insert_tone(Tone::rest(0.5, 0.0).unwrap(), 0).unwrap();
        let before = p.clone();

        let tone = Tone::note(64, 0.25, 0.9).unwrap();
        let index = p.insert_tone(tone.clone(), 0).unwrap();
        assert_eq!(index, 2);
        assert_eq!(p.delete_tone(0, index).unwrap(), tone);
        assert_eq!(p, before);
    }

    #[test]
    fn transpose_shifts_pitches_and_skips_rests() {
        let mut p = three_halves();
        p.append_tone(Tone::rest(0.5, 0.0).unwrap());
        p.transpose(3).unwrap();
        assert_eq!(
            keys(&p),
            vec![vec![Some(43)], vec![Some(43)], vec![Some(43)], vec![None]]
        );
        p.transpose(-1).unwrap();
        assert_eq!(p.slot(0).unwrap().tones()[0].key_no(), Some(42));
        assert!(p.slot(3).unwrap().tones()[0].is_rest());
    }

    #[test]
    fn transpose_is_atomic() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        p.append_tone(Tone::note(10, 0.5, 0.5).unwrap());
        p.append_tone(Tone::note(100, 0.5, 0.5).unwrap());
        let before = p.clone();

        let err = p.transpose(200).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(p, before, "a failed transpose should change nothing");
        assert_eq!(p.slot(1).unwrap().tones()[0].key_no(), Some(100));

        assert!(p.transpose(-11).is_err(), "key 10 can't go below zero");
        assert_eq!(p, before);

        for shift in [i32::MAX, i32::MIN] {
            assert_eq!(p.transpose(shift).unwrap_err().kind(), ErrorKind::Value);
            assert_eq!(p, before);
        }

        assert!(p.transpose(27).is_ok(), "100 + 27 = 127 is still legal");
    }

    #[test]
    fn transpose_failing_on_later_slot_keeps_earlier_slots() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        p.append_tone(Tone::note(10, 0.5, 0.5).unwrap());
        p.append_tone(Tone::note(120, 0.5, 0.5).unwrap());
        let before = p.clone();

        // 10 + 10 fits, 120 + 10 doesn't.
        assert_eq!(p.transpose(10).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(p, before);
        assert_eq!(p.slot(0).unwrap().tones()[0].key_no(), Some(10));
    }

    #[test]
    fn scale_multiplies_durations() {
        let mut p = three_halves();
        p.scale(0.5).unwrap();
        assert!(p.tones().all(|t| t.duration() == 0.25));
        assert_eq!(p.len(), 3);
        assert_eq!(p.start_bar(), 0, "scaling shouldn't move the pattern");

        let before = p.clone();
        for coef in [0.0, -1.0, f64::INFINITY] {
            assert_eq!(p.scale(coef).unwrap_err().kind(), ErrorKind::Value);
        }
        assert_eq!(p.scale(f64::NAN).unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(p, before);

        p.append_tone(Tone::note(60, 4.0, 0.5).unwrap());
        let before = p.clone();
        assert!(
            p.scale(f64::MAX).is_err(),
            "overflowing a duration should be rejected"
        );
        assert_eq!(p, before, "even the tones that would fit stay unscaled");
    }

    #[test]
    fn scale_round_trip() {
        let mut rng = Rng::new_with_seed(42);
        let mut p = PatternBuilder::default().random(&mut rng).build().unwrap();
        let before: Vec<f64> = p.tones().map(|t| t.duration()).collect();
        p.scale(3.0).unwrap();
        p.scale(1.0 / 3.0).unwrap();
        p.tones().zip(before).for_each(|(t, d)| {
            assert!(approx_eq!(f64, t.duration(), d, ulps = 4));
        });
    }

    #[test]
    fn quantize_snaps_to_grid() {
        let mut p = Pattern::new(0, "Piano").unwrap();
        for duration in [0.1, 0.3, 0.6, 0.75, 1.1] {
            p.append_tone(Tone::note(60, duration, 0.5).unwrap());
        }
        p.quantize(0.5).unwrap();
        let durations: Vec<f64> = p.tones().map(|t| t.duration()).collect();
        assert_eq!(durations, vec![0.5, 0.5, 0.5, 1.0, 1.0]);

        assert_eq!(p.quantize(0.0).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(p.quantize(f64::NAN).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn quantize_is_idempotent() {
        let mut rng = Rng::new_with_seed(7);
        for _ in 0..16 {
            let mut p = PatternBuilder::default().random(&mut rng).build().unwrap();
            p.scale(rng.rand_float() + 0.1).unwrap();
            for quantum in [0.1, 0.25, 1.0 / 3.0, NoteValue::DottedQuarter.duration()] {
                p.quantize(quantum).unwrap();
                let once = p.clone();
                p.quantize(quantum).unwrap();
                assert_eq!(p, once);
                p.tones().for_each(|t| assert_le!(quantum, t.duration()));
            }
        }
    }

    #[test]
    fn duration_sums_slots() {
        let mut p = three_halves();
        assert_eq!(p.duration(), 1.5);
        p.insert_tone(Tone::note(47, 1.0, 0.5).unwrap(), 0).unwrap();
        assert_eq!(p.duration(), 2.0, "a slot lasts as long as its longest tone");
        assert_eq!(p.duration_in_beats(NoteValue::Quarter.duration()), 8.0);
        assert_eq!(Pattern::new(0, "Piano").unwrap().duration(), 0.0);
    }

    #[test]
    fn builder() {
        let p = PatternBuilder::default()
            .start_bar(4)
            .instrument("Flute")
            .tone(Tone::note(72, 0.25, 0.5).unwrap())
            .chord(vec![
                Tone::note(67, 0.5, 0.5).unwrap(),
                Tone::note(60, 0.5, 0.5).unwrap(),
            ])
            .chord(Vec::default())
            .rest(0.25)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(p.start_bar(), 4);
        assert_eq!(p.instrument(), "Flute");
        assert_eq!(
            keys(&p),
            vec![vec![Some(72)], vec![Some(60), Some(67)], vec![None]]
        );

        let p = PatternBuilder::default().build().unwrap();
        assert_eq!(p.instrument(), Pattern::DEFAULT_INSTRUMENT);
        assert!(p.is_empty());

        assert_eq!(
            PatternBuilder::default()
                .instrument("")
                .build()
                .unwrap_err()
                .kind(),
            ErrorKind::Value
        );
    }
}
