// Copyright (c) 2024 Mike Tsao

use super::{Pattern, PatternUid};
use crate::{
    types::{NotationError, Result, Tempo, UidFactory},
    util::WorkSettings,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// [MusicalWork] owns the musical score: its [Pattern]s plus the metadata
/// that applies to all of them.
///
/// Patterns are addressed by their zero-based index in creation order.
/// Deleting a pattern shifts every later pattern down by one, so an index
/// obtained before a deletion may name a different pattern afterward. Use
/// the pattern's [PatternUid] when you need a reference that survives
/// deletions.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawWork")]
pub struct MusicalWork {
    name: String,
    author: Option<String>,
    tempo: Tempo,
    patterns: Vec<Pattern>,
    settings: WorkSettings,

    #[serde(skip)]
    pattern_uid_factory: UidFactory<PatternUid>,
}
impl Default for MusicalWork {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            author: None,
            tempo: Tempo::default(),
            patterns: Vec::default(),
            settings: WorkSettings::default(),
            pattern_uid_factory: UidFactory::default(),
        }
    }
}
impl MusicalWork {
    /// The name of a default-constructed work.
    pub const DEFAULT_NAME: &'static str = "Untitled";

    /// Creates an empty work.
    ///
    /// ```
    /// use partitura::prelude::*;
    ///
    /// let work = MusicalWork::new("Sonatina No.6", Some("Mozart"), 140).unwrap();
    /// assert_eq!(work.tempo().bpm(), 140);
    /// assert!(MusicalWork::new("", None, 140).is_err());
    /// assert!(MusicalWork::new("Sonatina No.6", None, 400).is_err());
    /// ```
    pub fn new(name: &str, author: Option<&str>, tempo: i32) -> Result<Self> {
        Ok(Self {
            name: Self::check_name(name)?.to_string(),
            author: author.map(str::to_string),
            tempo: Tempo::new(tempo)?,
            ..Default::default()
        })
    }

    /// Creates an empty work whose tempo and new patterns come from
    /// `settings`.
    pub fn new_with_settings(
        name: &str,
        author: Option<&str>,
        settings: WorkSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            name: Self::check_name(name)?.to_string(),
            author: author.map(str::to_string),
            tempo: settings.default_tempo,
            settings,
            ..Default::default()
        })
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the work. The name must not be empty.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = Self::check_name(name)?.to_string();
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Sets or clears the author.
    pub fn set_author(&mut self, author: Option<&str>) {
        self.author = author.map(str::to_string);
    }

    #[allow(missing_docs)]
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Sets the tempo, which must be within 40..=320 BPM.
    pub fn set_tempo(&mut self, tempo: i32) -> Result<()> {
        self.tempo = Tempo::new(tempo)?;
        Ok(())
    }

    /// The defaults this work uses for new patterns.
    pub fn settings(&self) -> &WorkSettings {
        &self.settings
    }

    /// Replaces the defaults for new patterns. Existing patterns are not
    /// affected.
    pub fn set_settings(&mut self, settings: WorkSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Creates a new, empty [Pattern] from this work's settings, adds it after
    /// the existing patterns, and returns it for editing.
    pub fn add_pattern(&mut self) -> &mut Pattern {
        // settings were validated on their way in
        let pattern = Pattern::new_unchecked(
            self.settings.default_start_bar,
            self.settings.default_instrument.clone(),
        );
        let index = self.patterns.len();
        self.push_pattern(pattern);
        &mut self.patterns[index]
    }

    /// Like [MusicalWork::add_pattern()], but with the given starting bar and
    /// instrument.
    pub fn add_pattern_with(&mut self, start_bar: i64, instrument: &str) -> Result<&mut Pattern> {
        let pattern = Pattern::new(start_bar, instrument)?;
        let index = self.patterns.len();
        self.push_pattern(pattern);
        Ok(&mut self.patterns[index])
    }

    /// Takes ownership of a [Pattern] built elsewhere, adds it after the
    /// existing patterns, and returns the [PatternUid] it now answers to.
    pub fn push_pattern(&mut self, mut pattern: Pattern) -> PatternUid {
        let uid = self.pattern_uid_factory.mint_next();
        pattern.set_uid(uid);
        debug!(
            "{}: added pattern {uid} for {} at index {}",
            self.name,
            pattern.instrument(),
            self.patterns.len()
        );
        self.patterns.push(pattern);
        uid
    }

    /// Removes and returns the pattern at `pattern_no`. Every later pattern
    /// moves down one index.
    pub fn delete_pattern(&mut self, pattern_no: usize) -> Result<Pattern> {
        self.check_pattern_no(pattern_no)?;
        let pattern = self.patterns.remove(pattern_no);
        debug!(
            "{}: deleted pattern {} from index {pattern_no}",
            self.name,
            pattern.uid()
        );
        Ok(pattern)
    }

    /// Removes and returns the pattern with the given [PatternUid].
    pub fn remove_pattern(&mut self, uid: PatternUid) -> Result<Pattern> {
        match self.pattern_index(uid) {
            Some(pattern_no) => self.delete_pattern(pattern_no),
            None => Err(NotationError::value(
                "pattern uid",
                uid,
                "no such pattern in this work",
            )),
        }
    }

    /// Returns the pattern at `pattern_no`.
    pub fn get_pattern(&self, pattern_no: usize) -> Result<&Pattern> {
        self.check_pattern_no(pattern_no)?;
        Ok(&self.patterns[pattern_no])
    }

    /// Returns the pattern at `pattern_no` (mutable).
    pub fn get_pattern_mut(&mut self, pattern_no: usize) -> Result<&mut Pattern> {
        self.check_pattern_no(pattern_no)?;
        Ok(&mut self.patterns[pattern_no])
    }

    /// Returns the [PatternUid] of the pattern at `pattern_no`.
    pub fn pattern_uid(&self, pattern_no: usize) -> Result<PatternUid> {
        self.get_pattern(pattern_no).map(|p| p.uid())
    }

    /// Returns the [Pattern] corresponding to the given [PatternUid].
    pub fn pattern(&self, uid: PatternUid) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.uid() == uid)
    }

    /// Returns the [Pattern] corresponding to the given [PatternUid] (mutable).
    pub fn pattern_mut(&mut self, uid: PatternUid) -> Option<&mut Pattern> {
        self.patterns.iter_mut().find(|p| p.uid() == uid)
    }

    /// Returns the current index of the pattern with the given [PatternUid].
    pub fn pattern_index(&self, uid: PatternUid) -> Option<usize> {
        self.patterns.iter().position(|p| p.uid() == uid)
    }

    /// All patterns, in index order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// The patterns played by `instrument`, in index order.
    pub fn patterns_for_instrument<'a>(
        &'a self,
        instrument: &'a str,
    ) -> impl Iterator<Item = &'a Pattern> + 'a {
        self.patterns
            .iter()
            .filter(move |p| p.instrument() == instrument)
    }

    #[allow(missing_docs)]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn check_pattern_no(&self, pattern_no: usize) -> Result<()> {
        if pattern_no < self.patterns.len() {
            Ok(())
        } else {
            Err(NotationError::index(
                "pattern",
                pattern_no,
                self.patterns.len(),
            ))
        }
    }

    fn check_name(name: &str) -> Result<&str> {
        if name.is_empty() {
            Err(NotationError::value("name", "\"\"", "must not be empty"))
        } else {
            Ok(name)
        }
    }
}

// The shape a [MusicalWork] takes on the wire. Patterns get fresh uids when
// they're loaded.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawWork {
    name: String,
    #[serde(default)]
    author: Option<String>,
    tempo: Tempo,
    #[serde(default)]
    patterns: Vec<Pattern>,
    #[serde(default)]
    settings: WorkSettings,
}
impl TryFrom<RawWork> for MusicalWork {
    type Error = NotationError;

    fn try_from(value: RawWork) -> Result<Self> {
        let mut work = MusicalWork::new_with_settings(
            &value.name,
            value.author.as_deref(),
            value.settings,
        )?;
        work.tempo = value.tempo;
        value.patterns.into_iter().for_each(|p| {
            work.push_pattern(p);
        });
        Ok(work)
    }
}
