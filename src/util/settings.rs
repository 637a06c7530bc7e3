// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::{
    composition::Pattern,
    types::{NotationError, Result, Tempo},
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Defaults that a [MusicalWork](crate::composition::MusicalWork) applies
/// when it creates things without being told otherwise. Any field missing
/// from serialized settings takes its default.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct WorkSettings {
    /// The instrument given to patterns created by
    /// [MusicalWork::add_pattern()](crate::composition::MusicalWork::add_pattern).
    #[derivative(Default(value = "Pattern::DEFAULT_INSTRUMENT.to_string()"))]
    pub default_instrument: String,

    /// The bar at which new patterns start.
    pub default_start_bar: u32,

    /// The tempo of a work created without one.
    pub default_tempo: Tempo,
}
impl WorkSettings {
    /// Checks that these settings can actually produce valid patterns.
    pub fn validate(&self) -> Result<()> {
        if self.default_instrument.is_empty() {
            return Err(NotationError::value(
                "default instrument",
                "\"\"",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Makes a fresh, empty [Pattern] from these defaults.
    pub fn new_pattern(&self) -> Result<Pattern> {
        self.validate()?;
        Pattern::new(self.default_start_bar as i64, &self.default_instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn defaults() {
        let s = WorkSettings::default();
        assert_eq!(s.default_instrument, "Piano");
        assert_eq!(s.default_start_bar, 0);
        assert_eq!(s.default_tempo, Tempo::default());
        assert!(s.validate().is_ok());

        let p = s.new_pattern().unwrap();
        assert_eq!(p.instrument(), "Piano");
        assert_eq!(p.start_bar(), 0);
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let s: WorkSettings =
            serde_json::from_str(r#"{ "default-instrument": "Harpsichord" }"#).unwrap();
        assert_eq!(s.default_instrument, "Harpsichord");
        assert_eq!(s.default_tempo.bpm(), 120);

        let s: WorkSettings = serde_json::from_str(r#"{ "default-tempo": 90 }"#).unwrap();
        assert_eq!(s.default_tempo.bpm(), 90);

        assert!(
            serde_json::from_str::<WorkSettings>(r#"{ "default-tempo": 10 }"#).is_err(),
            "out-of-range tempo should be rejected at load time"
        );
    }

    #[test]
    fn bad_defaults_are_reported() {
        let s = WorkSettings {
            default_instrument: String::default(),
            ..Default::default()
        };
        assert_eq!(s.validate().unwrap_err().kind(), ErrorKind::Value);
        assert!(s.new_pattern().is_err());
    }
}
