// Copyright (c) 2024 Mike Tsao

//! The traits that define characteristics shared among parts of the score.

/// Quick import of all important traits.
pub mod prelude {
    pub use super::HasDuration;
}

/// Something that occupies time in a score.
pub trait HasDuration {
    /// Returns how long this thing lasts, in whole notes. This is the amount
    /// of time from its start to the point when the next contiguous musical
    /// item should start.
    fn duration(&self) -> f64;

    /// Convenience method that returns the duration in beats of the given
    /// note value. For example, a half note lasts two quarter-note beats.
    fn duration_in_beats(&self, beat_value: f64) -> f64 {
        self.duration() / beat_value
    }
}
