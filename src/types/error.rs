// Copyright (c) 2024 Mike Tsao

//! The errors that editing a score can produce.

use derive_builder::UninitializedFieldError;
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thiserror::Error;

/// A convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, NotationError>;

/// The broad category of a [NotationError]. Callers that only care whether
/// an argument was malformed, out of range, or pointing at nothing can match
/// on this instead of on the full error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// The argument isn't the kind of thing that was asked for.
    Type,
    /// The argument is the right kind of thing, but its value violates a
    /// domain constraint.
    Value,
    /// A positional argument doesn't address an existing element.
    Index,
}

/// Everything that can go wrong while building or editing a score. Every
/// failure is reported synchronously and leaves the model untouched.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NotationError {
    /// The argument isn't the kind of value the field holds, for example a
    /// float that isn't a number.
    #[error("{what} must be {expected}")]
    Type {
        /// The field or argument that was rejected.
        what: &'static str,
        /// A description of what was expected.
        expected: &'static str,
    },

    /// The argument has the right type, but its value is out of range.
    #[error("{what} {value} is invalid: {constraint}")]
    Value {
        /// The field or argument that was rejected.
        what: &'static str,
        /// The rejected value, rendered for humans.
        value: String,
        /// The rule the value broke.
        constraint: &'static str,
    },

    /// The index doesn't address an existing element.
    #[error("{what} {index} is out of range (length {len})")]
    Index {
        /// What was being indexed.
        what: &'static str,
        /// The rejected index.
        index: usize,
        /// How many elements there were.
        len: usize,
    },
}
impl NotationError {
    /// Returns the [ErrorKind] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotationError::Type { .. } => ErrorKind::Type,
            NotationError::Value { .. } => ErrorKind::Value,
            NotationError::Index { .. } => ErrorKind::Index,
        }
    }

    pub(crate) fn value(what: &'static str, value: impl ToString, constraint: &'static str) -> Self {
        Self::Value {
            what,
            value: value.to_string(),
            constraint,
        }
    }

    pub(crate) fn index(what: &'static str, index: usize, len: usize) -> Self {
        Self::Index { what, index, len }
    }
}
impl From<UninitializedFieldError> for NotationError {
    fn from(value: UninitializedFieldError) -> Self {
        Self::Type {
            what: value.field_name(),
            expected: "set before build()",
        }
    }
}

/// Checks that `value` is a number, then that it lies in `range`.
pub(crate) fn check_f64_in(
    what: &'static str,
    value: f64,
    range: core::ops::RangeInclusive<f64>,
    constraint: &'static str,
) -> Result<f64> {
    if value.is_nan() {
        return Err(NotationError::Type {
            what,
            expected: "a number",
        });
    }
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(NotationError::value(what, value, constraint))
    }
}

/// Checks that `value` is a number, finite, and strictly positive.
pub(crate) fn check_positive_f64(what: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(NotationError::Type {
            what,
            expected: "a number",
        });
    }
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(NotationError::value(what, value, "must be positive and finite"))
    }
}
