// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{Rng, WorkSettings};
}

pub use rng::Rng;
pub use settings::WorkSettings;

mod rng;
mod settings;
