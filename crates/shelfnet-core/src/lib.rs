//! Shelfnet Core — error taxonomy, configuration, untracked genre set.

pub mod config;
pub mod error;
pub mod genres;

pub use config::{DataPaths, PolicyKind, PolicySettings, ShelfnetConfig};
pub use error::{Error, Result};
pub use genres::UntrackedGenres;
