//! Data containers of songs and charts, produced by [`crate::parse`].

pub mod chart;
pub mod difficulty;
pub mod song;

use thiserror::Error;

pub use self::{
    chart::{Chart, ChartHash, ChartType},
    difficulty::DifficultyClass,
    song::{DisplayBpm, SimfileFormat, Song, SongMetadata},
};

/// A name which is not in the table of known values, such as an unknown difficulty.
///
/// A chart having such a value is not supported, so it is dropped instead of failing the song.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind}: {value:?}")]
pub struct UnrecognizedValueError {
    /// What the value was meant to be.
    pub kind: &'static str,
    /// The value found.
    pub value: String,
}

impl UnrecognizedValueError {
    /// Creates an error of the `value` for `kind`.
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
