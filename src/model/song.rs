//! Songs, the result of parsing one simfile.

use std::path::{Path, PathBuf};

use super::{Chart, ChartType, DifficultyClass};
use crate::timing::TimingData;

/// A format of the simfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimfileFormat {
    /// StepMania 3.9 `.sm`.
    Sm,
    /// StepMania 5 `.ssc`.
    Ssc,
    /// Dance With Intensity `.dwi`.
    Dwi,
}

impl SimfileFormat {
    /// Returns the file extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Ssc => "ssc",
            Self::Dwi => "dwi",
        }
    }

    /// Finds the format of the file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        [Self::Sm, Self::Ssc, Self::Dwi]
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
    }

    /// Finds the format from the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }
}

/// The BPM shown on the song select, which may differ from the actual tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayBpm {
    /// A fixed value.
    Single(f64),
    /// A range from the minimum to the maximum.
    Range(f64, f64),
    /// A randomly cycling value, written `*`.
    Random,
}

/// Descriptive fields of a song.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongMetadata {
    /// The title.
    pub title: Option<String>,
    /// The subtitle.
    pub subtitle: Option<String>,
    /// The artist.
    pub artist: Option<String>,
    /// The title in latin letters.
    pub title_translit: Option<String>,
    /// The subtitle in latin letters.
    pub subtitle_translit: Option<String>,
    /// The artist in latin letters.
    pub artist_translit: Option<String>,
    /// The genre.
    pub genre: Option<String>,
    /// The author of the simfile.
    pub credit: Option<String>,
    /// The banner image path.
    pub banner: Option<PathBuf>,
    /// The background image path.
    pub background: Option<PathBuf>,
    /// The CD title image path.
    pub cd_title: Option<PathBuf>,
    /// The music file path.
    pub music: Option<PathBuf>,
    /// The lyrics file path.
    pub lyrics_path: Option<PathBuf>,
    /// The start of the preview in seconds.
    pub sample_start: Option<f64>,
    /// The length of the preview in seconds.
    pub sample_length: Option<f64>,
    /// The BPM shown on the song select.
    pub display_bpm: Option<DisplayBpm>,
    /// Whether the song can be picked on the song select.
    pub selectable: Option<bool>,
}

/// A parsed simfile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Song {
    /// The descriptive fields.
    pub metadata: SongMetadata,
    /// The timing shared by the charts without their own.
    pub timing: TimingData,
    /// The charts in declared order, unique by [`Chart::key`].
    pub charts: Vec<Chart>,
    /// The file this was read from, if read through [`crate::parse::read_simfile`].
    pub source: Option<PathBuf>,
    /// The format this was parsed from.
    pub format: SimfileFormat,
}

impl Song {
    /// Finds the chart of `chart_type` and `difficulty`.
    #[must_use]
    pub fn chart(&self, chart_type: ChartType, difficulty: DifficultyClass) -> Option<&Chart> {
        self.charts
            .iter()
            .find(|chart| chart.key() == (chart_type, difficulty))
    }

    /// Returns the charts of `chart_type`, in declared order.
    pub fn charts_of_type(&self, chart_type: ChartType) -> impl Iterator<Item = &Chart> {
        self.charts
            .iter()
            .filter(move |chart| chart.chart_type == chart_type)
    }

    /// Returns the timing to play `chart` with: its own if declared, or the song's.
    #[must_use]
    pub fn timing_for<'a>(&'a self, chart: &'a Chart) -> &'a TimingData {
        chart.timing.as_ref().unwrap_or(&self.timing)
    }
}
