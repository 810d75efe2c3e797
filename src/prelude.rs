//! Prelude module for the simfile crate.
//!
//! This module re-exports the types needed in most uses. You can use
//! `use simfile_rs::prelude::*;` to import them at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{SimpleSource, ToAriadne, emit_chart_warnings};

pub use crate::{
    beatmap::{Beatmap, BeatmapError, Lane, LaneLayout, Note, NoteResolution, Panel, PlayerSide},
    model::{
        Chart, ChartHash, ChartType, DifficultyClass, DisplayBpm, SimfileFormat, Song,
        SongMetadata, UnrecognizedValueError,
    },
    parse::{
        ChartError, ChartWarning, InvalidValue, LoadError, ParseConfig, ParseError,
        SimfileOutput, parse_simfile, read_simfile, select_simfile,
    },
    tag::DuplicateTagPolicy,
    timing::{Timing, TimingData, TimingError},
};
