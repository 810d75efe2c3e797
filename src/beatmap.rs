//! Notes of a chart, placed at beat positions per lane.
//!
//! [`Beatmap`] keeps an ordered map from beat to [`Note`] for each [`Lane`], so the notes around
//! the playback position can be walked with the `floor`/`ceiling`/`higher`/`lower` navigation
//! methods.
//!
//! The note data text is decoded by one of two grammars:
//!
//! - [`grid`]: the measure grid of SM and SSC files.
//! - [`stream`]: the bracketed character stream of DWI files.
//!
//! Both fail with [`BeatmapError`] on any structural violation, so the caller can skip only the
//! broken chart.

pub mod grid;
pub mod lane;
pub mod note;
pub mod resolution;
pub mod stream;

use std::{
    collections::{BTreeMap, btree_map::Entry},
    ops::{Bound, RangeBounds},
};

use strict_num_extended::FinF64;
use thiserror::Error;

pub use self::{
    lane::{Lane, LaneLayout, Panel, PlayerSide},
    note::Note,
    resolution::NoteResolution,
};
use crate::util::beat_key;

/// An error occurred when decoding the note data of a chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeatmapError {
    /// The length of a measure is not a multiple of the lane count.
    #[error("measure {measure} has {len} cells, not divisible by {lanes} lanes")]
    UnevenMeasure {
        /// The index of the measure.
        measure: usize,
        /// The count of cells in the measure.
        len: usize,
        /// The count of lanes of the chart.
        lanes: usize,
    },
    /// The count of rows in a measure matches no known note resolution.
    #[error("measure {measure} has {rows} rows, which is not a known note resolution")]
    UnknownResolution {
        /// The index of the measure.
        measure: usize,
        /// The count of rows in the measure.
        rows: usize,
    },
    /// A hold or roll tail was found without a preceding hold or roll head.
    #[error("hold tail at beat {beat} on {lane:?} has no preceding hold or roll head")]
    OrphanTail {
        /// The lane of the tail.
        lane: Lane,
        /// The beat of the tail.
        beat: f64,
    },
    /// The character cannot be used in the step stream.
    #[error("unexpected character {0:?} in step stream")]
    UnexpectedCharacter(char),
    /// The step refers to a panel which the chart type does not have.
    #[error("panel {panel:?} is not available on this chart type")]
    PanelNotInLayout {
        /// The panel stepped.
        panel: Panel,
    },
    /// A hold flag `!` was found while another one is pending.
    #[error("nested hold flag at beat {beat}")]
    NestedHoldFlag {
        /// The beat where the flag was found.
        beat: f64,
    },
    /// A hold flag `!` was found with no step to attach.
    #[error("hold flag at beat {beat} has no preceding step")]
    DanglingHoldFlag {
        /// The beat where the flag was found.
        beat: f64,
    },
    /// A bracket was opened while another one is open.
    #[error("bracket {open:?} opened at beat {beat} while another bracket is open")]
    NestedBracket {
        /// The opening character.
        open: char,
        /// The beat where the bracket was opened.
        beat: f64,
    },
    /// A bracket was closed without the matching opening bracket.
    #[error("bracket {close:?} at beat {beat} has no matching opening bracket")]
    UnmatchedBracket {
        /// The closing character.
        close: char,
        /// The beat where the bracket was closed.
        beat: f64,
    },
    /// The note resolution was changed while combining steps or waiting for a hold flag target.
    #[error("note resolution changed by {0:?} inside a combined step or hold flag")]
    ResolutionChangeInStep(char),
    /// The stream ended while a bracket, combined step or hold flag is still open.
    #[error("step stream ended with unclosed {0:?}")]
    UnclosedAtEnd(char),
    /// A beat position was not a finite number.
    #[error("beat position {0} is not finite")]
    InvalidBeat(f64),
}

/// Result of decoding note data.
pub type Result<T> = std::result::Result<T, BeatmapError>;

/// The notes of a chart, indexed by lane and beat.
///
/// Within one lane there is at most one note per beat: inserting a note at an occupied beat
/// replaces the older one.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beatmap {
    lanes: BTreeMap<Lane, BTreeMap<FinF64, Note>>,
}

impl Beatmap {
    /// Creates an empty beatmap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `note` on `lane` at `beat`, returning the note replaced if the beat was occupied.
    ///
    /// # Errors
    ///
    /// Returns [`BeatmapError::InvalidBeat`] if `beat` is not finite.
    pub fn insert(&mut self, lane: Lane, beat: f64, note: Note) -> Result<Option<Note>> {
        let key = beat_key(beat).ok_or(BeatmapError::InvalidBeat(beat))?;
        Ok(self.lanes.entry(lane).or_default().insert(key, note))
    }

    /// Removes the note on `lane` at `beat`.
    pub fn remove(&mut self, lane: Lane, beat: f64) -> Option<Note> {
        let key = beat_key(beat)?;
        let notes = self.lanes.get_mut(&lane)?;
        let removed = notes.remove(&key);
        if notes.is_empty() {
            self.lanes.remove(&lane);
        }
        removed
    }

    /// Replaces the length of the last note of `lane` which must be a hold or roll, extending it
    /// to end at `tail_beat`.
    pub(crate) fn close_last_lengthy(&mut self, lane: Lane, tail_beat: f64) -> Result<()> {
        let orphan = || BeatmapError::OrphanTail {
            lane,
            beat: tail_beat,
        };
        let notes = self.lanes.get_mut(&lane).ok_or_else(orphan)?;
        let mut last = notes.last_entry().ok_or_else(orphan)?;
        let head_beat = last.key().as_f64();
        let closed = last
            .get()
            .with_length(tail_beat - head_beat)
            .ok_or_else(orphan)?;
        last.insert(closed);
        Ok(())
    }

    /// Gets the note on `lane` at exactly `beat`.
    #[must_use]
    pub fn get(&self, lane: Lane, beat: f64) -> Option<&Note> {
        self.lanes.get(&lane)?.get(&beat_key(beat)?)
    }

    fn lane_range(
        &self,
        lane: Lane,
        range: (Bound<FinF64>, Bound<FinF64>),
    ) -> impl DoubleEndedIterator<Item = (f64, &Note)> {
        self.lanes
            .get(&lane)
            .into_iter()
            .flat_map(move |notes| notes.range(range))
            .map(|(beat, note)| (beat.as_f64(), note))
    }

    /// Gets the note with the greatest beat less than or equal to `beat`.
    #[must_use]
    pub fn floor_note(&self, lane: Lane, beat: f64) -> Option<(f64, &Note)> {
        let key = beat_key(beat)?;
        self.lane_range(lane, (Bound::Unbounded, Bound::Included(key)))
            .next_back()
    }

    /// Gets the note with the least beat greater than or equal to `beat`.
    #[must_use]
    pub fn ceiling_note(&self, lane: Lane, beat: f64) -> Option<(f64, &Note)> {
        let key = beat_key(beat)?;
        self.lane_range(lane, (Bound::Included(key), Bound::Unbounded))
            .next()
    }

    /// Gets the note with the least beat strictly greater than `beat`.
    #[must_use]
    pub fn higher_note(&self, lane: Lane, beat: f64) -> Option<(f64, &Note)> {
        let key = beat_key(beat)?;
        self.lane_range(lane, (Bound::Excluded(key), Bound::Unbounded))
            .next()
    }

    /// Gets the note with the greatest beat strictly less than `beat`.
    #[must_use]
    pub fn lower_note(&self, lane: Lane, beat: f64) -> Option<(f64, &Note)> {
        let key = beat_key(beat)?;
        self.lane_range(lane, (Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
    }

    /// Gets the first note of `lane`.
    #[must_use]
    pub fn first_note(&self, lane: Lane) -> Option<(f64, &Note)> {
        self.lanes
            .get(&lane)?
            .first_key_value()
            .map(|(beat, note)| (beat.as_f64(), note))
    }

    /// Gets the last note of `lane`.
    #[must_use]
    pub fn last_note(&self, lane: Lane) -> Option<(f64, &Note)> {
        self.lanes
            .get(&lane)?
            .last_key_value()
            .map(|(beat, note)| (beat.as_f64(), note))
    }

    /// Returns the notes of `lane` in beat order.
    pub fn notes(&self, lane: Lane) -> impl DoubleEndedIterator<Item = (f64, &Note)> {
        self.lane_range(lane, (Bound::Unbounded, Bound::Unbounded))
    }

    /// Returns the notes of `lane` whose beat is in `range`. Non-finite bounds are treated as unbounded.
    pub fn notes_in_range(
        &self,
        lane: Lane,
        range: impl RangeBounds<f64>,
    ) -> impl DoubleEndedIterator<Item = (f64, &Note)> {
        let convert = |bound: Bound<&f64>| match bound {
            Bound::Included(&beat) => beat_key(beat).map_or(Bound::Unbounded, Bound::Included),
            Bound::Excluded(&beat) => beat_key(beat).map_or(Bound::Unbounded, Bound::Excluded),
            Bound::Unbounded => Bound::Unbounded,
        };
        let range = (convert(range.start_bound()), convert(range.end_bound()));
        let valid = match range {
            (Bound::Included(start), Bound::Included(end)) => start <= end,
            (
                Bound::Included(start) | Bound::Excluded(start),
                Bound::Included(end) | Bound::Excluded(end),
            ) => start < end,
            _ => true,
        };
        self.lanes
            .get(&lane)
            .filter(|_| valid)
            .into_iter()
            .flat_map(move |notes| notes.range(range))
            .map(|(beat, note)| (beat.as_f64(), note))
    }

    /// Returns the lanes having at least one note.
    pub fn lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        self.lanes.keys().copied()
    }

    /// Returns all notes as `(lane, beat, note)`, ordered by lane then beat.
    pub fn iter(&self) -> impl Iterator<Item = (Lane, f64, &Note)> {
        self.lanes.iter().flat_map(|(&lane, notes)| {
            notes
                .iter()
                .map(move |(beat, note)| (lane, beat.as_f64(), note))
        })
    }

    /// Returns the count of notes on `lane`.
    #[must_use]
    pub fn lane_len(&self, lane: Lane) -> usize {
        self.lanes.get(&lane).map_or(0, BTreeMap::len)
    }

    /// Returns the count of all notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.values().map(BTreeMap::len).sum()
    }

    /// Returns whether there is no note.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(BTreeMap::is_empty)
    }

    /// Returns the beat of the last note over all lanes, including the tails of lengthy notes.
    #[must_use]
    pub fn last_beat(&self) -> Option<f64> {
        self.iter()
            .map(|(_, beat, note)| beat + note.length().unwrap_or(0.0))
            .max_by(f64::total_cmp)
    }
}
