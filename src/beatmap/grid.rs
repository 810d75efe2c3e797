//! Decoder of the measure grid grammar, used by SM and SSC note data.
//!
//! The note data is a sequence of measures separated by `,`. Each measure is a sequence of rows,
//! each row has one cell per lane, and the count of rows determines the [`NoteResolution`] of the
//! measure. The cells are:
//!
//! - `1`: tap.
//! - `2`: hold head.
//! - `3`: tail of the last hold or roll on the lane.
//! - `4`: roll head.
//! - `M`: mine.
//! - `K`: automatic key sound.
//! - `L`: lift.
//! - `F`: fake.
//!
//! Any other cell is empty.

use std::collections::BTreeMap;

use super::{Beatmap, BeatmapError, Lane, LaneLayout, Note, NoteResolution, Result};
use crate::util::StrExtension;

/// Decodes the note data `source` into a [`Beatmap`] on `layout`.
///
/// Whitespace in `source` is ignored, as are trailing `,` separators. An empty note data yields
/// an empty beatmap. A hold or roll head that no `3` closes, either because the note data ends or
/// because another head on the same lane comes first, is kept as a tap.
///
/// # Errors
///
/// - [`BeatmapError::UnevenMeasure`] if a measure length is not a multiple of the lane count.
/// - [`BeatmapError::UnknownResolution`] if a measure has a count of rows out of the resolution table.
/// - [`BeatmapError::OrphanTail`] if a `3` cell has no hold or roll to close.
pub fn decode(source: &str, layout: LaneLayout) -> Result<Beatmap> {
    let cleaned = source.strip_whitespace();
    let measures = cleaned.trim_end_matches(',');
    let mut beatmap = Beatmap::new();
    if measures.is_empty() || layout.is_empty() {
        return Ok(beatmap);
    }

    let lanes = layout.len();
    let mut open_heads = BTreeMap::<Lane, f64>::new();
    for (measure_index, measure) in measures.split(',').enumerate() {
        let cells: Vec<char> = measure.chars().collect();
        if cells.len() % lanes != 0 {
            return Err(BeatmapError::UnevenMeasure {
                measure: measure_index,
                len: cells.len(),
                lanes,
            });
        }
        let rows = cells.len() / lanes;
        let resolution = NoteResolution::from_notes_per_measure(rows).ok_or(
            BeatmapError::UnknownResolution {
                measure: measure_index,
                rows,
            },
        )?;

        let measure_beat = measure_index as f64 * 4.0;
        for (row_index, row) in cells.chunks(lanes).enumerate() {
            let beat = measure_beat + row_index as f64 * resolution.note_distance();
            for (&cell, &lane) in row.iter().zip(layout.lanes()) {
                let note = match cell {
                    '1' => Note::Tap,
                    '2' => Note::Hold { length: 0.0 },
                    '3' => {
                        beatmap.close_last_lengthy(lane, beat)?;
                        open_heads.remove(&lane);
                        continue;
                    }
                    '4' => Note::Roll { length: 0.0 },
                    'M' => Note::Mine,
                    'K' => Note::AutoKeySound,
                    'L' => Note::Lift,
                    'F' => Note::Fake,
                    _ => continue,
                };
                if note.is_lengthy()
                    && let Some(head_beat) = open_heads.insert(lane, beat)
                {
                    log::debug!(
                        "hold head on {lane:?} at beat {head_beat} replaced before its tail, kept as a tap"
                    );
                    beatmap.insert(lane, head_beat, Note::Tap)?;
                }
                beatmap.insert(lane, beat, note)?;
            }
        }
    }

    if !open_heads.is_empty() {
        log::debug!(
            "{} hold heads left open at the end of the note data, kept as taps",
            open_heads.len()
        );
    }
    for (lane, head_beat) in open_heads {
        beatmap.insert(lane, head_beat, Note::Tap)?;
    }
    Ok(beatmap)
}
