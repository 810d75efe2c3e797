//! Decoder of the bracketed step stream grammar, used by DWI note data.
//!
//! Unlike the measure grid, a step stream is one character per step with stateful modifiers:
//!
//! - A step character places the panels of [`step_panels`] and advances the beat by the active
//!   note resolution, which is an eighth by default.
//! - `(` `[` `{` `` ` `` switch the resolution to 16th, 24th, 64th and 192nd until the matching
//!   `)` `]` `}` `'` resets it to 8th.
//! - `<...>` combines all steps inside into one simultaneous placement.
//! - `!` followed by a step character marks those panels of the preceding placement as hold heads.
//!   A hold is closed when its panel is placed again, and its length is the beat distance between
//!   the two placements.
//!
//! Any violation fails the whole stream: there is no recovery inside a chart.

use std::collections::{BTreeMap, BTreeSet};

use super::{Beatmap, BeatmapError, Lane, LaneLayout, Note, NoteResolution, Panel, PlayerSide, Result};
use crate::util::StrExtension;

/// Returns the panels placed by a step character, or `None` if `c` is not a step character.
///
/// `0` and `5` are valid steps placing no panel.
#[must_use]
pub const fn step_panels(c: char) -> Option<&'static [Panel]> {
    use Panel::*;
    Some(match c {
        '0' | '5' => &[],
        '1' => &[Left, Down],
        '2' => &[Down],
        '3' => &[Down, Right],
        '4' => &[Left],
        '6' => &[Right],
        '7' => &[Left, Up],
        '8' => &[Up],
        '9' => &[Up, Right],
        'A' => &[Up, Down],
        'B' => &[Left, Right],
        'C' => &[UpLeft],
        'D' => &[UpRight],
        'E' => &[Left, UpLeft],
        'F' => &[UpLeft, Down],
        'G' => &[UpLeft, Up],
        'H' => &[UpLeft, Right],
        'I' => &[Left, UpRight],
        'J' => &[Down, UpRight],
        'K' => &[Up, UpRight],
        'L' => &[UpRight, Right],
        'M' => &[UpLeft, UpRight],
        _ => return None,
    })
}

const fn bracket_resolution(open: char) -> Option<NoteResolution> {
    match open {
        '(' => Some(NoteResolution::Sixteenth),
        '[' => Some(NoteResolution::TwentyFourth),
        '{' => Some(NoteResolution::SixtyFourth),
        '`' => Some(NoteResolution::HundredNinetySecond),
        _ => None,
    }
}

const fn matching_open(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        '\'' => Some('`'),
        _ => None,
    }
}

/// Panels collected inside `<...>`.
#[derive(Debug, Default)]
struct Combined {
    panels: BTreeSet<Panel>,
    holds: BTreeSet<Panel>,
}

struct StreamDecoder<'a> {
    beatmap: &'a mut Beatmap,
    side: PlayerSide,
    layout: LaneLayout,
    beat: f64,
    resolution: NoteResolution,
    bracket: Option<char>,
    combined: Option<Combined>,
    hold_flag: bool,
    /// Panels whose hold head was placed, with the beat of the head.
    hold_waits: BTreeMap<Panel, f64>,
    /// The beat and panels of the last placement with any panel.
    last_placement: Option<(f64, BTreeSet<Panel>)>,
}

impl<'a> StreamDecoder<'a> {
    fn new(beatmap: &'a mut Beatmap, side: PlayerSide, layout: LaneLayout) -> Self {
        Self {
            beatmap,
            side,
            layout,
            beat: 0.0,
            resolution: NoteResolution::Eighth,
            bracket: None,
            combined: None,
            hold_flag: false,
            hold_waits: BTreeMap::new(),
            last_placement: None,
        }
    }

    fn lane(&self, panel: Panel) -> Result<Lane> {
        let lane = Lane {
            side: self.side,
            panel,
        };
        if self.layout.contains(lane) {
            Ok(lane)
        } else {
            Err(BeatmapError::PanelNotInLayout { panel })
        }
    }

    fn feed(&mut self, c: char) -> Result<()> {
        if let Some(resolution) = bracket_resolution(c) {
            return self.open_bracket(c, resolution);
        }
        if let Some(open) = matching_open(c) {
            return self.close_bracket(c, open);
        }
        match c {
            '<' => {
                if self.combined.is_some() || self.hold_flag {
                    return Err(BeatmapError::NestedBracket {
                        open: c,
                        beat: self.beat,
                    });
                }
                self.combined = Some(Combined::default());
                Ok(())
            }
            '>' => {
                if self.hold_flag {
                    return Err(BeatmapError::DanglingHoldFlag { beat: self.beat });
                }
                let combined = self
                    .combined
                    .take()
                    .ok_or(BeatmapError::UnmatchedBracket {
                        close: c,
                        beat: self.beat,
                    })?;
                self.place(&combined.panels, &combined.holds)
            }
            '!' => {
                if self.hold_flag {
                    return Err(BeatmapError::NestedHoldFlag { beat: self.beat });
                }
                self.hold_flag = true;
                Ok(())
            }
            _ => {
                let panels = step_panels(c).ok_or(BeatmapError::UnexpectedCharacter(c))?;
                self.step(panels)
            }
        }
    }

    fn open_bracket(&mut self, open: char, resolution: NoteResolution) -> Result<()> {
        if self.combined.is_some() || self.hold_flag {
            return Err(BeatmapError::ResolutionChangeInStep(open));
        }
        if self.bracket.is_some() {
            return Err(BeatmapError::NestedBracket {
                open,
                beat: self.beat,
            });
        }
        self.bracket = Some(open);
        self.resolution = resolution;
        Ok(())
    }

    fn close_bracket(&mut self, close: char, open: char) -> Result<()> {
        if self.combined.is_some() || self.hold_flag {
            return Err(BeatmapError::ResolutionChangeInStep(close));
        }
        if self.bracket != Some(open) {
            return Err(BeatmapError::UnmatchedBracket {
                close,
                beat: self.beat,
            });
        }
        self.bracket = None;
        self.resolution = NoteResolution::Eighth;
        Ok(())
    }

    fn step(&mut self, panels: &[Panel]) -> Result<()> {
        let flagged = std::mem::take(&mut self.hold_flag);
        if let Some(combined) = self.combined.as_mut() {
            let target = if flagged {
                &mut combined.holds
            } else {
                &mut combined.panels
            };
            target.extend(panels.iter().copied());
            return Ok(());
        }
        if flagged {
            return self.start_holds(panels);
        }
        let panels: BTreeSet<_> = panels.iter().copied().collect();
        self.place(&panels, &BTreeSet::new())
    }

    /// Turns the taps of the last placement on `panels` into hold heads.
    fn start_holds(&mut self, panels: &[Panel]) -> Result<()> {
        let (head_beat, _) = self
            .last_placement
            .as_ref()
            .ok_or(BeatmapError::DanglingHoldFlag { beat: self.beat })?;
        let head_beat = *head_beat;
        for &panel in panels {
            let lane = self.lane(panel)?;
            self.beatmap.insert(lane, head_beat, Note::Tap)?;
            self.hold_waits.insert(panel, head_beat);
        }
        Ok(())
    }

    /// Places `panels` at the current beat and then advances it.
    ///
    /// Panels waiting for their hold end close the hold instead of placing a tap. Panels in
    /// `holds` become hold heads after placing.
    fn place(&mut self, panels: &BTreeSet<Panel>, holds: &BTreeSet<Panel>) -> Result<()> {
        for &panel in panels.union(holds) {
            let lane = self.lane(panel)?;
            if let Some(head_beat) = self.hold_waits.remove(&panel) {
                self.beatmap.insert(
                    lane,
                    head_beat,
                    Note::Hold {
                        length: self.beat - head_beat,
                    },
                )?;
                if holds.contains(&panel) {
                    self.beatmap.insert(lane, self.beat, Note::Tap)?;
                }
            } else {
                self.beatmap.insert(lane, self.beat, Note::Tap)?;
            }
        }
        for &panel in holds {
            self.hold_waits.insert(panel, self.beat);
        }
        let placed: BTreeSet<_> = panels.union(holds).copied().collect();
        if !placed.is_empty() {
            self.last_placement = Some((self.beat, placed));
        }
        self.beat += self.resolution.note_distance();
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.hold_flag {
            return Err(BeatmapError::UnclosedAtEnd('!'));
        }
        if self.combined.is_some() {
            return Err(BeatmapError::UnclosedAtEnd('<'));
        }
        if let Some(open) = self.bracket {
            return Err(BeatmapError::UnclosedAtEnd(open));
        }
        if !self.hold_waits.is_empty() {
            log::debug!(
                "{} hold heads left open at the end of the stream, kept as taps",
                self.hold_waits.len()
            );
        }
        Ok(())
    }
}

/// Decodes the step stream `source` for `side` into `beatmap`, on `layout`.
///
/// Whitespace in `source` is ignored. Doubles and couple charts decode one stream per side into
/// the same beatmap.
///
/// # Errors
///
/// Returns [`BeatmapError`] on an unknown character, a panel out of `layout`, or an illegal
/// bracket, combine or hold flag state.
pub fn decode_into(
    beatmap: &mut Beatmap,
    source: &str,
    side: PlayerSide,
    layout: LaneLayout,
) -> Result<()> {
    let mut decoder = StreamDecoder::new(beatmap, side, layout);
    for c in source.strip_whitespace().chars() {
        decoder.feed(c)?;
    }
    decoder.finish()
}

/// Decodes the player 1 step stream `source` into a new [`Beatmap`] on `layout`.
///
/// # Errors
///
/// Same as [`decode_into`].
pub fn decode(source: &str, layout: LaneLayout) -> Result<Beatmap> {
    let mut beatmap = Beatmap::new();
    decode_into(&mut beatmap, source, PlayerSide::Player1, layout)?;
    Ok(beatmap)
}
