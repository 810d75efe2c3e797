//! Note resolutions, the grid spacing between rows of the note data.

/// A grid spacing of notes, named by how many rows fit into one 4/4 measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteResolution {
    /// 1 row per measure.
    Whole,
    /// 2 rows per measure.
    Half,
    /// 4 rows per measure.
    Quarter,
    /// 8 rows per measure.
    Eighth,
    /// 12 rows per measure.
    Twelfth,
    /// 16 rows per measure.
    Sixteenth,
    /// 24 rows per measure.
    TwentyFourth,
    /// 32 rows per measure.
    ThirtySecond,
    /// 48 rows per measure.
    FortyEighth,
    /// 64 rows per measure.
    SixtyFourth,
    /// 96 rows per measure.
    NinetySixth,
    /// 192 rows per measure.
    HundredNinetySecond,
}

impl NoteResolution {
    const ALL: [Self; 12] = [
        Self::Whole,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::Twelfth,
        Self::Sixteenth,
        Self::TwentyFourth,
        Self::ThirtySecond,
        Self::FortyEighth,
        Self::SixtyFourth,
        Self::NinetySixth,
        Self::HundredNinetySecond,
    ];

    /// Returns how many rows fit into one measure.
    #[must_use]
    pub const fn notes_per_measure(self) -> usize {
        match self {
            Self::Whole => 1,
            Self::Half => 2,
            Self::Quarter => 4,
            Self::Eighth => 8,
            Self::Twelfth => 12,
            Self::Sixteenth => 16,
            Self::TwentyFourth => 24,
            Self::ThirtySecond => 32,
            Self::FortyEighth => 48,
            Self::SixtyFourth => 64,
            Self::NinetySixth => 96,
            Self::HundredNinetySecond => 192,
        }
    }

    /// Returns the distance between two adjacent rows in beats.
    #[must_use]
    pub fn note_distance(self) -> f64 {
        4.0 / self.notes_per_measure() as f64
    }

    /// Finds the resolution whose rows per measure equals `rows` exactly.
    #[must_use]
    pub fn from_notes_per_measure(rows: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|resolution| resolution.notes_per_measure() == rows)
    }
}
