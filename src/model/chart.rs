//! Playable charts of a song.

use std::{fmt, str::FromStr};

use sha2::{Digest, Sha256};

use super::{DifficultyClass, UnrecognizedValueError};
use crate::{
    beatmap::{Beatmap, LaneLayout},
    timing::TimingData,
};

/// A game style a chart is written for, which decides the lanes of its note data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartType {
    /// `dance-single`: one pad of four panels.
    DanceSingle,
    /// `dance-double`: one player on two pads.
    DanceDouble,
    /// `dance-couple`: two players on their own pad, playing one chart together.
    DanceCouple,
    /// `dance-solo`: one pad of six panels.
    DanceSolo,
    /// `pump-single`: one pump pad of five panels.
    PumpSingle,
    /// `pump-double`: one player on two pump pads.
    PumpDouble,
}

impl ChartType {
    /// Returns the name used by `#NOTES` and `#STEPSTYPE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DanceSingle => "dance-single",
            Self::DanceDouble => "dance-double",
            Self::DanceCouple => "dance-couple",
            Self::DanceSolo => "dance-solo",
            Self::PumpSingle => "pump-single",
            Self::PumpDouble => "pump-double",
        }
    }

    /// Returns the lanes of the note data, in column order.
    #[must_use]
    pub const fn layout(self) -> LaneLayout {
        match self {
            Self::DanceSingle => LaneLayout::DANCE_SINGLE,
            Self::DanceDouble | Self::DanceCouple => LaneLayout::DANCE_DOUBLE,
            Self::DanceSolo => LaneLayout::DANCE_SOLO,
            Self::PumpSingle => LaneLayout::PUMP_SINGLE,
            Self::PumpDouble => LaneLayout::PUMP_DOUBLE,
        }
    }

    /// Returns the chart type of a DWI chart tag name such as `SINGLE`.
    #[must_use]
    pub fn from_dwi_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "SINGLE" => Some(Self::DanceSingle),
            "DOUBLE" => Some(Self::DanceDouble),
            "COUPLE" => Some(Self::DanceCouple),
            "SOLO" => Some(Self::DanceSolo),
            _ => None,
        }
    }

    /// Returns whether the chart spans both player sides.
    #[must_use]
    pub const fn is_two_sided(self) -> bool {
        matches!(
            self,
            Self::DanceDouble | Self::DanceCouple | Self::PumpDouble
        )
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = UnrecognizedValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        [
            Self::DanceSingle,
            Self::DanceDouble,
            Self::DanceCouple,
            Self::DanceSolo,
            Self::PumpSingle,
            Self::PumpDouble,
        ]
        .into_iter()
        .find(|ty| ty.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| UnrecognizedValueError::new("chart type", s))
    }
}

/// SHA-256 digest of the note data of a chart, used as a stable identifier of the chart.
///
/// Whitespace is removed before hashing, so reformatting the note data keeps the hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartHash([u8; 32]);

impl ChartHash {
    /// Hashes the cleaned note data.
    #[must_use]
    pub fn of(cleaned_note_data: &str) -> Self {
        Self(Sha256::digest(cleaned_note_data.as_bytes()).into())
    }

    /// Returns the raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ChartHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for ChartHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChartHash({self})")
    }
}

/// A playable chart: the notes of one chart type and difficulty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chart {
    /// The game style.
    pub chart_type: ChartType,
    /// The difficulty slot.
    pub difficulty: DifficultyClass,
    /// The difficulty rating, if declared.
    pub meter: Option<u32>,
    /// The chart name (SSC `#CHARTNAME`).
    pub name: Option<String>,
    /// The description, often the author on SM files.
    pub description: Option<String>,
    /// The chart author (SSC `#CREDIT`).
    pub credit: Option<String>,
    /// The groove radar values, in declared order.
    pub radar_values: Vec<f64>,
    /// The notes.
    pub beatmap: Beatmap,
    /// The digest of the note data.
    pub hash: ChartHash,
    /// The timing of this chart if it declares its own (SSC), already merged with the song's.
    pub timing: Option<TimingData>,
}

impl Chart {
    /// Returns the pair identifying this chart in a song.
    #[must_use]
    pub const fn key(&self) -> (ChartType, DifficultyClass) {
        (self.chart_type, self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_names() {
        assert_eq!("dance-single".parse(), Ok(ChartType::DanceSingle));
        assert_eq!("Pump-Double".parse(), Ok(ChartType::PumpDouble));
        assert_eq!(
            "dance-routine".parse::<ChartType>(),
            Err(UnrecognizedValueError::new("chart type", "dance-routine"))
        );
        assert_eq!(ChartType::from_dwi_tag("couple"), Some(ChartType::DanceCouple));
        assert_eq!(ChartType::from_dwi_tag("NOTES"), None);
        assert_eq!(ChartType::DanceSolo.layout().len(), 6);
    }

    #[test]
    fn test_hash_hex() {
        let hash = ChartHash::of("");
        assert_eq!(
            hash.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(ChartHash::of("1000"), ChartHash::of("0100"));
    }
}
