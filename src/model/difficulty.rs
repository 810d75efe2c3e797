//! Difficulty classes and their names used across the simfile formats.

use std::{fmt, str::FromStr};

use super::UnrecognizedValueError;

/// A difficulty slot of a chart. Together with the chart type, it identifies a chart in a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DifficultyClass {
    /// Beginner.
    Beginner,
    /// Easy, also known as Basic or Light.
    Easy,
    /// Medium, also known as Another, Trick, Standard or Difficult.
    Medium,
    /// Hard, also known as SSR, Maniac or Heavy.
    Hard,
    /// Challenge, also known as SManiac, Expert or Oni.
    Challenge,
    /// A user-made edit.
    Edit,
}

impl DifficultyClass {
    /// All classes from the easiest.
    pub const ALL: [Self; 6] = [
        Self::Beginner,
        Self::Easy,
        Self::Medium,
        Self::Hard,
        Self::Challenge,
        Self::Edit,
    ];

    /// Returns the canonical name written in SM and SSC files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Challenge => "Challenge",
            Self::Edit => "Edit",
        }
    }
}

impl fmt::Display for DifficultyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyClass {
    type Err = UnrecognizedValueError;

    /// Parses a difficulty name case-insensitively, accepting the synonyms of every format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let class = match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "easy" | "basic" | "light" => Self::Easy,
            "medium" | "another" | "trick" | "standard" | "difficult" => Self::Medium,
            "hard" | "ssr" | "maniac" | "heavy" => Self::Hard,
            "smaniac" | "challenge" | "expert" | "oni" => Self::Challenge,
            "edit" => Self::Edit,
            _ => return Err(UnrecognizedValueError::new("difficulty", s)),
        };
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms() {
        for name in ["HEAVY", "SSR", "MANIAC", "hard", " Hard "] {
            assert_eq!(name.parse(), Ok(DifficultyClass::Hard), "{name}");
        }
        assert_eq!("Basic".parse(), Ok(DifficultyClass::Easy));
        assert_eq!("trick".parse(), Ok(DifficultyClass::Medium));
        assert_eq!("SMANIAC".parse(), Ok(DifficultyClass::Challenge));
        assert_eq!("oni".parse(), Ok(DifficultyClass::Challenge));
        assert_eq!(
            "Impossible".parse::<DifficultyClass>(),
            Err(UnrecognizedValueError::new("difficulty", "Impossible"))
        );
    }

    #[test]
    fn test_display_parses_back() {
        for class in DifficultyClass::ALL {
            assert_eq!(class.to_string().parse(), Ok(class));
        }
    }
}
