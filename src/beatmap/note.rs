//! Definitions of the note object.

/// A note placed on a lane.
///
/// Only the lengthy notes, [`Note::Hold`] and [`Note::Roll`], carry a duration. The length is
/// measured in beats.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Note {
    /// A plain step.
    Tap,
    /// A freeze arrow which must be held for `length` beats.
    Hold {
        /// The duration in beats.
        length: f64,
    },
    /// A roll which must be tapped repeatedly for `length` beats.
    Roll {
        /// The duration in beats.
        length: f64,
    },
    /// A note which must not be stepped on.
    Mine,
    /// A note judged on release.
    Lift,
    /// A note which is shown but never judged.
    Fake,
    /// A note which only plays its key sound automatically.
    AutoKeySound,
}

impl Note {
    /// Returns the duration in beats if the note is a lengthy note.
    #[must_use]
    pub const fn length(&self) -> Option<f64> {
        match *self {
            Self::Hold { length } | Self::Roll { length } => Some(length),
            Self::Tap | Self::Mine | Self::Lift | Self::Fake | Self::AutoKeySound => None,
        }
    }

    /// Returns whether the note has a duration.
    #[must_use]
    pub const fn is_lengthy(&self) -> bool {
        self.length().is_some()
    }

    /// Returns a copy of the lengthy note with its duration replaced, or `None` for the other notes.
    #[must_use]
    pub const fn with_length(&self, length: f64) -> Option<Self> {
        match self {
            Self::Hold { .. } => Some(Self::Hold { length }),
            Self::Roll { .. } => Some(Self::Roll { length }),
            Self::Tap | Self::Mine | Self::Lift | Self::Fake | Self::AutoKeySound => None,
        }
    }

    /// Returns whether the note is judged against the player's input.
    #[must_use]
    pub const fn is_judged(&self) -> bool {
        !matches!(self, Self::Fake | Self::AutoKeySound)
    }
}
