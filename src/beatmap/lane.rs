//! Definitions of input lanes (panels) and their layouts for each chart type.

/// A side of the player, which owns a set of panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerSide {
    /// The player 1 side, or the left pad on doubles.
    Player1,
    /// The player 2 side, or the right pad on doubles.
    Player2,
}

/// A panel of a dance or pump pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Panel {
    /// The left arrow.
    Left,
    /// The down arrow.
    Down,
    /// The up arrow.
    Up,
    /// The right arrow.
    Right,
    /// The up-left diagonal, used on solo and pump pads.
    UpLeft,
    /// The up-right diagonal, used on solo and pump pads.
    UpRight,
    /// The down-left diagonal of a pump pad.
    DownLeft,
    /// The down-right diagonal of a pump pad.
    DownRight,
    /// The center panel of a pump pad.
    Center,
}

/// One input column a note belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane {
    /// The side of the pad.
    pub side: PlayerSide,
    /// The panel on the pad.
    pub panel: Panel,
}

impl Lane {
    /// Creates a lane on the player 1 side.
    #[must_use]
    pub const fn p1(panel: Panel) -> Self {
        Self {
            side: PlayerSide::Player1,
            panel,
        }
    }

    /// Creates a lane on the player 2 side.
    #[must_use]
    pub const fn p2(panel: Panel) -> Self {
        Self {
            side: PlayerSide::Player2,
            panel,
        }
    }
}

const DANCE_SINGLE: [Lane; 4] = [
    Lane::p1(Panel::Left),
    Lane::p1(Panel::Down),
    Lane::p1(Panel::Up),
    Lane::p1(Panel::Right),
];

const DANCE_DOUBLE: [Lane; 8] = [
    Lane::p1(Panel::Left),
    Lane::p1(Panel::Down),
    Lane::p1(Panel::Up),
    Lane::p1(Panel::Right),
    Lane::p2(Panel::Left),
    Lane::p2(Panel::Down),
    Lane::p2(Panel::Up),
    Lane::p2(Panel::Right),
];

const DANCE_SOLO: [Lane; 6] = [
    Lane::p1(Panel::Left),
    Lane::p1(Panel::UpLeft),
    Lane::p1(Panel::Down),
    Lane::p1(Panel::Up),
    Lane::p1(Panel::UpRight),
    Lane::p1(Panel::Right),
];

const PUMP_SINGLE: [Lane; 5] = [
    Lane::p1(Panel::DownLeft),
    Lane::p1(Panel::UpLeft),
    Lane::p1(Panel::Center),
    Lane::p1(Panel::UpRight),
    Lane::p1(Panel::DownRight),
];

const PUMP_DOUBLE: [Lane; 10] = [
    Lane::p1(Panel::DownLeft),
    Lane::p1(Panel::UpLeft),
    Lane::p1(Panel::Center),
    Lane::p1(Panel::UpRight),
    Lane::p1(Panel::DownRight),
    Lane::p2(Panel::DownLeft),
    Lane::p2(Panel::UpLeft),
    Lane::p2(Panel::Center),
    Lane::p2(Panel::UpRight),
    Lane::p2(Panel::DownRight),
];

/// An ordered set of lanes used by a chart type. The index of a lane is its column in the note data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneLayout(&'static [Lane]);

impl LaneLayout {
    /// `dance-single`: four panels.
    pub const DANCE_SINGLE: Self = Self(&DANCE_SINGLE);
    /// `dance-double` and `dance-couple`: four panels on each side.
    pub const DANCE_DOUBLE: Self = Self(&DANCE_DOUBLE);
    /// `dance-solo`: six panels.
    pub const DANCE_SOLO: Self = Self(&DANCE_SOLO);
    /// `pump-single`: five panels.
    pub const PUMP_SINGLE: Self = Self(&PUMP_SINGLE);
    /// `pump-double`: five panels on each side.
    pub const PUMP_DOUBLE: Self = Self(&PUMP_DOUBLE);

    /// Returns the number of lanes, which is the width of one row in the note data.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.len()
    }

    /// Returns whether the layout has no lanes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0.is_empty()
    }

    /// Returns the lane at the column `index`.
    #[must_use]
    pub fn lane(self, index: usize) -> Option<Lane> {
        self.0.get(index).copied()
    }

    /// Returns whether the layout contains `lane`.
    #[must_use]
    pub fn contains(self, lane: Lane) -> bool {
        self.0.contains(&lane)
    }

    /// Returns the lanes in column order.
    #[must_use]
    pub const fn lanes(self) -> &'static [Lane] {
        self.0
    }
}
