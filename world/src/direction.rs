use anyhow::bail;
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Board-relative scan directions, including the diagonals used by roll
/// checks and explosions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
    UpRight,
    DownRight,
    DownLeft,
    UpLeft,
}

use Dir::*;

impl Dir {
    /// All eight directions, cardinals first.
    pub const ALL: [Dir; 8] =
        [Up, Right, Down, Left, UpRight, DownRight, DownLeft, UpLeft];

    /// The four cardinal directions in canonical order.
    pub const CARDINAL: [Dir; 4] = [Up, Left, Down, Right];

    pub fn offset(self) -> IVec2 {
        match self {
            Up => ivec2(0, -1),
            Right => ivec2(1, 0),
            Down => ivec2(0, 1),
            Left => ivec2(-1, 0),
            UpRight => ivec2(1, -1),
            DownRight => ivec2(1, 1),
            DownLeft => ivec2(-1, 1),
            UpLeft => ivec2(-1, -1),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Left | Right)
    }
}

/// Cardinal facing carried by roaming enemies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Left,
    Down,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] =
        [Heading::Up, Heading::Left, Heading::Down, Heading::Right];

    pub fn dir(self) -> Dir {
        match self {
            Heading::Up => Up,
            Heading::Left => Left,
            Heading::Down => Down,
            Heading::Right => Right,
        }
    }

    pub fn left(self) -> Heading {
        match self {
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
            Heading::Right => Heading::Up,
        }
    }

    pub fn right(self) -> Heading {
        match self {
            Heading::Up => Heading::Right,
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
        }
    }
}

/// Agent actions. The integer values are an external contract shared with
/// downstream learners and search code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    None = 0,
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
}

pub const NUM_ACTIONS: usize = 5;

impl Action {
    pub const ALL: [Action; NUM_ACTIONS] = [
        Action::None,
        Action::Up,
        Action::Right,
        Action::Down,
        Action::Left,
    ];

    /// Direction of movement, if the action moves at all.
    pub fn dir(self) -> Option<Dir> {
        match self {
            Action::None => None,
            Action::Up => Some(Up),
            Action::Right => Some(Right),
            Action::Down => Some(Down),
            Action::Left => Some(Left),
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = anyhow::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::None),
            1 => Ok(Action::Up),
            2 => Ok(Action::Right),
            3 => Ok(Action::Down),
            4 => Ok(Action::Left),
            _ => bail!("action {value} out of range"),
        }
    }
}
