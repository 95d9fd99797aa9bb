//! Facing / push direction shared by the stage format and the simulation.
//!
//! Persisted as an integer (`None = 0, Down = 1, Up = 2, Left = 3, Right = 4`)
//! so stage files stay compatible with the authoring tool.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Direction {
    /// Placeholder, resolved to a cardinal direction at spawn time.
    #[default]
    None,
    Down,
    Up,
    Left,
    Right,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] =
        [Direction::Down, Direction::Up, Direction::Left, Direction::Right];

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// +1 for Up/Right, -1 for Down/Left, 0 for None.
    /// Offsets and velocities along an axis use this sign convention.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up | Direction::Right => 1.0,
            Direction::Down | Direction::Left => -1.0,
            Direction::None => 0.0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// Yaw about the vertical axis, in degrees. Pure lookup for renderers.
    pub fn yaw_degrees(self) -> f32 {
        match self {
            Direction::Up => 0.0,
            Direction::Down => 180.0,
            Direction::Left => -90.0,
            Direction::Right => 90.0,
            Direction::None => 0.0,
        }
    }

    /// Keep a concrete facing, or pick one of the four cardinals uniformly.
    pub fn or_random<R: Rng>(self, rng: &mut R) -> Direction {
        match self {
            Direction::None => Direction::CARDINALS[rng.random_range(0..Direction::CARDINALS.len())],
            concrete => concrete,
        }
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> i32 {
        match direction {
            Direction::None => 0,
            Direction::Down => 1,
            Direction::Up => 2,
            Direction::Left => 3,
            Direction::Right => 4,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::None),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Up),
            3 => Ok(Direction::Left),
            4 => Ok(Direction::Right),
            other => Err(format!("invalid direction value {other} (expected 0..=4)")),
        }
    }
}
