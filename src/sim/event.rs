//! Events emitted during a simulation step.
//! The presentation layer drains these once per tick for effects and UI.

use crate::domain::direction::Direction;
use crate::domain::entity::{CharacterState, ItemId};

#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    /// `target` was stunned by a push from `by`.
    Hit { target: ItemId, by: ItemId },
    /// A character touched the win prop. At most once per round.
    Win { slot: usize },
    StateChanged { slot: usize, state: CharacterState },
    /// A character leaned into something that will not move.
    Immovable { slot: usize, direction: Direction },
    /// An item crossed into a new tile.
    Committed { item: ItemId, from: i32, to: i32 },
}
