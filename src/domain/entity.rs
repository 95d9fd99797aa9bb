//! Live grid items: characters, props and obstacles.
//!
//! One `GridItem` struct carries what every occupant shares (cell, push
//! offset, push direction, cosmetic variant); the per-variant state lives in
//! the `ItemKind` payload.

use super::catalog::Locks;
use super::direction::Direction;

/// Index into `GridWorld::items`. Stable for the lifetime of a loaded stage.
pub type ItemId = usize;

/// Offset within a cell, in cells. `x` follows Left/Right, `y` follows
/// Down/Up, positive towards Right/Up.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Component on the axis of `direction` (0 for `None`).
    pub fn along(self, direction: Direction) -> f32 {
        if direction.is_horizontal() {
            self.x
        } else if direction.is_vertical() {
            self.y
        } else {
            0.0
        }
    }

    pub fn set_along(&mut self, direction: Direction, value: f32) {
        if direction.is_horizontal() {
            self.x = value;
        } else if direction.is_vertical() {
            self.y = value;
        }
    }
}

/// Character state machine.
///
/// ```text
///   Idle ──input──▶ Walking ──offset into occupied──▶ Pushing
///    ▲                 │                                 │
///    └──── velocity 0 ─┴─────────────────────────────────┘
///   Idle/Walking/Pushing ──hit by a character──▶ Stunned ──stun_time──▶ Idle
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CharacterState {
    #[default]
    Idle,
    Walking,
    Pushing,
    Stunned,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    /// Player slot; also the index of this character's spawn in the stage.
    pub slot: usize,
    /// Character prefab index (cosmetic).
    pub prefab: i32,
    pub facing: Direction,
    /// Signed speed along the facing axis, cells per second.
    pub velocity: f32,
    pub state: CharacterState,
    /// Seconds since the last stun began.
    pub stun_elapsed: f32,
    /// Countdown until the next "immovable" cue may fire.
    pub immovable_elapsed: f32,
    pub can_control: bool,
}

impl Character {
    pub fn new(slot: usize, prefab: i32) -> Self {
        Character {
            slot,
            prefab,
            facing: Direction::None,
            velocity: 0.0,
            state: CharacterState::Idle,
            stun_elapsed: 0.0,
            immovable_elapsed: 0.0,
            can_control: true,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.state == CharacterState::Stunned
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prop {
    /// Index of the source `PropData` in the stage (used by round reset).
    pub source: usize,
    /// Resolved prop prefab index.
    pub prefab: i32,
    pub facing: Direction,
    pub is_win: bool,
    pub locks: Locks,
}

/// Direct contact that lets a character move an obstacle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Arming {
    /// The character that leaned into the obstacle.
    pub by: ItemId,
    pub direction: Direction,
    /// Last tick `by` touched the obstacle heading `direction`.
    pub touched: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    Character(Character),
    Prop(Prop),
    /// A prop that only moves while a character touches it directly.
    /// `armed` is set by a character's pre-push and survives only while the
    /// same character keeps touching it in the same direction.
    Obstacle { prop: Prop, armed: Option<Arming> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridItem {
    pub tile_index: i32,
    pub push_offset: Vec2,
    /// Direction this item was pushed in during the current tick.
    pub push_direction: Direction,
    pub variant: i32,
    pub kind: ItemKind,
}

impl GridItem {
    pub fn new(tile_index: i32, variant: i32, kind: ItemKind) -> Self {
        GridItem {
            tile_index,
            push_offset: Vec2::ZERO,
            push_direction: Direction::None,
            variant,
            kind,
        }
    }

    pub fn character(&self) -> Option<&Character> {
        match &self.kind {
            ItemKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            ItemKind::Character(c) => Some(c),
            _ => None,
        }
    }

    /// Prop payload for both plain props and obstacles.
    pub fn prop(&self) -> Option<&Prop> {
        match &self.kind {
            ItemKind::Prop(p) | ItemKind::Obstacle { prop: p, .. } => Some(p),
            ItemKind::Character(_) => None,
        }
    }

    pub fn is_character(&self) -> bool {
        matches!(self.kind, ItemKind::Character(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_axis_follows_direction() {
        let mut v = Vec2::ZERO;
        v.set_along(Direction::Left, -0.3);
        v.set_along(Direction::Up, 0.2);
        assert_eq!(v, Vec2 { x: -0.3, y: 0.2 });
        assert_eq!(v.along(Direction::Right), -0.3);
        assert_eq!(v.along(Direction::Down), 0.2);
        assert_eq!(v.along(Direction::None), 0.0);
        v.set_along(Direction::None, 5.0);
        assert_eq!(v, Vec2 { x: -0.3, y: 0.2 });
    }

    #[test]
    fn variant_accessors() {
        let prop = Prop {
            source: 0,
            prefab: 3,
            facing: Direction::Down,
            is_win: false,
            locks: Locks::NONE,
        };
        let obstacle = GridItem::new(4, 0, ItemKind::Obstacle { prop: prop.clone(), armed: None });
        assert_eq!(obstacle.prop(), Some(&prop));
        assert!(obstacle.character().is_none());

        let mut ch = GridItem::new(1, 0, ItemKind::Character(Character::new(2, 0)));
        assert!(ch.is_character());
        assert!(ch.prop().is_none());
        if let Some(c) = ch.character_mut() {
            c.state = CharacterState::Stunned;
        }
        assert!(ch.character().is_some_and(Character::is_stunned));
    }
}
