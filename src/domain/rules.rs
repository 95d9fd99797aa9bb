//! Push rules and input rules, truth-table driven.
//!
//! Pure functions: they decide what is legal, `sim::step` performs it.
//!
//! ## Push gate (per link of a push chain)
//! ┌────────────────────────────┬──────────────┐
//! │ Occupant                    │ Gate          │
//! ├────────────────────────────┼──────────────┤
//! │ Character, Stunned          │ ALLOW         │
//! │ Character, otherwise        │ DENY          │
//! │ Prop, direction locked      │ DENY          │
//! │ Prop, otherwise             │ ALLOW         │
//! │ Obstacle, armed by the      │ as Prop       │
//! │   direct pusher, same dir   │               │
//! │ Obstacle, otherwise         │ DENY          │
//! └────────────────────────────┴──────────────┘
//!
//! The direct pusher is the character at the root of the chain, and only
//! for the first link. Props further down a chain have no direct pusher.
//!
//! A chain is pushable when every link passes its gate, every next cell
//! exists, and walking the chain never reaches the pusher's own tile.
//!
//! ## Pre-push (a character leans into an occupant)
//! ┌──────────────────────────────────────────────┬──────────────┐
//! │ Target                                        │ Effect        │
//! ├──────────────────────────────────────────────┼──────────────┤
//! │ the pusher itself (lone tile, self loop)      │ nothing       │
//! │ Character, not Stunned, outside stun window   │ Stun          │
//! │ Character, otherwise                          │ nothing       │
//! │ Prop, win prop                                │ Win           │
//! │ Prop, otherwise                               │ nothing       │
//! │ Obstacle (win flag ignored)                   │ Arm           │
//! └──────────────────────────────────────────────┴──────────────┘
//!
//! ## Facing resolution
//! ┌─────────────────────────────────────────────┬─────────────────────┐
//! │ Condition                                    │ New facing           │
//! ├─────────────────────────────────────────────┼─────────────────────┤
//! │ parallel input 0, perpendicular input ≠ 0    │ turn to perpendicular│
//! │ parallel input opposes facing                │ flip                 │
//! │ otherwise (incl. diagonals)                  │ unchanged            │
//! └─────────────────────────────────────────────┴─────────────────────┘

use super::direction::Direction;
use super::entity::{CharacterState, ItemId, ItemKind};
use super::physics::MotionParams;

// ── Input ──

/// Dead zone, then snap to -1 / +1.
pub fn quantize_axis(value: f32, axis_min: f32) -> f32 {
    if value.abs() < axis_min || value == 0.0 {
        0.0
    } else if value > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Next facing for quantized input `(x, y)`. See table above.
/// The current axis wins on diagonal input.
pub fn resolve_facing(facing: Direction, x: f32, y: f32) -> Direction {
    if facing.is_horizontal() {
        if x == 0.0 {
            if y != 0.0 {
                return if y > 0.0 { Direction::Up } else { Direction::Down };
            }
        } else if facing == Direction::Left && x > 0.0 {
            return Direction::Right;
        } else if facing == Direction::Right && x < 0.0 {
            return Direction::Left;
        }
    } else if facing.is_vertical() {
        if y == 0.0 {
            if x != 0.0 {
                return if x > 0.0 { Direction::Right } else { Direction::Left };
            }
        } else if facing == Direction::Down && y > 0.0 {
            return Direction::Up;
        } else if facing == Direction::Up && y < 0.0 {
            return Direction::Down;
        }
    }
    facing
}

/// Quantized input along the facing axis.
pub fn facing_input(facing: Direction, x: f32, y: f32) -> f32 {
    if facing.is_horizontal() {
        x
    } else if facing.is_vertical() {
        y
    } else {
        0.0
    }
}

// ── Push gate ──

/// Can this occupant itself be moved in `direction`? `direct` is the
/// character touching it, if any. The rest of the chain is checked by the
/// caller.
pub fn push_gate(kind: &ItemKind, direction: Direction, direct: Option<ItemId>) -> bool {
    match kind {
        ItemKind::Character(c) => c.state == CharacterState::Stunned,
        ItemKind::Prop(p) => !p.locks.is_locked(direction),
        ItemKind::Obstacle { prop, armed } => {
            let touching = armed.is_some_and(|a| Some(a.by) == direct && a.direction == direction);
            touching && !prop.locks.is_locked(direction)
        }
    }
}

// ── Pre-push ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PrePush {
    Nothing,
    Stun,
    Win,
    Arm,
}

/// Effect of a character leaning into `target`. See table above.
pub fn pre_push_effect(target: &ItemKind, is_self: bool, motion: &MotionParams) -> PrePush {
    if is_self {
        return PrePush::Nothing;
    }
    match target {
        ItemKind::Character(c) => {
            if c.state != CharacterState::Stunned && c.stun_elapsed >= motion.stun_window() {
                PrePush::Stun
            } else {
                PrePush::Nothing
            }
        }
        ItemKind::Prop(p) if p.is_win => PrePush::Win,
        ItemKind::Prop(_) => PrePush::Nothing,
        ItemKind::Obstacle { .. } => PrePush::Arm,
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
