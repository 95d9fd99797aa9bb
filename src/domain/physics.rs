//! Continuous motion inside a cell: velocity, push offset, cell commit and
//! the slide back to rest.
//!
//! ## Offset model
//!
//! Every item sits on one tile and carries a `push_offset` per axis,
//! measured in cells. Pushing moves the offset; once it passes half a cell
//! (`PUSH_MAX`) the item commits into the next tile and the offset shifts
//! back by a full cell, so the visual position is continuous:
//!
//! ```text
//!   offset  0.0 ─────▶ 0.5 ┆ commit ┆ -0.5 ─────▶ 0.0
//!   tile    12               ┆        ┆ 13
//! ```
//!
//! If the next tile is still occupied when the threshold is passed the
//! offset is dropped to 0 instead. Axes not pushed during a tick slide back
//! towards 0 by `SLIDE_LERP` per tick and snap to rest below `VEL_MIN`.
//!
//! All functions here are pure; `sim::step` applies them to live items.

use super::direction::Direction;
use super::entity::{Character, CharacterState, Vec2};

/// Half a cell: offset at which an item commits into the next tile.
pub const PUSH_MAX: f32 = 0.5;
/// Fraction of the remaining offset removed per tick while sliding back.
pub const SLIDE_LERP: f32 = 0.2;
/// Offsets smaller than this snap to 0.
pub const VEL_MIN: f32 = 0.01;

/// Tunables for character motion and timers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Raw axis values below this magnitude read as 0.
    pub axis_min: f32,
    /// Cells per second squared.
    pub acceleration: f32,
    /// Cells per second; 0 disables the clamp.
    pub max_velocity: f32,
    pub stun_time: f32,
    pub stun_invulnerable: f32,
    pub immovable_spawn_time: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        MotionParams {
            axis_min: 0.3,
            acceleration: 30.0,
            max_velocity: 6.0,
            stun_time: 3.0,
            stun_invulnerable: 1.0,
            immovable_spawn_time: 0.5,
        }
    }
}

impl MotionParams {
    /// Seconds after a stun starts until the character can be stunned again.
    pub fn stun_window(&self) -> f32 {
        self.stun_time + self.stun_invulnerable
    }
}

// ══════════════════════════════════════════════════════════════
// Velocity and offset
// ══════════════════════════════════════════════════════════════

/// Accelerate along the facing axis. `input` is -1, 0 or +1.
pub fn accelerate(velocity: f32, input: f32, motion: &MotionParams, dt: f32) -> f32 {
    let v = velocity + input * motion.acceleration * dt;
    if motion.max_velocity > 0.0 {
        v.clamp(-motion.max_velocity, motion.max_velocity)
    } else {
        v
    }
}

/// Integrate one tick of velocity into an axis offset. A character can never
/// be more than a full cell past its tile before committing.
pub fn advance_offset(offset: f32, velocity: f32, dt: f32) -> f32 {
    (offset + velocity * dt).clamp(-2.0 * PUSH_MAX, 2.0 * PUSH_MAX)
}

/// Resolve the half-cell threshold. Returns the new offset and whether the
/// item moves into the next tile.
pub fn commit_offset(offset: f32, next_free: bool) -> (f32, bool) {
    if offset.abs() <= PUSH_MAX {
        return (offset, false);
    }
    if next_free {
        (offset - offset.signum() * 2.0 * PUSH_MAX, true)
    } else {
        (0.0, false)
    }
}

/// Does a positive/negative offset lean into `direction`?
pub fn leans_into(offset: f32, direction: Direction) -> bool {
    match direction {
        Direction::Up | Direction::Right => offset > 0.0,
        Direction::Down | Direction::Left => offset < 0.0,
        Direction::None => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Slide back
// ══════════════════════════════════════════════════════════════

fn slide_axis(value: f32) -> f32 {
    if value == 0.0 {
        return 0.0;
    }
    let v = value + (0.0 - value) * SLIDE_LERP;
    if v.abs() < VEL_MIN { 0.0 } else { v }
}

/// Slide every axis that was not pushed this tick.
pub fn settle(offset: Vec2, pushed: Direction) -> Vec2 {
    Vec2 {
        x: if pushed.is_horizontal() { offset.x } else { slide_axis(offset.x) },
        y: if pushed.is_vertical() { offset.y } else { slide_axis(offset.y) },
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Advance the stun / invulnerability counter. Returns true when a stun
/// ends this tick (the caller switches the state back to Idle).
pub fn tick_stun(character: &mut Character, motion: &MotionParams, dt: f32) -> bool {
    if character.state == CharacterState::Stunned {
        character.stun_elapsed += dt;
        character.stun_elapsed >= motion.stun_time
    } else {
        if character.stun_elapsed < motion.stun_window() {
            character.stun_elapsed += dt;
        }
        false
    }
}

/// Count down the "immovable" cue while blocked. Returns true when a cue
/// should fire this tick.
pub fn tick_immovable(character: &mut Character, motion: &MotionParams, dt: f32) -> bool {
    if character.immovable_elapsed > 0.0 {
        character.immovable_elapsed -= dt;
        false
    } else {
        character.immovable_elapsed = motion.immovable_spawn_time;
        true
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
