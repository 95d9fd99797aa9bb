//! The step function: advances the world by one tick.
//!
//! Processing order:
//!   1. Characters, in slot order:
//!      input → stun timer → facing → pre-push → push gate → velocity/offset
//!      → push chain (head first, with cell commits) → Idle/Walking
//!   2. Settle: unpushed axes slide back, obstacles nobody touched this
//!      tick disarm, push directions reset
//!   3. Drain the event queue
//!
//! A push rooted at one character is resolved completely (every commit in
//! the chain) before the next character updates. Tiles with no backing
//! `Tile` make the affected operation a no-op.

use crate::domain::direction::Direction;
use crate::domain::entity::{Arming, CharacterState, ItemId, ItemKind};
use crate::domain::physics;
use crate::domain::rules::{self, PrePush};

use super::event::GridEvent;
use super::input::{Axis, InputSource};
use super::world::GridWorld;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GridWorld, dt: f32, input: &dyn InputSource) -> Vec<GridEvent> {
    world.tick += 1;

    for slot in 0..world.characters.len() {
        let id = world.characters[slot];
        update_character(world, id, dt, input);
    }
    settle(world);

    std::mem::take(&mut world.events)
}

// ══════════════════════════════════════════════════════════════
// Characters
// ══════════════════════════════════════════════════════════════

fn update_character(world: &mut GridWorld, id: ItemId, dt: f32, input: &dyn InputSource) {
    if !world.is_placed(id) {
        return;
    }
    let motion = world.motion;
    let Some(c) = world.items[id].character_mut() else { return };

    // Input, quantized
    let (mut x, mut y) = (0.0, 0.0);
    if c.can_control {
        x = rules::quantize_axis(input.axis(c.slot, Axis::Horizontal), motion.axis_min);
        y = rules::quantize_axis(input.axis(c.slot, Axis::Vertical), motion.axis_min);
    }

    // Stun / invulnerability
    if c.is_stunned() {
        x = 0.0;
        y = 0.0;
    }
    let recovered = physics::tick_stun(c, &motion, dt);
    let facing = rules::resolve_facing(c.facing, x, y);
    if recovered {
        world.set_state(id, CharacterState::Idle);
    }
    world.set_facing(id, facing);

    let input_val = rules::facing_input(facing, x, y);
    if input_val != 0.0 {
        drive(world, id, facing, input_val, dt);
    } else if let Some(c) = world.items[id].character_mut() {
        c.velocity = 0.0;
    }

    // Idle <-> Walking / Pushing
    let Some(c) = world.items[id].character() else { return };
    let walking = c.velocity.abs() > 0.0;
    let state = c.state;
    match state {
        CharacterState::Idle if walking => world.set_state(id, CharacterState::Walking),
        CharacterState::Walking | CharacterState::Pushing if !walking => {
            world.set_state(id, CharacterState::Idle)
        }
        _ => {}
    }
}

/// Nonzero input along the facing axis: lean into the next tile, then
/// either stall (blocked) or accelerate and push.
fn drive(world: &mut GridWorld, id: ItemId, facing: Direction, input_val: f32, dt: f32) {
    let motion = world.motion;
    let here = world.items[id].tile_index;
    let Some(next) = world.adjacent(here, facing) else {
        if let Some(c) = world.items[id].character_mut() {
            c.velocity = 0.0;
        }
        return;
    };
    let target = world.occupant(next);

    let pushing = world.items[id].character().is_some_and(|c| c.state == CharacterState::Pushing);
    if let Some(target) = target {
        if !pushing {
            pre_push(world, target, id, facing);
        }
        touch(world, target, id, facing);
    }

    let blocked = target.is_some_and(|t| !can_push(world, id, t, facing));
    let Some(c) = world.items[id].character_mut() else { return };
    if blocked {
        c.velocity = 0.0;
        if physics::tick_immovable(c, &motion, dt) {
            let slot = c.slot;
            world.events.push(GridEvent::Immovable { slot, direction: facing });
        }
        return;
    }

    let velocity = physics::accelerate(c.velocity, input_val, &motion, dt);
    c.velocity = velocity;
    let offset = physics::advance_offset(world.items[id].push_offset.along(facing), velocity, dt);

    if !pushing && target.is_some() && physics::leans_into(offset, facing) {
        world.set_state(id, CharacterState::Pushing);
    }
    let allow = world.items[id].character().is_some_and(|c| c.state == CharacterState::Pushing);
    push(world, id, facing, offset, allow);
}

// ══════════════════════════════════════════════════════════════
// Push chain
// ══════════════════════════════════════════════════════════════

/// Notify `target` that character `by` leans into it.
fn pre_push(world: &mut GridWorld, target: ItemId, by: ItemId, direction: Direction) {
    let effect = rules::pre_push_effect(&world.items[target].kind, target == by, &world.motion);
    match effect {
        PrePush::Nothing => {}
        PrePush::Stun => {
            if let Some(c) = world.items[target].character_mut() {
                c.stun_elapsed = 0.0;
            }
            world.events.push(GridEvent::Hit { target, by });
            world.set_state(target, CharacterState::Stunned);
        }
        PrePush::Win => {
            if world.win_claimed.is_none() {
                if let Some(slot) = world.items[by].character().map(|c| c.slot) {
                    world.win_claimed = Some(slot);
                    world.events.push(GridEvent::Win { slot });
                    log::info!("player {} reached the win prop heading {direction:?}", slot + 1);
                }
            }
        }
        PrePush::Arm => {
            let tick = world.tick;
            if let ItemKind::Obstacle { armed, .. } = &mut world.items[target].kind {
                *armed = Some(Arming { by, direction, touched: tick });
            }
        }
    }
}

/// Character `by` is in direct contact with `target` this tick. Keeps an
/// obstacle armed when `by` armed it heading the same way.
fn touch(world: &mut GridWorld, target: ItemId, by: ItemId, direction: Direction) {
    let tick = world.tick;
    if let ItemKind::Obstacle { armed: Some(a), .. } = &mut world.items[target].kind {
        if a.by == by && a.direction == direction {
            a.touched = tick;
        }
    }
}

/// Can the chain starting at `first`, leaned into by `pusher`, move one
/// cell in `direction`? Every link must pass its gate, every next tile must
/// exist, and the chain may not wrap back onto the pusher's own tile. Only
/// `first` is in direct contact with the pusher.
pub fn can_push(world: &GridWorld, pusher: ItemId, first: ItemId, direction: Direction) -> bool {
    let start_tile = world.items[pusher].tile_index;
    let mut current = first;
    // A chain can be no longer than the number of items.
    for _ in 0..=world.items.len() {
        let item = &world.items[current];
        let direct = (current == first).then_some(pusher);
        if !rules::push_gate(&item.kind, direction, direct) {
            return false;
        }
        let Some(next) = world.adjacent(item.tile_index, direction) else { return false };
        if next == start_tile {
            return false;
        }
        match world.occupant(next) {
            Some(occupant) => current = occupant,
            None => return true,
        }
    }
    false
}

/// Apply `offset` along `direction` to `pusher` and, when `allow`, to the
/// whole chain in front of it. The head of the chain is resolved first so
/// a committing head frees its tile for the item behind it.
fn push(world: &mut GridWorld, pusher: ItemId, direction: Direction, offset: f32, allow: bool) {
    let mut chain = vec![pusher];
    if allow {
        let mut current = pusher;
        while chain.len() <= world.items.len() {
            let Some(next) = world.adjacent(world.items[current].tile_index, direction) else { break };
            match world.occupant(next) {
                Some(occupant) if !chain.contains(&occupant) => {
                    chain.push(occupant);
                    current = occupant;
                }
                _ => break,
            }
        }
    }

    for &id in chain.iter().rev() {
        push_one(world, id, direction, offset);
    }
}

fn push_one(world: &mut GridWorld, id: ItemId, direction: Direction, offset: f32) {
    let here = world.items[id].tile_index;
    let Some(next) = world.adjacent(here, direction) else { return };

    let (offset, commit) = physics::commit_offset(offset, world.occupant(next).is_none());
    if commit {
        world.set_tile_index(id, next, false);
        world.events.push(GridEvent::Committed { item: id, from: here, to: next });
    }

    let item = &mut world.items[id];
    item.push_direction = direction;
    item.push_offset.set_along(direction, offset);
}

// ══════════════════════════════════════════════════════════════
// Settle
// ══════════════════════════════════════════════════════════════

fn settle(world: &mut GridWorld) {
    let tick = world.tick;
    let tiles = &world.tiles;
    for item in world.items.iter_mut() {
        if let ItemKind::Obstacle { armed, .. } = &mut item.kind {
            if armed.is_some_and(|a| a.touched != tick) {
                *armed = None;
            }
        }
        if !tiles.contains_key(&item.tile_index) {
            continue;
        }
        item.push_offset = physics::settle(item.push_offset, item.push_direction);
        item.push_direction = Direction::None;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Catalog, Locks, PropBehavior, PropPrefab};
    use crate::domain::physics::{MotionParams, PUSH_MAX};
    use crate::domain::stage::{PlayerData, PropData, StageData, TileData};
    use crate::domain::topology;
    use crate::sim::input::FrameInput;
    use crate::sim::pool::InstancePool;
    use crate::sim::world::Contestant;

    const DT: f32 = 1.0 / 60.0;

    // Default catalog prefabs.
    const TV: i32 = 1;
    const CRATE: i32 = 2;
    const ARMCHAIR: i32 = 3;

    fn stage(columns: i32, rows: i32, props: &[(i32, i32, bool)], players: &[(i32, Direction)]) -> StageData {
        let mut stage = StageData {
            stage_id: "step".into(),
            columns,
            rows,
            tiles: (0..columns * rows).map(|i| TileData::isolated(i, 0, 0)).collect(),
            props: props
                .iter()
                .map(|&(tile_index, prop_prefab, is_win_prop)| PropData {
                    tile_index,
                    direction: Direction::Down,
                    prop_prefab,
                    prop_prefab_variant: 0,
                    is_win_prop,
                })
                .collect(),
            players: players
                .iter()
                .map(|&(tile_index, direction)| PlayerData { tile_index, direction })
                .collect(),
        };
        topology::link_all(&mut stage);
        stage
    }

    fn world_for(stage: StageData, catalog: &Catalog) -> GridWorld {
        let roster: Vec<Contestant> =
            (0..stage.players.len()).map(|_| Contestant { prefab: 0, variant: 0 }).collect();
        let mut pool = InstancePool::new();
        let mut world = GridWorld::seeded(MotionParams::default(), 11);
        world.load(stage, catalog, &roster, &mut pool);
        world
    }

    fn hold(slot: usize, x: f32, y: f32) -> FrameInput {
        FrameInput::new().with_stick(slot, x, y)
    }

    fn run(world: &mut GridWorld, input: &FrameInput, ticks: usize) -> Vec<GridEvent> {
        let mut all = vec![];
        for _ in 0..ticks {
            all.extend(step(world, DT, input));
        }
        all
    }

    fn state_of(world: &GridWorld, slot: usize) -> CharacterState {
        world.character(slot).and_then(|i| i.character()).map(|c| c.state).unwrap()
    }

    // ── Walking ──

    #[test]
    fn walking_commits_into_free_tiles() {
        let mut world = world_for(stage(10, 10, &[], &[(12, Direction::Right)]), &Catalog::default());
        let id = world.characters[0];
        let events = run(&mut world, &hold(0, 1.0, 0.0), 30);

        assert!(world.items[id].tile_index > 12);
        assert_eq!(state_of(&world, 0), CharacterState::Walking);
        assert!(events.contains(&GridEvent::StateChanged { slot: 0, state: CharacterState::Walking }));
        assert!(events.iter().any(|e| matches!(e, GridEvent::Committed { item, from: 12, to: 13 } if *item == id)));
    }

    #[test]
    fn releasing_input_stops_and_slides_back() {
        let mut world = world_for(stage(10, 10, &[], &[(12, Direction::Right)]), &Catalog::default());
        let id = world.characters[0];
        run(&mut world, &hold(0, 1.0, 0.0), 5);
        assert!(world.items[id].push_offset.x > 0.0);

        run(&mut world, &FrameInput::new(), 60);
        assert_eq!(state_of(&world, 0), CharacterState::Idle);
        assert_eq!(world.items[id].push_offset.x, 0.0);
    }

    #[test]
    fn perpendicular_input_turns_and_stops() {
        let mut world = world_for(stage(10, 10, &[], &[(12, Direction::Right)]), &Catalog::default());
        run(&mut world, &hold(0, 1.0, 0.0), 3);
        step(&mut world, DT, &hold(0, 0.0, 1.0));
        let c = world.character(0).and_then(|i| i.character()).unwrap();
        assert_eq!(c.facing, Direction::Up);
        // Turn resets velocity, then this tick's input accelerates again.
        assert!((c.velocity - 0.5).abs() < 1e-4);
    }

    #[test]
    fn dead_zone_input_does_nothing() {
        let mut world = world_for(stage(10, 10, &[], &[(12, Direction::Right)]), &Catalog::default());
        let events = run(&mut world, &hold(0, 0.2, -0.25), 10);
        assert!(events.is_empty());
        assert_eq!(world.items[world.characters[0]].push_offset.x, 0.0);
    }

    #[test]
    fn frozen_controls_ignore_input() {
        let mut world = world_for(stage(10, 10, &[], &[(12, Direction::Right)]), &Catalog::default());
        world.set_controls_enabled(false);
        run(&mut world, &hold(0, 1.0, 0.0), 30);
        assert_eq!(world.items[world.characters[0]].tile_index, 12);
    }

    // ── Pushing ──

    #[test]
    fn pushes_unlocked_prop_into_free_tile() {
        let mut world = world_for(
            stage(10, 10, &[(13, CRATE, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        let ch = world.characters[0];
        let prop = 0;
        let input = hold(0, 1.0, 0.0);

        let mut ticks = 0;
        while world.items[prop].tile_index != 14 {
            let events = step(&mut world, DT, &input);
            ticks += 1;
            assert!(ticks < 200, "prop never reached tile 14");
            if ticks == 1 {
                assert!(events.contains(&GridEvent::StateChanged { slot: 0, state: CharacterState::Pushing }));
            }
        }
        assert_eq!(world.items[ch].tile_index, 13);
        assert_eq!(world.occupant(13), Some(ch));
        assert_eq!(world.occupant(14), Some(prop));
        assert_eq!(world.occupant(12), None);
    }

    #[test]
    fn locked_prop_blocks_the_character() {
        let mut catalog = Catalog::default();
        let mut locks = Locks::NONE;
        locks.lock(Direction::Right);
        catalog.props[CRATE as usize] = PropPrefab::new("crate", 1, PropBehavior::Block, locks);
        let mut world = world_for(stage(10, 10, &[(13, CRATE, false)], &[(12, Direction::Right)]), &catalog);
        let ch = world.characters[0];

        let events = run(&mut world, &hold(0, 1.0, 0.0), 120);
        assert_eq!(world.items[0].tile_index, 13);
        assert_eq!(world.items[ch].tile_index, 12);
        assert_eq!(world.items[ch].push_offset.x, 0.0);
        assert_eq!(state_of(&world, 0), CharacterState::Idle);
        let cues = events.iter().filter(|e| matches!(e, GridEvent::Immovable { slot: 0, .. })).count();
        // Two seconds blocked at one cue per 0.5 s (plus a rearm tick).
        assert!((3..=4).contains(&cues), "got {cues} cues");

        // Turning away is still possible.
        step(&mut world, DT, &hold(0, 0.0, -1.0));
        assert_eq!(world.character(0).and_then(|i| i.character()).map(|c| c.facing), Some(Direction::Down));
    }

    #[test]
    fn chain_of_two_props_moves_together() {
        let mut world = world_for(
            stage(10, 10, &[(13, CRATE, false), (14, CRATE, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        let input = hold(0, 1.0, 0.0);
        let mut ticks = 0;
        while world.items[1].tile_index != 15 {
            step(&mut world, DT, &input);
            ticks += 1;
            assert!(ticks < 200);
        }
        assert_eq!(world.items[0].tile_index, 14);
        assert_eq!(world.items[world.characters[0]].tile_index, 13);
    }

    #[test]
    fn offsets_stay_within_a_cell() {
        let mut world = world_for(
            stage(10, 10, &[(13, CRATE, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        let input = hold(0, 1.0, 0.0);
        for _ in 0..300 {
            step(&mut world, DT, &input);
            for item in &world.items {
                assert!(item.push_offset.x.abs() <= 2.0 * PUSH_MAX);
                assert!(item.push_offset.y.abs() <= 2.0 * PUSH_MAX);
            }
        }
    }

    #[test]
    fn chain_wrapping_to_the_pusher_is_blocked() {
        // 2x1 row: crate's next tile (wrapping) is the pusher's own tile.
        let mut world = world_for(stage(2, 1, &[(1, CRATE, false)], &[(0, Direction::Right)]), &Catalog::default());
        let ch = world.characters[0];
        assert!(!can_push(&world, ch, 0, Direction::Right));

        let events = run(&mut world, &hold(0, 1.0, 0.0), 30);
        assert_eq!(world.items[ch].tile_index, 0);
        assert_eq!(world.items[0].tile_index, 1);
        assert!(events.iter().any(|e| matches!(e, GridEvent::Immovable { .. })));
    }

    #[test]
    fn lone_character_on_self_loop_is_blocked() {
        let mut world = world_for(stage(1, 1, &[], &[(0, Direction::Right)]), &Catalog::default());
        let ch = world.characters[0];
        let events = run(&mut world, &hold(0, 1.0, 0.0), 10);
        assert_eq!(world.items[ch].tile_index, 0);
        assert!(!events.iter().any(|e| matches!(e, GridEvent::Hit { .. })));
        assert_eq!(state_of(&world, 0), CharacterState::Idle);
    }

    #[test]
    fn walking_on_a_row_wraps_around() {
        let mut world = world_for(stage(3, 1, &[], &[(2, Direction::Right)]), &Catalog::default());
        let ch = world.characters[0];
        let mut ticks = 0;
        while world.items[ch].tile_index != 0 {
            step(&mut world, DT, &hold(0, 1.0, 0.0));
            ticks += 1;
            assert!(ticks < 120);
        }
    }

    #[test]
    fn missing_next_tile_is_a_no_op() {
        let mut s = stage(3, 1, &[], &[(0, Direction::Right)]);
        s.tiles.retain(|t| t.tile_index != 1); // stale link 0 -> 1
        let mut world = world_for(s, &Catalog::default());
        let events = run(&mut world, &hold(0, 1.0, 0.0), 20);
        assert!(events.is_empty());
        assert_eq!(world.items[world.characters[0]].tile_index, 0);
    }

    // ── Obstacles ──

    #[test]
    fn obstacle_moves_under_direct_contact() {
        let mut world = world_for(
            stage(10, 10, &[(13, ARMCHAIR, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        let input = hold(0, 1.0, 0.0);
        let mut ticks = 0;
        while world.items[0].tile_index != 14 {
            step(&mut world, DT, &input);
            ticks += 1;
            assert!(ticks < 200, "obstacle never moved");
        }

        // Once contact stops, it disarms.
        step(&mut world, DT, &FrameInput::new());
        assert!(matches!(world.items[0].kind, ItemKind::Obstacle { armed: None, .. }));
    }

    #[test]
    fn obstacle_without_contact_cannot_be_pushed() {
        let world = world_for(
            stage(10, 10, &[(13, ARMCHAIR, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        assert!(!can_push(&world, world.characters[0], 0, Direction::Right));
    }

    #[test]
    fn crate_cannot_shove_an_obstacle() {
        let mut world = world_for(
            stage(10, 10, &[(12, CRATE, false), (13, ARMCHAIR, false)], &[(11, Direction::Right)]),
            &Catalog::default(),
        );
        let events = run(&mut world, &hold(0, 1.0, 0.0), 60);
        assert_eq!(world.items[0].tile_index, 12);
        assert_eq!(world.items[1].tile_index, 13);
        assert_eq!(world.items[world.characters[0]].tile_index, 11);
        assert!(events.iter().any(|e| matches!(e, GridEvent::Immovable { .. })));
    }

    #[test]
    fn armed_obstacle_ignores_a_crate_chain() {
        // Slot 0 leans into the armchair but the wall behind it holds;
        // slot 1 drives a crate into the armchair from below.
        const WALL: i32 = 0;
        let mut world = world_for(
            stage(
                10,
                10,
                &[(13, ARMCHAIR, false), (14, WALL, false), (23, CRATE, false)],
                &[(12, Direction::Right), (33, Direction::Up)],
            ),
            &Catalog::default(),
        );
        let armer = world.characters[0];
        let input = hold(0, 1.0, 0.0).with_stick(1, 0.0, 1.0);
        for _ in 0..120 {
            step(&mut world, DT, &input);
            assert!(matches!(
                world.items[0].kind,
                ItemKind::Obstacle { armed: Some(a), .. } if a.by == armer && a.direction == Direction::Right
            ));
        }
        assert!(!can_push(&world, world.characters[1], 2, Direction::Up));
        assert_eq!(world.items[0].tile_index, 13);
        assert_eq!(world.items[2].tile_index, 23);
        assert_eq!(world.items[world.characters[1]].tile_index, 33);
        assert_eq!(world.items[armer].tile_index, 12);
    }

    #[test]
    fn obstacle_disarms_when_contact_ends() {
        const WALL: i32 = 0;
        let mut world = world_for(
            stage(10, 10, &[(13, ARMCHAIR, false), (14, WALL, false)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        run(&mut world, &hold(0, 1.0, 0.0), 5);
        assert!(matches!(world.items[0].kind, ItemKind::Obstacle { armed: Some(_), .. }));

        // Turning away ends the contact that tick.
        step(&mut world, DT, &hold(0, 0.0, -1.0));
        assert!(matches!(world.items[0].kind, ItemKind::Obstacle { armed: None, .. }));
    }

    #[test]
    fn obstacle_win_flag_never_wins() {
        let mut world = world_for(
            stage(10, 10, &[(13, ARMCHAIR, true)], &[(12, Direction::Right)]),
            &Catalog::default(),
        );
        let events = run(&mut world, &hold(0, 1.0, 0.0), 30);
        assert!(!events.iter().any(|e| matches!(e, GridEvent::Win { .. })));
    }

    // ── Stun ──

    #[test]
    fn pushing_a_character_stuns_it_once() {
        let mut world = world_for(
            stage(10, 10, &[], &[(12, Direction::Right), (13, Direction::Down)]),
            &Catalog::default(),
        );
        let (a, b) = (world.characters[0], world.characters[1]);

        let first = step(&mut world, DT, &hold(0, 1.0, 0.0));
        assert!(first.contains(&GridEvent::Hit { target: b, by: a }));
        assert!(first.contains(&GridEvent::StateChanged { slot: 1, state: CharacterState::Stunned }));
        assert_eq!(state_of(&world, 1), CharacterState::Stunned);

        // Stunned characters ignore their own input and can be shoved.
        let mut input = hold(0, 1.0, 0.0);
        input.set_axis(1, Axis::Vertical, -1.0);
        let events = run(&mut world, &input, 229);
        let hits = events.iter().filter(|e| matches!(e, GridEvent::Hit { .. })).count();
        assert_eq!(hits, 0, "re-stunned inside the invulnerability window");
        assert!(events.iter().any(|e| matches!(e, GridEvent::Committed { item, .. } if *item == b)));
        assert!(events.contains(&GridEvent::StateChanged { slot: 1, state: CharacterState::Idle }));
        assert_ne!(state_of(&world, 1), CharacterState::Stunned);
        assert_eq!(world.character(1).and_then(|i| i.character()).map(|c| c.facing), Some(Direction::Down));
    }

    #[test]
    fn idle_character_blocks_without_stun_while_invulnerable() {
        let mut world = world_for(
            stage(10, 10, &[], &[(12, Direction::Right), (13, Direction::Down)]),
            &Catalog::default(),
        );
        let b = world.characters[1];
        if let Some(c) = world.items[b].character_mut() {
            c.stun_elapsed = 0.5;
        }
        let events = run(&mut world, &hold(0, 1.0, 0.0), 10);
        assert!(!events.iter().any(|e| matches!(e, GridEvent::Hit { .. })));
        assert_eq!(world.items[b].tile_index, 13);
        assert_eq!(world.items[world.characters[0]].tile_index, 12);
    }

    // ── Win ──

    #[test]
    fn win_fires_once_per_round() {
        let mut world = world_for(
            stage(10, 10, &[(13, TV, true)], &[(12, Direction::Right), (23, Direction::Up)]),
            &Catalog::default(),
        );
        let input = hold(0, 1.0, 0.0);
        let events = run(&mut world, &input, 90);
        let wins: Vec<_> = events.iter().filter(|e| matches!(e, GridEvent::Win { .. })).collect();
        assert_eq!(wins, vec![&GridEvent::Win { slot: 0 }]);
        assert_eq!(world.win_claimed, Some(0));
        // Television is locked all round.
        assert_eq!(world.items[0].tile_index, 13);

        // Slot 1 touching the win prop afterwards does not win again.
        let events = run(&mut world, &hold(1, 0.0, 1.0), 60);
        assert!(!events.iter().any(|e| matches!(e, GridEvent::Win { .. })));

        world.reset_round();
        // Reset faces everyone Down; turn back to the television first.
        let events = run(&mut world, &input, 30);
        assert!(events.contains(&GridEvent::Win { slot: 0 }));
    }

    #[test]
    fn unplaced_characters_are_skipped() {
        let mut world = world_for(stage(4, 4, &[], &[(-1, Direction::Down), (5, Direction::Left)]), &Catalog::default());
        let mut input = hold(0, 1.0, 0.0);
        input.set_axis(1, Axis::Horizontal, -1.0);
        run(&mut world, &input, 30);
        assert!(!world.is_placed(world.characters[0]));
        assert_ne!(world.items[world.characters[1]].tile_index, 5);
    }
}
