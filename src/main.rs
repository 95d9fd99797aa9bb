/// Entry point and game loop.
///
/// Usage: `roomies [stage_id]`. Without an argument the stage named in
/// config.toml is played.

mod ui;

use std::time::{Duration, Instant};

use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;

use roomies::config::GameConfig;
use roomies::domain::validate::validate_stage;
use roomies::sim::event::GridEvent;
use roomies::sim::input::{Button, FrameInput};
use roomies::sim::pool::InstancePool;
use roomies::sim::step::step;
use roomies::sim::store::StageStore;
use roomies::sim::world::{Contestant, GridWorld};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::status_log;
use ui::view::View;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    if let Err(e) = status_log::install(LevelFilter::Info) {
        eprintln!("Logger init failed: {e}");
    }

    let config = GameConfig::load();
    let store = StageStore::new(&config.stages_dir);
    let requested = std::env::args().nth(1).unwrap_or_else(|| config.stage.clone());

    let stage = match store.load(&requested) {
        Ok(stage) => stage,
        Err(e) => {
            dump_log();
            eprintln!("Could not load stage {requested}: {e}");
            return;
        }
    };
    if let Err(e) = validate_stage(&stage) {
        dump_log();
        eprintln!("Stage {} is invalid: {e}", stage.stage_id);
        return;
    }

    let roster = build_roster(&config);
    let mut world = GridWorld::new(config.motion, StdRng::seed_from_u64(rand::random()));
    let mut pool = InstancePool::new();
    world.load(stage, &config.catalog, &roster, &mut pool);

    let mut view = View::new();
    if let Err(e) = view.init() {
        dump_log();
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut view, &config);

    if let Err(e) = view.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    world.unload(&mut pool);
    dump_log();

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Roomies!");
}

/// One contestant per configured player, cycling through the character
/// prefabs.
fn build_roster(config: &GameConfig) -> Vec<Contestant> {
    let kinds = config.catalog.characters.len().max(1);
    (0..config.players)
        .map(|slot| Contestant { prefab: (slot % kinds) as i32, variant: 0 })
        .collect()
}

fn dump_log() {
    for line in status_log::drain() {
        eprintln!("{line}");
    }
}

fn game_loop(
    world: &mut GridWorld,
    view: &mut View,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms.max(1));
    let dt = config.speed.dt();

    let mut message = String::new();
    let mut pads = 0;

    loop {
        kb.drain_events();
        gp.update();
        if gp.connected_count() != pads {
            pads = gp.connected_count();
            info!("{pads} gamepad(s) connected");
        }

        let mut frame = FrameInput::new();
        kb.fill(&mut frame, config.players);
        gp.fill(&mut frame, config.players);

        if frame.any_button(Button::Quit) {
            break;
        }
        if frame.any_button(Button::Reset) {
            world.reset_round();
            world.set_controls_enabled(true);
            message = "Round reset".into();
        }

        if last_tick.elapsed() >= tick_rate {
            for event in step(world, dt, &frame) {
                handle_event(world, &event, &mut message);
            }
            last_tick = Instant::now();
        }

        let status = if message.is_empty() {
            status_log::latest().unwrap_or_default()
        } else {
            message.clone()
        };
        view.render(world, &config.catalog, &status)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn handle_event(world: &mut GridWorld, event: &GridEvent, message: &mut String) {
    match *event {
        GridEvent::Win { slot } => {
            world.set_controls_enabled(false);
            info!("player {} wins on {}", slot + 1, world.stage.stage_id);
            *message = format!("Player {} wins!", slot + 1);
        }
        GridEvent::Hit { target, by } => {
            let slot_of = |id| world.characters.iter().position(|&c| c == id);
            if let (Some(t), Some(b)) = (slot_of(target), slot_of(by)) {
                *message = format!("Player {} stunned player {}", b + 1, t + 1);
            }
        }
        _ => {}
    }
}
