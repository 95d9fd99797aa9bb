/// Gamepad input tracker using gilrs.
///
/// Pads are given player slots in the order they first send an event:
/// the first pad drives slot 0, the second slot 1, and so on.
///
/// Button mapping for reset / quit is loaded from config.toml via
/// `load_button_config()`. Default mapping:
///   D-pad / Left Stick    →  Movement
///   Start                 →  Reset round
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis as PadAxis, Button as PadButton, EventType, GamepadId, Gilrs};

use log::warn;

use roomies::config::GamepadConfig;
use roomies::sim::input::{Axis, Button, FrameInput};

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BUTTON_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: PadButton) -> Option<Btn> {
        match btn {
            PadButton::South     => Some(Btn::A),
            PadButton::East      => Some(Btn::B),
            PadButton::West      => Some(Btn::X),
            PadButton::North     => Some(Btn::Y),
            PadButton::LeftTrigger  => Some(Btn::L1),
            PadButton::RightTrigger => Some(Btn::R1),
            PadButton::LeftTrigger2  => Some(Btn::L2),
            PadButton::RightTrigger2 => Some(Btn::R2),
            PadButton::Start     => Some(Btn::Start),
            PadButton::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// One pad's state. The stick is kept analog; the simulation applies
/// its own dead zone.
#[derive(Clone, Debug, Default)]
struct PadState {
    buttons: [BtnState; BUTTON_COUNT],
    dpad_up: bool,
    dpad_down: bool,
    dpad_left: bool,
    dpad_right: bool,
    stick_x: f32,
    stick_y: f32,
    connected: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    reset: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            reset: vec![Btn::Start],
            quit: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Pad identity per player slot, in order of first appearance.
    #[cfg(feature = "gamepad")]
    slots: Vec<GamepadId>,

    pads: Vec<PadState>,
    action_map: ActionMap,
}

impl PadState {
    fn horizontal(&self) -> f32 {
        match (self.dpad_right, self.dpad_left) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => self.stick_x,
        }
    }

    fn vertical(&self) -> f32 {
        match (self.dpad_up, self.dpad_down) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => self.stick_y,
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        *self = PadState { connected: self.connected, ..PadState::default() };
    }
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            #[cfg(feature = "gamepad")]
            slots: Vec::new(),
            pads: Vec::new(),
            action_map: ActionMap::default(),
        }
    }

    /// Load button mapping from config. Unknown names are skipped; an empty
    /// result keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        warn!("unknown gamepad button {s:?}");
                    }
                    btn
                })
                .collect()
        }
        let reset = parse_list(&cfg.reset);
        if !reset.is_empty() {
            self.action_map.reset = reset;
        }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() {
            self.action_map.quit = quit;
        }
    }

    pub fn connected_count(&self) -> usize {
        self.pads.iter().filter(|p| p.connected).count()
    }

    pub fn update(&mut self) {
        for pad in &mut self.pads {
            for b in &mut pad.buttons {
                b.just_pressed = false;
            }
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            let pad = self.pad_mut(event.id);
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    pad.connected = true;
                    set_button(pad, btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    set_button(pad, btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    pad.connected = true;
                    match axis {
                        PadAxis::LeftStickX => pad.stick_x = value,
                        PadAxis::LeftStickY => pad.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => pad.connected = true,
                EventType::Disconnected => {
                    pad.connected = false;
                    pad.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn pad_mut(&mut self, id: GamepadId) -> &mut PadState {
        let slot = match self.slots.iter().position(|&s| s == id) {
            Some(slot) => slot,
            None => {
                self.slots.push(id);
                self.pads.push(PadState::default());
                self.slots.len() - 1
            }
        };
        &mut self.pads[slot]
    }

    /// Add the pads' contribution for `players` slots to `frame`.
    pub fn fill(&self, frame: &mut FrameInput, players: usize) {
        for (slot, pad) in self.pads.iter().enumerate().take(players) {
            if !pad.connected {
                continue;
            }
            frame.push_axis(slot, Axis::Horizontal, pad.horizontal());
            frame.push_axis(slot, Axis::Vertical, pad.vertical());
            if pad.any_just_pressed(&self.action_map.reset) {
                frame.press(slot, Button::Reset);
            }
            if pad.any_just_pressed(&self.action_map.quit) {
                frame.press(slot, Button::Quit);
            }
        }
    }
}

#[cfg(feature = "gamepad")]
fn set_button(pad: &mut PadState, gilrs_btn: PadButton, held: bool) {
    match gilrs_btn {
        PadButton::DPadUp    => pad.dpad_up = held,
        PadButton::DPadDown  => pad.dpad_down = held,
        PadButton::DPadLeft  => pad.dpad_left = held,
        PadButton::DPadRight => pad.dpad_right = held,
        other => {
            if let Some(btn) = Btn::from_gilrs(other) {
                let state = &mut pad.buttons[btn as usize];
                state.held = held;
                if held {
                    state.just_pressed = true;
                }
            }
        }
    }
}
