/// Keyboard state tracker.
///
/// Tracks which keys are currently held down so a character keeps pushing
/// while its key is held, and maps the held keys of every player onto a
/// `FrameInput` once per tick.
///
/// ## Layout
///   Player 1: W A S D         Player 2: arrow keys
///   Player 3: I J K L         Player 4: 8 4 5 6
///   F2: reset round           Esc / Ctrl+C: quit
///
/// Most terminals never report key releases, so a key counts as held
/// until HOLD_TIMEOUT passes without a Press/Repeat event.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use roomies::sim::input::{Axis, Button, FrameInput};

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Up, down, left, right per player slot.
const PLAYER_KEYS: [[KeyCode; 4]; 4] = [
    [KeyCode::Char('w'), KeyCode::Char('s'), KeyCode::Char('a'), KeyCode::Char('d')],
    [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right],
    [KeyCode::Char('i'), KeyCode::Char('k'), KeyCode::Char('j'), KeyCode::Char('l')],
    [KeyCode::Char('8'), KeyCode::Char('5'), KeyCode::Char('4'), KeyCode::Char('6')],
];

const KEY_RESET: KeyCode = KeyCode::F(2);
const KEY_QUIT: KeyCode = KeyCode::Esc;

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call. Buttons are edge-triggered.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);
            let code = normalize(key.code);

            if key.kind == KeyEventKind::Release {
                continue;
            }
            let was_held = self.is_held(code);
            self.last_active.insert(code, Instant::now());
            if !was_held {
                self.fresh_presses.push(code);
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Add the keyboard's contribution for `players` slots to `frame`.
    /// Buttons are not per player; they are reported on slot 0.
    pub fn fill(&self, frame: &mut FrameInput, players: usize) {
        for (slot, [up, down, left, right]) in PLAYER_KEYS.iter().enumerate().take(players) {
            let h = axis_value(self.is_held(*right), self.is_held(*left));
            let v = axis_value(self.is_held(*up), self.is_held(*down));
            if h != 0.0 {
                frame.push_axis(slot, Axis::Horizontal, h);
            }
            if v != 0.0 {
                frame.push_axis(slot, Axis::Vertical, v);
            }
        }
        if self.was_pressed(KEY_RESET) {
            frame.press(0, Button::Reset);
        }
        if self.was_pressed(KEY_QUIT) || self.ctrl_c_pressed() {
            frame.press(0, Button::Quit);
        }
    }
}

fn axis_value(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Letters are tracked lower-case so Shift / Caps Lock do not split a key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
