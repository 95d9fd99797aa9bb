//! Input boundary: the simulation reads per-slot axes and buttons through
//! `InputSource`; hosts feed it from devices, tests from scripts.

use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Button {
    Reset,
    Quit,
}

pub trait InputSource {
    /// Raw axis value in `[-1, 1]`; positive is Right / Up.
    fn axis(&self, slot: usize, axis: Axis) -> f32;
    fn button(&self, slot: usize, button: Button) -> bool;
}

/// One frame of input for every slot.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    axes: HashMap<(usize, Axis), f32>,
    buttons: HashMap<(usize, Button), bool>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate an axis value, clamped to `[-1, 1]`. Opposite keys cancel.
    pub fn push_axis(&mut self, slot: usize, axis: Axis, value: f32) {
        let v = self.axes.entry((slot, axis)).or_insert(0.0);
        *v = (*v + value).clamp(-1.0, 1.0);
    }

    pub fn set_axis(&mut self, slot: usize, axis: Axis, value: f32) {
        self.axes.insert((slot, axis), value.clamp(-1.0, 1.0));
    }

    pub fn press(&mut self, slot: usize, button: Button) {
        self.buttons.insert((slot, button), true);
    }

    /// Same input with `(horizontal, vertical)` for one slot, for tests and
    /// scripted play.
    pub fn with_stick(mut self, slot: usize, horizontal: f32, vertical: f32) -> Self {
        self.set_axis(slot, Axis::Horizontal, horizontal);
        self.set_axis(slot, Axis::Vertical, vertical);
        self
    }

    /// Any slot pressed `button` this frame.
    pub fn any_button(&self, button: Button) -> bool {
        self.buttons.iter().any(|(&(_, b), &down)| b == button && down)
    }
}

impl InputSource for FrameInput {
    fn axis(&self, slot: usize, axis: Axis) -> f32 {
        self.axes.get(&(slot, axis)).copied().unwrap_or(0.0)
    }

    fn button(&self, slot: usize, button: Button) -> bool {
        self.buttons.get(&(slot, button)).copied().unwrap_or(false)
    }
}
