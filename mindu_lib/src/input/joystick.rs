use std::ops::{Deref, DerefMut};
use super::{Input, SymbolTable};

/// Layout of a connected joystick as reported by the backend
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoystickInfo {
    pub name: String,
    pub buttons: usize,
    pub hats: usize,
    pub axes: usize,
}

/// Raw joystick readings for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoystickState {
    pub buttons: Vec<bool>,
    /// (x, y) per hat, each -1, 0 or 1. Positive y is up.
    pub hats: Vec<(i8, i8)>,
    /// Normalized to [-1, 1]
    pub axes: Vec<f32>,
}

#[derive(Debug)]
pub struct Joystick {
    input: Input,
    name: String,
    info: JoystickInfo,
}

impl Joystick {
    pub fn new(info: &JoystickInfo, state: &JoystickState) -> Joystick {
        let mut names = Vec::with_capacity(info.buttons + info.hats * 4 + info.axes * 2);

        for b in 0..info.buttons {
            names.push(format!("button-{}", b));
        }
        for h in 0..info.hats {
            for dir in ["left", "right", "up", "down"] {
                names.push(format!("hat-{}-{}", h, dir));
            }
        }
        for a in 0..info.axes {
            names.push(format!("axis-{}-minus", a));
            names.push(format!("axis-{}-plus", a));
        }

        Joystick {
            input: Input::new(SymbolTable::new(names), busy_from(info, state)),
            name: info.name.split_whitespace().collect::<Vec<_>>().join(" "),
            info: info.clone(),
        }
    }

    pub fn update(&mut self, state: &JoystickState, frame_ms: u32) {
        let busy = busy_from(&self.info, state);
        self.input.update(busy, frame_ms);
    }

    /// Device name with runs of whitespace collapsed
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Buttons, then four directions per hat, then two directions per axis. Missing readings are idle.
fn busy_from(info: &JoystickInfo, state: &JoystickState) -> Vec<bool> {
    let mut busy = Vec::with_capacity(info.buttons + info.hats * 4 + info.axes * 2);

    for b in 0..info.buttons {
        busy.push(state.buttons.get(b).copied().unwrap_or(false));
    }
    for h in 0..info.hats {
        let (x, y) = state.hats.get(h).copied().unwrap_or((0, 0));
        busy.extend_from_slice(&[x < 0, x > 0, y > 0, y < 0]);
    }
    for a in 0..info.axes {
        let v = state.axes.get(a).copied().unwrap_or(0.0);
        busy.extend_from_slice(&[v < 0.0, v > 0.0]);
    }

    busy
}

impl Deref for Joystick {
    type Target = Input;
    fn deref(&self) -> &Self::Target {
        &self.input
    }
}

impl DerefMut for Joystick {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.input
    }
}
