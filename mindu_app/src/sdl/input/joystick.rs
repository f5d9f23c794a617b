use sdl3::joystick::HatState;
use tracing::{info, warn};
use mindu_lib::{JoystickInfo, JoystickState};
use crate::error::AppResult;
use crate::sdl::Context;

/// Every joystick SDL can open, in a stable order between reloads
pub struct Joysticks {
    subsystem: sdl3::JoystickSubsystem,
    open: Vec<sdl3::joystick::Joystick>,
}

impl Joysticks {
    pub fn new(ctx: &Context) -> AppResult<Self> {
        let mut joysticks = Joysticks {
            subsystem: ctx.joystick()?,
            open: Vec::new(),
        };
        joysticks.reload();

        Ok(joysticks)
    }

    /// Closes everything and reopens whatever is plugged in now
    pub fn reload(&mut self) {
        self.open.clear();

        let ids = match self.subsystem.joysticks() {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to list joysticks: {}", e);
                return;
            }
        };

        for id in ids {
            match self.subsystem.open(id) {
                Ok(joystick) => {
                    info!("Opened joystick \"{}\"", joystick.name());
                    self.open.push(joystick);
                }
                Err(e) => warn!("Failed to open joystick: {}", e),
            }
        }
    }

    pub fn infos(&self) -> Vec<JoystickInfo> {
        self.open
            .iter()
            .map(|j| JoystickInfo {
                name: j.name(),
                buttons: j.num_buttons() as usize,
                hats: j.num_hats() as usize,
                axes: j.num_axes() as usize,
            })
            .collect()
    }

    pub fn states(&self) -> Vec<JoystickState> {
        self.open
            .iter()
            .map(|j| JoystickState {
                buttons: (0..j.num_buttons()).map(|b| j.button(b).unwrap_or(false)).collect(),
                hats: (0..j.num_hats())
                    .map(|h| j.hat(h).map(hat_direction).unwrap_or((0, 0)))
                    .collect(),
                axes: (0..j.num_axes())
                    .map(|a| j.axis(a).map(normalize_axis).unwrap_or(0.0))
                    .collect(),
            })
            .collect()
    }
}

/// Positive y is up
fn hat_direction(hat: HatState) -> (i8, i8) {
    match hat {
        HatState::Centered => (0, 0),
        HatState::Up => (0, 1),
        HatState::Right => (1, 0),
        HatState::Down => (0, -1),
        HatState::Left => (-1, 0),
        HatState::RightUp => (1, 1),
        HatState::RightDown => (1, -1),
        HatState::LeftUp => (-1, 1),
        HatState::LeftDown => (-1, -1),
    }
}

fn normalize_axis(raw: i16) -> f32 {
    if raw < 0 {
        raw as f32 / 32768.0
    } else {
        raw as f32 / 32767.0
    }
}
