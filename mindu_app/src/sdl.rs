pub mod wnd;
pub(crate) mod evt;
pub mod audio;
pub mod input;
mod backend;

pub use backend::SdlBackend;

use std::ops::Deref;
use crate::error::{AppError, AppResult};

pub struct Context {
    ctx: sdl3::Sdl,
}

impl Context {
    pub fn new() -> AppResult<Self> {
        let ctx = sdl3::init().map_err(AppError::sdl)?;

        Ok(Context {
            ctx,
        })
    }

    pub fn video(&self) -> AppResult<sdl3::VideoSubsystem> {
        self.ctx.video().map_err(AppError::sdl)
    }
    pub fn audio(&self) -> AppResult<sdl3::AudioSubsystem> {
        self.ctx.audio().map_err(AppError::sdl)
    }
    pub fn joystick(&self) -> AppResult<sdl3::JoystickSubsystem> {
        self.ctx.joystick().map_err(AppError::sdl)
    }
}

impl Deref for Context {
    type Target = sdl3::Sdl;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}
