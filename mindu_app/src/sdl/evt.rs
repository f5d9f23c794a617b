pub mod pump;

use std::ops::{Deref, DerefMut};
use crate::error::{AppError, AppResult};
use crate::sdl::Context;

pub struct EventPump {
    pump: sdl3::EventPump,
}

impl EventPump {
    pub fn new(context: &Context) -> AppResult<Self> {
        Ok(EventPump {
            pump: context.event_pump().map_err(AppError::sdl)?,
        })
    }
}

impl Deref for EventPump {
    type Target = sdl3::EventPump;
    fn deref(&self) -> &Self::Target {
        &self.pump
    }
}

impl DerefMut for EventPump {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pump
    }
}
