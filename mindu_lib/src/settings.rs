use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::error::{MinduError, MinduResult};

pub const DEFAULT_TITLE: &str = "Mindu Window";

/// Start-up values for a [`Context`](crate::Context)
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Loop iterations per second
    pub ips: u32,
    pub channels: usize,
    /// Frames kept for replays, 0 disables recording
    pub replay_length: usize,
    pub mouse_visible: bool,
    pub mouse_idle_time: u32,
    /// TTF used by labels that don't name a font, `None` for the built-in Fira Sans face
    pub default_font: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            title: DEFAULT_TITLE.to_string(),
            width: 640,
            height: 480,
            fullscreen: false,
            ips: 60,
            channels: crate::mixer::DEFAULT_CHANNELS,
            replay_length: 0,
            mouse_visible: true,
            mouse_idle_time: crate::input::mouse::DEFAULT_IDLE_TIME,
            default_font: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> MinduResult<()> {
        if self.title.is_empty() {
            return Err(MinduError::invalid_argument("title can't be empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(MinduError::invalid_argument(format!(
                "screen size must be greater than 0, got {}x{}",
                self.width, self.height
            )));
        }
        if self.ips == 0 {
            return Err(MinduError::invalid_argument("ips must be greater than 0"));
        }
        if self.mouse_idle_time == 0 {
            return Err(MinduError::invalid_argument("mouse idle time must be greater than 0"));
        }
        Ok(())
    }
}
