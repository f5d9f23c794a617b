//! Mindu: a small 2D game library.
//!
//! Sprites, sounds and input devices on top of a software compositor. The platform (window,
//! events, audio device) sits behind the [`Backend`] trait so the whole loop also runs headless.

// Pixel coordinates go back and forth between signed screen space and unsigned image space.
#![allow(clippy::cast_lossless)]

mod animation;
mod backend;
mod clock;
mod context;
mod error;
mod font;
mod label;
mod mixer;
mod picture;
mod rect;
mod screen;
mod settings;
mod sound;
mod sprite;
mod surface;
#[cfg(test)]
mod test_util;

pub mod input;

pub use animation::{Animation, AnimationOptions};
pub use backend::{Backend, DisplayMode, Events, HeadlessBackend};
pub use clock::Clock;
pub use context::{Callback, Context};
pub use error::{MinduError, MinduResult};
pub use font::{Fonts, BUILTIN_FONT_NAME};
pub use input::{Joystick, JoystickInfo, JoystickState, Keyboard, Mouse, MouseState};
pub use label::{Alignment, Color, Label, LabelStyle};
pub use mixer::{Channel, Mixer, DEFAULT_CHANNELS};
pub use picture::Image;
pub use rect::{Anchor, Placement, Rect};
pub use screen::{default_icon, Screen, SHOT_EXTENSIONS};
pub use settings::{Settings, DEFAULT_TITLE};
pub use sound::{Sound, SAMPLE_RATE, SOUND_EXTENSIONS};
pub use sprite::Sprite;
pub use surface::{Surface, BLACK, IMAGE_EXTENSIONS, TRANSPARENT};

/// Library version, from the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
