//! The seam between the frame loop and the platform: windowing, input, audio output.

use std::collections::{HashSet, VecDeque};
use tracing::debug;
use crate::error::{MinduError, MinduResult};
use crate::input::{JoystickInfo, JoystickState, MouseState};
use crate::surface::Surface;

/// How the display should be opened
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayMode {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

/// Everything the platform reported since the previous pump
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Events {
    /// The user asked to close the display
    pub quit: bool,
    /// Names of the keys currently held, see [`KEY_NAMES`](crate::input::keyboard::KEY_NAMES)
    pub keys: HashSet<String>,
    /// Mouse readings in screen coordinates
    pub mouse: MouseState,
    /// One entry per joystick, in the order of [`Backend::joysticks`]
    pub joysticks: Vec<JoystickState>,
    /// A joystick was plugged or unplugged
    pub joysticks_changed: bool,
}

pub trait Backend {
    fn open_display(&mut self, mode: &DisplayMode) -> MinduResult<()>;
    fn close_display(&mut self);

    fn set_fullscreen(&mut self, fullscreen: bool) -> MinduResult<()>;
    fn set_title(&mut self, title: &str) -> MinduResult<()>;
    fn set_icon(&mut self, icon: &Surface) -> MinduResult<()>;

    /// Drains pending platform events into a snapshot of the input devices
    fn pump(&mut self) -> MinduResult<Events>;

    /// Shows a finished frame. The frame has the screen's logical size.
    fn present(&mut self, frame: &Surface) -> MinduResult<()>;

    /// Queues mono samples at [`SAMPLE_RATE`](crate::sound::SAMPLE_RATE)
    fn queue_audio(&mut self, samples: &[i16]) -> MinduResult<()>;

    fn warp_mouse(&mut self, x: i32, y: i32);

    /// Joysticks connected right now
    fn joysticks(&mut self) -> Vec<JoystickInfo>;
}

/// Backend without a display. Replays scripted events and records what the loop produced.
///
/// Once the script runs out every pump reports a quit request.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    script: VecDeque<Events>,
    joysticks: Vec<JoystickInfo>,
    open: bool,
    mode: Option<DisplayMode>,
    frames: Vec<Surface>,
    audio: Vec<i16>,
    warps: Vec<(i32, i32)>,
    titles: Vec<String>,
    icons: usize,
    pumps: usize,
}

impl HeadlessBackend {
    pub fn new() -> HeadlessBackend {
        HeadlessBackend::default()
    }

    pub fn with_joysticks(mut self, joysticks: Vec<JoystickInfo>) -> HeadlessBackend {
        self.joysticks = joysticks;
        self
    }

    /// Adds one frame worth of events to the script
    pub fn push_events(&mut self, events: Events) {
        self.script.push_back(events);
    }

    /// Adds `count` frames of empty events
    pub fn push_idle(&mut self, count: usize) {
        for _ in 0..count {
            self.script.push_back(Events::default());
        }
    }

    pub fn set_joysticks(&mut self, joysticks: Vec<JoystickInfo>) {
        self.joysticks = joysticks;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> Option<&DisplayMode> {
        self.mode.as_ref()
    }

    pub fn frames(&self) -> &[Surface] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Surface> {
        self.frames.last()
    }

    pub fn audio(&self) -> &[i16] {
        &self.audio
    }

    pub fn warps(&self) -> &[(i32, i32)] {
        &self.warps
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn icons(&self) -> usize {
        self.icons
    }

    pub fn pumps(&self) -> usize {
        self.pumps
    }
}

impl Backend for HeadlessBackend {
    fn open_display(&mut self, mode: &DisplayMode) -> MinduResult<()> {
        if self.open {
            return Err(MinduError::Backend("display already open".to_string()));
        }

        debug!("Headless display opened ({}x{})", mode.width, mode.height);

        self.open = true;
        self.mode = Some(mode.clone());
        Ok(())
    }

    fn close_display(&mut self) {
        self.open = false;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> MinduResult<()> {
        if let Some(mode) = self.mode.as_mut() {
            mode.fullscreen = fullscreen;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> MinduResult<()> {
        self.titles.push(title.to_string());
        Ok(())
    }

    fn set_icon(&mut self, _icon: &Surface) -> MinduResult<()> {
        self.icons += 1;
        Ok(())
    }

    fn pump(&mut self) -> MinduResult<Events> {
        if !self.open {
            return Err(MinduError::Backend("pump(): display is closed".to_string()));
        }

        self.pumps += 1;

        Ok(self.script.pop_front().unwrap_or_else(|| Events {
            quit: true,
            ..Default::default()
        }))
    }

    fn present(&mut self, frame: &Surface) -> MinduResult<()> {
        if !self.open {
            return Err(MinduError::Backend("present(): display is closed".to_string()));
        }

        self.frames.push(frame.clone());
        Ok(())
    }

    fn queue_audio(&mut self, samples: &[i16]) -> MinduResult<()> {
        self.audio.extend_from_slice(samples);
        Ok(())
    }

    fn warp_mouse(&mut self, x: i32, y: i32) {
        self.warps.push((x, y));
    }

    fn joysticks(&mut self) -> Vec<JoystickInfo> {
        self.joysticks.clone()
    }
}
