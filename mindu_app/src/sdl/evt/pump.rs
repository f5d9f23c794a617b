use std::collections::HashSet;
use sdl3::event::{Event, WindowEvent};
use sdl3::mouse::MouseButton;
use tracing::debug;
use mindu_lib::{Events, MouseState};
use crate::sdl::evt::EventPump;
use crate::sdl::input::keycode_name;

/// Device state rebuilt from the SDL event stream
#[derive(Debug, Default)]
pub struct Tracker {
    keys: HashSet<String>,
    mouse: MouseState,
}

impl Tracker {
    pub fn new() -> Self {
        Tracker::default()
    }

    fn release_all(&mut self) {
        self.keys.clear();
        self.mouse.buttons = [false; 3];
    }
}

/// Window pixels to screen pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    fn apply(&self, x: f32, y: f32) -> (i32, i32) {
        ((x * self.x) as i32, (y * self.y) as i32)
    }
}

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Middle => Some(1),
        MouseButton::Right => Some(2),
        _ => None,
    }
}

/// Drains the SDL queue into `tracker` and returns this frame's snapshot. Joystick readings are
/// filled in by the caller.
pub fn poll(pump: &mut EventPump, tracker: &mut Tracker, scale: Scale) -> Events {
    let mut events = Events::default();

    tracker.mouse.scroll_up = false;
    tracker.mouse.scroll_down = false;

    for e in pump.poll_iter() {
        match e {
            Event::Quit { .. } => {
                events.quit = true;
            },
            Event::KeyDown { keycode: Some(keycode), .. } => {
                if let Some(name) = keycode_name(keycode) {
                    tracker.keys.insert(name.to_string());
                }
            },
            Event::KeyUp { keycode: Some(keycode), .. } => {
                if let Some(name) = keycode_name(keycode) {
                    tracker.keys.remove(name);
                }
            },
            Event::MouseMotion { x, y, .. } => {
                tracker.mouse.position = scale.apply(x as f32, y as f32);
            },
            Event::MouseButtonDown { mouse_btn, .. } => {
                if let Some(i) = button_index(mouse_btn) {
                    tracker.mouse.buttons[i] = true;
                }
            },
            Event::MouseButtonUp { mouse_btn, .. } => {
                if let Some(i) = button_index(mouse_btn) {
                    tracker.mouse.buttons[i] = false;
                }
            },
            Event::MouseWheel { y, .. } => {
                let y = y as f32;
                if y > 0.0 {
                    tracker.mouse.scroll_up = true;
                } else if y < 0.0 {
                    tracker.mouse.scroll_down = true;
                }
            },
            Event::JoyDeviceAdded { .. } | Event::JoyDeviceRemoved { .. } => {
                debug!("Joystick plugged or unplugged");
                events.joysticks_changed = true;
            },
            Event::Window { win_event, .. } => {
                // Key releases are lost while unfocused
                if let WindowEvent::FocusLost = win_event {
                    tracker.release_all();
                }
            },
            _ => {}
        }
    }

    events.keys = tracker.keys.clone();
    events.mouse = tracker.mouse;
    events
}
