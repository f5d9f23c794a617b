use std::ops::{Deref, DerefMut};
use image::Rgba;
use crate::error::{MinduError, MinduResult};
use crate::picture::Image;
use crate::surface::Surface;
use super::{Input, SymbolTable};

pub const MOUSE_SYMBOLS: [&str; 9] = [
    "button-left",
    "button-middle",
    "button-right",
    "scroll-up",
    "scroll-down",
    "motion-left",
    "motion-right",
    "motion-up",
    "motion-down",
];

const SCROLL_UP: usize = 3;
const SCROLL_DOWN: usize = 4;
const MOTION_LEFT: usize = 5;
const MOTION_RIGHT: usize = 6;
const MOTION_UP: usize = 7;
const MOTION_DOWN: usize = 8;

pub const DEFAULT_IDLE_TIME: u32 = 500;

/// What the backend saw of the mouse during the last frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseState {
    pub position: (i32, i32),
    /// Left, middle, right
    pub buttons: [bool; 3],
    /// Wheel moved up at least once this frame
    pub scroll_up: bool,
    pub scroll_down: bool,
}

#[rustfmt::skip]
const ARROW: [&str; 19] = [
    "X           ",
    "XX          ",
    "X.X         ",
    "X..X        ",
    "X...X       ",
    "X....X      ",
    "X.....X     ",
    "X......X    ",
    "X.......X   ",
    "X........X  ",
    "X.........X ",
    "X......XXXXX",
    "X...X..X    ",
    "X..XX..X    ",
    "X.X  X..X   ",
    "XX   X..X   ",
    "X     X..X  ",
    "      X..X  ",
    "       XX   ",
];

/// Built-in arrow pointer, black outline with a white body
pub fn default_cursor() -> Image {
    let mut surf = Surface::new(ARROW[0].len() as u32, ARROW.len() as u32);

    for (y, row) in ARROW.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            let color = match c {
                'X' => Rgba([0, 0, 0, 255]),
                '.' => Rgba([255, 255, 255, 255]),
                _ => continue,
            };
            surf.put_pixel(x as u32, y as u32, color);
        }
    }

    Image::from_surface(surf)
}

#[derive(Debug)]
pub struct Mouse {
    input: Input,
    position: (i32, i32),
    warp: Option<(i32, i32)>,
    visible: bool,
    cursor: Image,
    idle: bool,
    idle_time: u32,
    idle_timer: u32,
}

impl Mouse {
    pub fn new(state: &MouseState) -> Mouse {
        let mut busy = state.buttons.to_vec();
        busy.resize(MOUSE_SYMBOLS.len(), false);

        Mouse {
            input: Input::new(SymbolTable::new(MOUSE_SYMBOLS), busy),
            position: state.position,
            warp: None,
            visible: true,
            cursor: default_cursor(),
            idle: false,
            idle_time: DEFAULT_IDLE_TIME,
            idle_timer: 0,
        }
    }

    pub fn update(&mut self, state: &MouseState, frame_ms: u32) {
        let mut busy = state.buttons.to_vec();
        busy.resize(MOUSE_SYMBOLS.len(), false);

        busy[SCROLL_UP] = state.scroll_up;
        busy[SCROLL_DOWN] = state.scroll_down;

        let (x1, y1) = self.position;
        let (x2, y2) = state.position;
        self.position = state.position;

        if (x1, y1) != (x2, y2) {
            self.idle = false;
            self.idle_timer = 0;

            if x2 < x1 {
                busy[MOTION_LEFT] = true;
            } else if x2 > x1 {
                busy[MOTION_RIGHT] = true;
            }

            if y2 < y1 {
                busy[MOTION_UP] = true;
            } else if y2 > y1 {
                busy[MOTION_DOWN] = true;
            }
        } else if self.idle_timer < self.idle_time {
            self.idle_timer += frame_ms;
            if self.idle_timer >= self.idle_time {
                self.idle = true;
            }
        }

        self.input.update(busy, frame_ms);
    }

    pub fn cursor(&self) -> &Image {
        &self.cursor
    }

    /// `None` restores the built-in arrow
    pub fn set_cursor(&mut self, cursor: Option<Image>) {
        self.cursor = cursor.unwrap_or_else(default_cursor);
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// Top-left corner of the cursor image
    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Asks the backend to move the pointer. The new position shows up on the next frame.
    pub fn set_position(&mut self, position: (i32, i32)) {
        self.warp = Some(position);
    }

    pub(crate) fn take_warp(&mut self) -> Option<(i32, i32)> {
        self.warp.take()
    }

    /// True once the pointer hasn't moved for `idle_time` milliseconds
    pub fn idle(&self) -> bool {
        self.idle
    }

    pub fn idle_time(&self) -> u32 {
        self.idle_time
    }

    pub fn set_idle_time(&mut self, time: u32) -> MinduResult<()> {
        if time == 0 {
            return Err(MinduError::invalid_argument("set_idle_time(): time must be greater than 0"));
        }

        self.idle_time = time;
        self.idle_timer = 0;
        Ok(())
    }
}

impl Deref for Mouse {
    type Target = Input;
    fn deref(&self) -> &Self::Target {
        &self.input
    }
}

impl DerefMut for Mouse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::Sprite;

    fn at(x: i32, y: i32) -> MouseState {
        MouseState {
            position: (x, y),
            ..Default::default()
        }
    }

    #[test]
    fn motion_is_busy_for_one_frame() {
        let mut m = Mouse::new(&at(10, 10));

        m.update(&at(5, 20), 16);
        assert!(m.ding("motion-left").unwrap());
        assert!(m.ding("motion-down").unwrap());
        assert!(!m.busy("motion-right").unwrap());

        m.update(&at(5, 20), 16);
        assert!(m.dong("motion-left").unwrap());
        assert!(!m.busy("motion-down").unwrap());
    }

    #[test]
    fn scroll_and_buttons() {
        let mut m = Mouse::new(&at(0, 0));

        m.update(
            &MouseState {
                buttons: [true, false, false],
                scroll_up: true,
                ..Default::default()
            },
            16,
        );

        assert!(m.ding("button-left").unwrap());
        assert!(m.ding("scroll-up").unwrap());
        assert_eq!(m.get(), Some("button-left"));

        m.update(&at(0, 0), 16);
        assert!(m.dong("scroll-up").unwrap());
        assert!(m.dong("button-left").unwrap());
    }

    #[test]
    fn idle_after_timeout() {
        let mut m = Mouse::new(&at(0, 0));
        m.set_idle_time(40).unwrap();

        m.update(&at(0, 0), 16);
        m.update(&at(0, 0), 16);
        assert!(!m.idle());

        m.update(&at(0, 0), 16);
        assert!(m.idle());

        m.update(&at(1, 0), 16);
        assert!(!m.idle());

        assert!(m.set_idle_time(0).is_err());
    }

    #[test]
    fn warp_is_taken_once() {
        let mut m = Mouse::new(&at(0, 0));

        m.set_position((30, 40));

        assert_eq!(m.take_warp(), Some((30, 40)));
        assert_eq!(m.take_warp(), None);
    }

    #[test]
    fn default_cursor_is_an_arrow() {
        let m = Mouse::new(&at(0, 0));

        assert_eq!(m.cursor().size(), (12, 19));
        assert!(m.visible());
    }
}
